//! OpenType features and feature sets.

use core::fmt;

use crate::{alloc::Vec, Tag};

macro_rules! features {
    ($($(#[$meta:meta])* $name:ident => $tag:literal,)+) => {
        /// Registered OpenType feature known to the shaper.
        ///
        /// The feature ID (i.e., its index in a [`FeatureSet`]) is the declaration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[non_exhaustive]
        pub enum Feature {
            $($(#[$meta])* $name,)+
        }

        impl Feature {
            /// All features in the ID order.
            pub const ALL: &'static [Self] = &[$(Self::$name,)+];

            /// Returns the OpenType tag of this feature.
            pub const fn tag(self) -> Tag {
                match self {
                    $(Self::$name => Tag::new($tag),)+
                }
            }
        }
    };
}

features! {
    /// Access all alternates.
    AccessAllAlternates => b"aalt",
    /// Above-base forms.
    AboveBaseForms => b"abvf",
    /// Above-base mark positioning.
    AboveBaseMarkPositioning => b"abvm",
    /// Above-base substitutions.
    AboveBaseSubstitutions => b"abvs",
    /// Akhand.
    Akhand => b"akhn",
    /// Below-base forms.
    BelowBaseForms => b"blwf",
    /// Below-base mark positioning.
    BelowBaseMarkPositioning => b"blwm",
    /// Below-base substitutions.
    BelowBaseSubstitutions => b"blws",
    /// Contextual alternates.
    ContextualAlternates => b"calt",
    /// Case-sensitive forms.
    CaseSensitiveForms => b"case",
    /// Glyph composition / decomposition.
    GlyphComposition => b"ccmp",
    /// Conjunct form after ro.
    ConjunctFormAfterRo => b"cfar",
    /// Conjunct forms.
    ConjunctForms => b"cjct",
    /// Contextual ligatures.
    ContextualLigatures => b"clig",
    /// Cursive positioning.
    CursivePositioning => b"curs",
    /// Distances.
    Distances => b"dist",
    /// Discretionary ligatures.
    DiscretionaryLigatures => b"dlig",
    /// Fractions.
    Fractions => b"frac",
    /// Terminal forms.
    TerminalForms => b"fina",
    /// Half forms.
    HalfForms => b"half",
    /// Halant forms.
    HalantForms => b"haln",
    /// Initial forms.
    InitialForms => b"init",
    /// Isolated forms.
    IsolatedForms => b"isol",
    /// Kerning.
    Kerning => b"kern",
    /// Standard ligatures.
    StandardLigatures => b"liga",
    /// Localized forms.
    LocalizedForms => b"locl",
    /// Mark positioning.
    MarkPositioning => b"mark",
    /// Medial forms.
    MedialForms => b"medi",
    /// Mark-to-mark positioning.
    MarkToMarkPositioning => b"mkmk",
    /// Nukta forms.
    NuktaForms => b"nukt",
    /// Pre-base forms.
    PreBaseForms => b"pref",
    /// Pre-base substitutions.
    PreBaseSubstitutions => b"pres",
    /// Post-base forms.
    PostBaseForms => b"pstf",
    /// Post-base substitutions.
    PostBaseSubstitutions => b"psts",
    /// Rakar forms.
    RakarForms => b"rkrf",
    /// Reph form.
    RephForm => b"rphf",
    /// Required contextual alternates.
    RequiredContextualAlternates => b"rclt",
    /// Required ligatures.
    RequiredLigatures => b"rlig",
    /// Small capitals.
    SmallCapitals => b"smcp",
    /// Stylistic alternates.
    StylisticAlternates => b"salt",
    /// Vattu variants.
    VattuVariants => b"vatu",
    /// Vertical kerning.
    VerticalKerning => b"vkrn",
    /// Vertical alternates and rotation.
    VerticalAlternatesAndRotation => b"vrt2",
    /// Slashed zero.
    SlashedZero => b"zero",
}

impl Feature {
    /// Number of features, i.e. the expected length of a [`FeatureSet`].
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the feature ID.
    pub fn id(self) -> usize {
        self as usize
    }

    /// Gets a feature by its ID.
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Looks up a feature by its OpenType tag.
    pub fn from_tag(tag: Tag) -> Option<Self> {
        Self::ALL.iter().copied().find(|feature| feature.tag() == tag)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tag(), formatter)
    }
}

/// Fixed-length bit set indexed by feature ID.
///
/// A set can have an arbitrary length, but only sets with [`Feature::COUNT`] bits can be attached
/// to a [`ShapingContext`](crate::ShapingContext).
#[derive(Clone, PartialEq, Eq)]
pub struct FeatureSet {
    words: Vec<u64>,
    len: usize,
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enabled = (0..self.len).filter(|&index| self.bit(index));
        formatter
            .debug_struct("FeatureSet")
            .field("len", &self.len)
            .field("enabled", &enabled.collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new(Feature::COUNT)
    }
}

impl FeatureSet {
    const WORD_BITS: usize = u64::BITS as usize;

    /// Creates a set with `len` bits, all of which are unset.
    pub fn new(len: usize) -> Self {
        Self {
            words: crate::alloc::vec![0; len.div_ceil(Self::WORD_BITS)],
            len,
        }
    }

    /// Returns the number of bits in this set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether this set has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets the bit with the specified index. Out-of-range indices are reported as unset.
    pub fn bit(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.words[index / Self::WORD_BITS] & (1 << (index % Self::WORD_BITS)) != 0
    }

    /// Sets the bit with the specified index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_bit(&mut self, index: usize, value: bool) {
        assert!(
            index < self.len,
            "bit index {index} is out of range (..{})",
            self.len
        );
        let word = &mut self.words[index / Self::WORD_BITS];
        let mask = 1 << (index % Self::WORD_BITS);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Enables the feature. Returns `false` if the feature doesn't fit into this set.
    pub fn insert(&mut self, feature: Feature) -> bool {
        let fits = feature.id() < self.len;
        if fits {
            self.set_bit(feature.id(), true);
        }
        fits
    }

    /// Disables the feature.
    pub fn remove(&mut self, feature: Feature) {
        if feature.id() < self.len {
            self.set_bit(feature.id(), false);
        }
    }

    /// Checks whether the feature is enabled.
    pub fn contains(&self, feature: Feature) -> bool {
        self.bit(feature.id())
    }

    /// Iterates over enabled features in the ID order.
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL
            .iter()
            .copied()
            .filter(|&feature| self.contains(feature))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = Self::default();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

impl Extend<Feature> for FeatureSet {
    fn extend<I: IntoIterator<Item = Feature>>(&mut self, iter: I) {
        for feature in iter {
            self.insert(feature);
        }
    }
}
