//! Shaping context: script, language, direction and features.

use crate::{ConfigError, Face, Feature, FeatureSet, Tag};

/// Writing script of the shaped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Script {
    /// Characters shared by multiple scripts (`Zyyy`). Has no OpenType tag.
    Common,
    /// Combining characters inheriting the script of the base (`Zinh`). Has no OpenType tag.
    Inherited,
    /// Unknown script (`Zzzz`). Has no OpenType tag.
    Unknown,
    /// Arabic.
    Arabic,
    /// Armenian.
    Armenian,
    /// Bengali.
    Bengali,
    /// Cyrillic.
    Cyrillic,
    /// Devanagari.
    Devanagari,
    /// Ethiopic.
    Ethiopic,
    /// Georgian.
    Georgian,
    /// Greek.
    Greek,
    /// Gujarati.
    Gujarati,
    /// Gurmukhi.
    Gurmukhi,
    /// Han ideographs.
    Han,
    /// Hangul.
    Hangul,
    /// Hebrew.
    Hebrew,
    /// Hiragana.
    Hiragana,
    /// Kannada.
    Kannada,
    /// Katakana.
    Katakana,
    /// Khmer.
    Khmer,
    /// Lao.
    Lao,
    /// Latin.
    Latin,
    /// Malayalam.
    Malayalam,
    /// Myanmar.
    Myanmar,
    /// Oriya (Odia).
    Oriya,
    /// Sinhala.
    Sinhala,
    /// Syriac.
    Syriac,
    /// Tamil.
    Tamil,
    /// Telugu.
    Telugu,
    /// Thaana.
    Thaana,
    /// Thai.
    Thai,
    /// Tibetan.
    Tibetan,
}

impl Script {
    /// Returns the OpenType script tag, or `None` for scripts without a tag.
    ///
    /// Indic scripts use the version 2 tags (e.g., `dev2` for Devanagari).
    pub const fn tag(self) -> Option<Tag> {
        Some(Tag::new(match self {
            Self::Common | Self::Inherited | Self::Unknown => return None,
            Self::Arabic => b"arab",
            Self::Armenian => b"armn",
            Self::Bengali => b"bng2",
            Self::Cyrillic => b"cyrl",
            Self::Devanagari => b"dev2",
            Self::Ethiopic => b"ethi",
            Self::Georgian => b"geor",
            Self::Greek => b"grek",
            Self::Gujarati => b"gjr2",
            Self::Gurmukhi => b"gur2",
            Self::Han => b"hani",
            Self::Hangul => b"hang",
            Self::Hebrew => b"hebr",
            Self::Hiragana | Self::Katakana => b"kana",
            Self::Kannada => b"knd2",
            Self::Khmer => b"khmr",
            Self::Lao => b"lao ",
            Self::Latin => b"latn",
            Self::Malayalam => b"mlm2",
            Self::Myanmar => b"mym2",
            Self::Oriya => b"ory2",
            Self::Sinhala => b"sinh",
            Self::Syriac => b"syrc",
            Self::Tamil => b"tml2",
            Self::Telugu => b"tel2",
            Self::Thaana => b"thaa",
            Self::Thai => b"thai",
            Self::Tibetan => b"tibt",
        }))
    }

    /// Returns the default direction of the script.
    pub const fn direction(self) -> Direction {
        match self {
            Self::Arabic | Self::Hebrew | Self::Syriac | Self::Thaana => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        }
    }
}

/// Language of the shaped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Language {
    /// Default language system (`dflt`).
    Default,
    /// Undetermined language. Has no OpenType tag; use [`Self::Default`] to select
    /// the default language system.
    Undetermined,
    /// Arabic.
    Arabic,
    /// Chinese (simplified).
    ChineseSimplified,
    /// Chinese (traditional).
    ChineseTraditional,
    /// Dutch.
    Dutch,
    /// English.
    English,
    /// French.
    French,
    /// German.
    German,
    /// Greek.
    Greek,
    /// Hebrew.
    Hebrew,
    /// Hindi.
    Hindi,
    /// Japanese.
    Japanese,
    /// Korean.
    Korean,
    /// Persian.
    Persian,
    /// Polish.
    Polish,
    /// Romanian.
    Romanian,
    /// Russian.
    Russian,
    /// Serbian.
    Serbian,
    /// Spanish.
    Spanish,
    /// Turkish.
    Turkish,
    /// Ukrainian.
    Ukrainian,
    /// Urdu.
    Urdu,
    /// Vietnamese.
    Vietnamese,
}

impl Language {
    /// Returns the OpenType language system tag, or `None` for [`Self::Undetermined`].
    pub const fn tag(self) -> Option<Tag> {
        Some(Tag::new(match self {
            Self::Undetermined => return None,
            Self::Default => b"dflt",
            Self::Arabic => b"ARA ",
            Self::ChineseSimplified => b"ZHS ",
            Self::ChineseTraditional => b"ZHT ",
            Self::Dutch => b"NLD ",
            Self::English => b"ENG ",
            Self::French => b"FRA ",
            Self::German => b"DEU ",
            Self::Greek => b"ELL ",
            Self::Hebrew => b"IWR ",
            Self::Hindi => b"HIN ",
            Self::Japanese => b"JAN ",
            Self::Korean => b"KOR ",
            Self::Persian => b"FAR ",
            Self::Polish => b"PLK ",
            Self::Romanian => b"ROM ",
            Self::Russian => b"RUS ",
            Self::Serbian => b"SRB ",
            Self::Spanish => b"ESP ",
            Self::Turkish => b"TRK ",
            Self::Ukrainian => b"UKR ",
            Self::Urdu => b"URD ",
            Self::Vietnamese => b"VIT ",
        }))
    }
}

/// Text direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right (e.g., Latin).
    #[default]
    LeftToRight,
    /// Right to left (e.g., Arabic).
    RightToLeft,
    /// Top to bottom (e.g., vertical CJK).
    TopToBottom,
    /// Bottom to top.
    BottomToTop,
}

impl Direction {
    /// Checks whether the direction is horizontal.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Checks whether the direction is opposite to the natural order (right to left or bottom to top).
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::RightToLeft | Self::BottomToTop)
    }
}

/// Configuration for [`shape_full()`](crate::shape_full).
///
/// The context borrows a [`Face`]. The script and language have no defaults and must be set
/// before shaping; the direction defaults to left to right, and all features are disabled.
#[derive(Debug, Clone)]
pub struct ShapingContext<'a> {
    face: &'a Face<'a>,
    script: Option<Script>,
    language: Option<Language>,
    direction: Direction,
    features: FeatureSet,
}

impl<'a> ShapingContext<'a> {
    /// Creates a context for the specified face.
    pub fn new(face: &'a Face<'a>) -> Self {
        Self {
            face,
            script: None,
            language: None,
            direction: Direction::default(),
            features: FeatureSet::default(),
        }
    }

    /// Returns the face used by this context.
    pub fn face(&self) -> &'a Face<'a> {
        self.face
    }

    /// Returns the script, if set.
    pub fn script(&self) -> Option<Script> {
        self.script
    }

    /// Sets the script.
    pub fn set_script(&mut self, script: Script) {
        self.script = Some(script);
    }

    /// Returns the language, if set.
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// Sets the language.
    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language);
    }

    /// Returns the text direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sets the text direction.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Returns enabled features.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Copies the feature set into this context.
    ///
    /// # Errors
    ///
    /// Returns an error if the set length differs from [`Feature::COUNT`]. In this case,
    /// the context retains its previous features.
    pub fn set_features(&mut self, features: &FeatureSet) -> Result<(), ConfigError> {
        if features.len() != Feature::COUNT {
            return Err(ConfigError::FeatureCountMismatch {
                expected: Feature::COUNT,
                actual: features.len(),
            });
        }
        self.features.clone_from(features);
        Ok(())
    }

    pub(crate) fn script_tag(&self) -> Result<Tag, ConfigError> {
        let script = self.script.ok_or(ConfigError::ScriptNotSet)?;
        script.tag().ok_or(ConfigError::UnresolvedScript(script))
    }

    pub(crate) fn language_tag(&self) -> Result<Tag, ConfigError> {
        let language = self.language.ok_or(ConfigError::LanguageNotSet)?;
        language.tag().ok_or(ConfigError::UnresolvedLanguage(language))
    }
}
