use core::{fmt, ops};

use crate::{alloc::String, Language, Script, Tag};

/// Kind of a font [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Unexpected end of the table data.
    UnexpectedEof,
    /// Unexpected font version in the sfnt header.
    UnexpectedFontVersion,
    /// Missing required font table (e.g., `cmap`).
    MissingTable,
    /// Offset inferred from the table data is out of bounds.
    OffsetOutOfBounds(usize),
    /// Range inferred from the table data is out of bounds.
    RangeOutOfBounds {
        /// Inferred range.
        range: ops::Range<usize>,
        /// Length of the indexed data.
        len: usize,
    },
    /// Unexpected table version.
    UnexpectedTableVersion(u32),
    /// Unexpected table format (e.g., for a `cmap` subtable).
    UnexpectedTableFormat(u16),
    /// `segCountX2` field of a `cmap` format 4 subtable is odd.
    OddSegmentCount(u16),
    /// Glyph class value in the `GDEF` glyph class definition is outside `1..=4`.
    InvalidGlyphClass(u16),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => formatter.write_str("unexpected end of the table data"),
            Self::UnexpectedFontVersion => formatter.write_str("unexpected font version"),
            Self::MissingTable => formatter.write_str("missing required font table"),
            Self::OffsetOutOfBounds(val) => {
                write!(
                    formatter,
                    "offset ({val}) inferred from the table data is out of bounds"
                )
            }
            Self::RangeOutOfBounds { range, len } => {
                write!(
                    formatter,
                    "range ({range:?}) inferred from the table data is out of bounds (..{len})"
                )
            }
            Self::UnexpectedTableVersion(val) => {
                write!(formatter, "unexpected table version ({val:#010x})")
            }
            Self::UnexpectedTableFormat(val) => {
                write!(formatter, "unexpected table format ({val})")
            }
            Self::OddSegmentCount(val) => {
                write!(formatter, "segment count doubled ({val}) is odd")
            }
            Self::InvalidGlyphClass(val) => {
                write!(formatter, "glyph class ({val}) is outside the 1..=4 range")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseErrorKind {}

/// Errors that can occur when parsing font tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub(crate) kind: ParseErrorKind,
    pub(crate) offset: usize,
    pub(crate) table: Option<Tag>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = self.table {
            write!(formatter, "[{table}] ")?;
        }
        if self.offset > 0 {
            write!(formatter, "{}: ", self.offset)?;
        }
        fmt::Display::fmt(&self.kind, formatter)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl ParseError {
    pub(crate) fn missing_table(tag: Tag) -> Self {
        Self {
            kind: ParseErrorKind::MissingTable,
            offset: 0,
            table: Some(tag),
        }
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Gets the table this error relates to.
    pub fn table(&self) -> Option<Tag> {
        self.table
    }

    /// Gets the offset in the table data.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Errors in the [`ShapingContext`](crate::ShapingContext) configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Feature set has a length different from [`Feature::COUNT`](crate::Feature::COUNT).
    FeatureCountMismatch {
        /// Expected number of features.
        expected: usize,
        /// Actual length of the supplied set.
        actual: usize,
    },
    /// Script was not set on the context.
    ScriptNotSet,
    /// Language was not set on the context.
    LanguageNotSet,
    /// Script has no OpenType tag.
    UnresolvedScript(Script),
    /// Language has no OpenType tag.
    UnresolvedLanguage(Language),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureCountMismatch { expected, actual } => {
                write!(
                    formatter,
                    "feature set length mismatch: expected {expected}, got {actual}"
                )
            }
            Self::ScriptNotSet => formatter.write_str("script is not set"),
            Self::LanguageNotSet => formatter.write_str("language is not set"),
            Self::UnresolvedScript(script) => {
                write!(formatter, "script {script:?} has no OpenType tag")
            }
            Self::UnresolvedLanguage(language) => {
                write!(formatter, "language {language:?} has no OpenType tag")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Error returned by a [`LayoutEngine`](crate::LayoutEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutError {
    table: Tag,
    message: String,
}

impl LayoutError {
    /// Creates an error for the specified layout table (usually `GSUB` or `GPOS`).
    pub fn new(table: Tag, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }

    /// Gets the table this error relates to.
    pub fn table(&self) -> Tag {
        self.table
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[{}] {}", self.table, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}

/// Stage of [`shape_full()`](crate::shape_full).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeStage {
    /// Resolving script and language to OpenType tags.
    TagResolution,
    /// Mapping codepoints to nominal glyphs using `cmap`.
    NominalMapping,
    /// Assigning glyph classes using `GDEF`.
    Classification,
    /// Applying GSUB features.
    Substitution,
    /// Applying GPOS features.
    Positioning,
}

impl fmt::Display for ShapeStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::TagResolution => "tag resolution",
            Self::NominalMapping => "nominal glyph mapping",
            Self::Classification => "glyph classification",
            Self::Substitution => "glyph substitution",
            Self::Positioning => "glyph positioning",
        })
    }
}

/// Kind of a [`ShapeError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeErrorKind {
    /// Malformed font table.
    Parse(ParseError),
    /// Invalid context configuration.
    Config(ConfigError),
    /// Failure reported by a layout engine.
    Layout(LayoutError),
}

impl fmt::Display for ShapeErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => fmt::Display::fmt(err, formatter),
            Self::Config(err) => fmt::Display::fmt(err, formatter),
            Self::Layout(err) => fmt::Display::fmt(err, formatter),
        }
    }
}

impl From<ParseError> for ShapeErrorKind {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<ConfigError> for ShapeErrorKind {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LayoutError> for ShapeErrorKind {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

/// Errors that can occur during [`shape_full()`](crate::shape_full).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub(crate) stage: ShapeStage,
    pub(crate) kind: ShapeErrorKind,
}

impl ShapeError {
    pub(crate) fn new(stage: ShapeStage, kind: impl Into<ShapeErrorKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }

    /// Gets the stage at which the error occurred.
    pub fn stage(&self) -> ShapeStage {
        self.stage
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &ShapeErrorKind {
        &self.kind
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} failed: {}", self.stage, self.kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(match &self.kind {
            ShapeErrorKind::Parse(err) => err,
            ShapeErrorKind::Config(err) => err,
            ShapeErrorKind::Layout(err) => err,
        })
    }
}
