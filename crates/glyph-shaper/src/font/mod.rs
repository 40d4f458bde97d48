//! OpenType parsing logic.

use core::{fmt, ops};

pub use self::{
    cmap::{CharMap, CmapPlatform, CmapSupport, EncodingRecord},
    gdef::{ClassMap, Gdef, GdefHeader, GdefVersion, GlyphClass, GlyphClassDef},
};
#[cfg(test)]
pub(crate) use self::cmap::SegmentWithDelta;
use crate::{
    alloc::BTreeMap,
    errors::{ParseError, ParseErrorKind},
};

mod cmap;
mod gdef;

/// Bounded big-endian reader over table data.
///
/// Errors produced by the cursor record the offset relative to the start of the table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    pub(crate) bytes: &'a [u8],
    offset: usize,
    table: Option<Tag>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], table: Option<Tag>) -> Self {
        Self {
            bytes,
            offset: 0,
            table,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            offset: self.offset,
            table: self.table,
        }
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        if self.bytes.len() < n {
            Err(self.err(ParseErrorKind::UnexpectedEof))
        } else {
            self.bytes = &self.bytes[n..];
            self.offset += n;
            Ok(())
        }
    }

    fn read_byte_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let Some((head, tail)) = self.bytes.split_first_chunk::<N>() else {
            return Err(self.err(ParseErrorKind::UnexpectedEof));
        };
        self.bytes = tail;
        self.offset += N;
        Ok(*head)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ParseError> {
        self.read_byte_array().map(u16::from_be_bytes)
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, ParseError> {
        self.read_byte_array().map(i16::from_be_bytes)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ParseError> {
        self.read_byte_array().map(u32::from_be_bytes)
    }

    pub(crate) fn read_tag(&mut self) -> Result<Tag, ParseError> {
        self.read_byte_array().map(Tag)
    }

    /// Reads a `u16` and validates it. Validation errors point to the start of the value.
    pub(crate) fn read_u16_checked<T>(
        &mut self,
        check: impl FnOnce(u16) -> Result<T, ParseErrorKind>,
    ) -> Result<T, ParseError> {
        let start = *self;
        let value = self.read_u16()?;
        check(value).map_err(|kind| start.err(kind))
    }

    /// Reads a `u32` and validates it. Validation errors point to the start of the value.
    pub(crate) fn read_u32_checked<T>(
        &mut self,
        check: impl FnOnce(u32) -> Result<T, ParseErrorKind>,
    ) -> Result<T, ParseError> {
        let start = *self;
        let value = self.read_u32()?;
        check(value).map_err(|kind| start.err(kind))
    }

    /// Splits off the first `len` bytes into a separate cursor and advances this cursor past them.
    pub(crate) fn split_at(&mut self, len: usize) -> Result<Self, ParseError> {
        if self.bytes.len() < len {
            return Err(self.err(ParseErrorKind::UnexpectedEof));
        }
        let (head, tail) = self.bytes.split_at(len);
        let head = Self {
            bytes: head,
            ..*self
        };
        self.bytes = tail;
        self.offset += len;
        Ok(head)
    }

    /// Restricts the cursor to the specified range (relative to the current position).
    pub(crate) fn range(&self, range: ops::Range<usize>) -> Result<Self, ParseError> {
        let bytes = self.bytes.get(range.clone()).ok_or_else(|| {
            self.err(ParseErrorKind::RangeOutOfBounds {
                range: range.clone(),
                len: self.bytes.len(),
            })
        })?;
        Ok(Self {
            bytes,
            offset: self.offset + range.start,
            table: self.table,
        })
    }

    /// Returns a cursor positioned at `offset` from the current position.
    pub(crate) fn at(&self, offset: usize) -> Result<Self, ParseError> {
        if offset > self.bytes.len() {
            return Err(self.err(ParseErrorKind::OffsetOutOfBounds(self.offset + offset)));
        }
        Ok(Self {
            bytes: &self.bytes[offset..],
            offset: self.offset + offset,
            table: self.table,
        })
    }
}

/// Four-byte OpenType tag, e.g. for a table, script, language system or feature.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl fmt::Debug for Tag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Tag(\"{self}\")")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(formatter, "{}", char::from(byte))?;
            } else {
                write!(formatter, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl Tag {
    /// `cmap` table.
    pub const CMAP: Self = Self(*b"cmap");
    /// `GDEF` table.
    pub const GDEF: Self = Self(*b"GDEF");
    /// `GSUB` table.
    pub const GSUB: Self = Self(*b"GSUB");
    /// `GPOS` table.
    pub const GPOS: Self = Self(*b"GPOS");

    /// Creates a tag from its bytes.
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    /// Creates a tag from its big-endian `u32` representation.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    /// Converts this tag to the big-endian `u32` representation.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

/// Glyph identifier in a font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphId(u16);

impl GlyphId {
    /// Missing glyph (`.notdef`).
    pub const NOTDEF: Self = Self(0);

    /// Wraps a raw glyph ID.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw glyph ID.
    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for GlyphId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for GlyphId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "gid{}", self.0)
    }
}

/// Font face: a collection of raw OpenType tables.
///
/// A face only borrows table data, so it can be shared among threads, each using its own
/// [`ShapingContext`](crate::ShapingContext) and [`GlyphRun`](crate::GlyphRun).
#[derive(Debug, Clone, Default)]
pub struct Face<'a> {
    tables: BTreeMap<Tag, &'a [u8]>,
}

impl<'a> Face<'a> {
    const TRUETYPE_VERSION: u32 = 0x_0001_0000;
    const OPENTYPE_VERSION: u32 = 0x_4f54_544f; // `OTTO`
    const APPLE_VERSION: u32 = 0x_7472_7565; // `true`
    const TABLE_RECORD_LEN: usize = 16;

    /// Parses the table directory of a TrueType / OpenType font file.
    ///
    /// # Errors
    ///
    /// Returns an error if the font header is malformed, any table record points outside the font data,
    /// or the `cmap` table is missing.
    pub fn new(bytes: &'a [u8]) -> Result<Self, ParseError> {
        let font = Cursor::new(bytes, None);
        let mut cursor = font;
        cursor.read_u32_checked(|version| match version {
            Self::TRUETYPE_VERSION | Self::OPENTYPE_VERSION | Self::APPLE_VERSION => Ok(()),
            _ => Err(ParseErrorKind::UnexpectedFontVersion),
        })?;
        let table_count = cursor.read_u16()?;
        cursor.skip(6)?; // searchRange, entrySelector, rangeShift

        let mut records = cursor.split_at(Self::TABLE_RECORD_LEN * usize::from(table_count))?;
        let mut tables = BTreeMap::new();
        for _ in 0..table_count {
            let tag = records.read_tag()?;
            records.skip(4)?; // checksum
            let offset = records.read_u32()? as usize;
            let len = records.read_u32()? as usize;
            let table = font.range(offset..offset.saturating_add(len))?;
            tracing::trace!(%tag, offset, len, "read table record");
            tables.entry(tag).or_insert(table.bytes);
        }

        if !tables.contains_key(&Tag::CMAP) {
            return Err(ParseError::missing_table(Tag::CMAP));
        }
        tracing::debug!(table_count, "parsed font table directory");
        Ok(Self { tables })
    }

    /// Creates a face from raw table buffers. If a tag is repeated, the first occurrence wins.
    pub fn from_tables(tables: impl IntoIterator<Item = (Tag, &'a [u8])>) -> Self {
        let mut this = Self::default();
        for (tag, bytes) in tables {
            this.tables.entry(tag).or_insert(bytes);
        }
        this
    }

    /// Gets raw data for the table with the specified tag.
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        self.tables.get(&tag).copied()
    }

    /// Iterates over all tables in this face, ordered by tag.
    pub fn tables(&self) -> impl Iterator<Item = (Tag, &'a [u8])> + '_ {
        self.tables.iter().map(|(&tag, &bytes)| (tag, bytes))
    }

    /// Parses the `cmap` table of this face.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or malformed.
    pub fn char_map(&self) -> Result<CharMap<'a>, ParseError> {
        let bytes = self
            .table(Tag::CMAP)
            .ok_or_else(|| ParseError::missing_table(Tag::CMAP))?;
        CharMap::parse(bytes)
    }

    /// Parses the `GDEF` table of this face, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is malformed.
    pub fn gdef(&self) -> Result<Option<Gdef>, ParseError> {
        self.table(Tag::GDEF).map(Gdef::parse).transpose()
    }

    /// Maps a single codepoint to a glyph. This parses the `cmap` table on each call;
    /// use [`Self::char_map()`] to map multiple codepoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the `cmap` table is missing or malformed.
    pub fn resolve(&self, codepoint: u32) -> Result<GlyphId, ParseError> {
        self.char_map()?.resolve(codepoint)
    }
}
