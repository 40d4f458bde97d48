//! `cmap` table processing.

use core::fmt;

use super::{Cursor, GlyphId, Tag};
use crate::{alloc::Vec, errors::ParseErrorKind, GlyphRun, ParseError};

/// Platform of a `cmap` encoding record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CmapPlatform {
    /// Unicode platform (various encodings).
    Unicode,
    /// Macintosh platform (script manager codes).
    Macintosh,
    /// ISO encodings (deprecated).
    Iso,
    /// Windows platform.
    Windows,
    /// Custom encodings.
    Custom,
    /// Platform ID without a registered meaning (e.g., user-defined platforms `240..=255`).
    Other(u16),
}

impl From<u16> for CmapPlatform {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Self::Unicode,
            1 => Self::Macintosh,
            2 => Self::Iso,
            3 => Self::Windows,
            4 => Self::Custom,
            other => Self::Other(other),
        }
    }
}

impl CmapPlatform {
    /// Returns the raw platform ID.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Unicode => 0,
            Self::Macintosh => 1,
            Self::Iso => 2,
            Self::Windows => 3,
            Self::Custom => 4,
            Self::Other(raw) => raw,
        }
    }

    /// Returns the human-readable platform name, or `None` for unregistered platforms.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::Unicode => "Unicode",
            Self::Macintosh => "Macintosh",
            Self::Iso => "ISO",
            Self::Windows => "Windows",
            Self::Custom => "Custom",
            Self::Other(_) => return None,
        })
    }
}

impl fmt::Display for CmapPlatform {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => formatter.write_str(name),
            None => write!(formatter, "unknown ({})", self.to_u16()),
        }
    }
}

/// Encoding record in the `cmap` table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingRecord {
    /// Platform.
    pub platform: CmapPlatform,
    /// Platform-specific encoding ID.
    pub encoding_id: u16,
    /// Byte offset from the beginning of the `cmap` table to the subtable.
    pub subtable_offset: u32,
}

impl EncodingRecord {
    const BYTE_LEN: usize = 8;

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            platform: cursor.read_u16()?.into(),
            encoding_id: cursor.read_u16()?,
            subtable_offset: cursor.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SegmentWithDelta {
    pub(crate) start_code: u16,
    pub(crate) end_code: u16,
    pub(crate) id_delta: i16,
    pub(crate) id_range_offset: u16,
}

impl SegmentWithDelta {
    fn contains(&self, c: u32) -> bool {
        u32::from(self.start_code) <= c && c <= u32::from(self.end_code)
    }
}

/// Segment mapping to delta values (format 4) subtable of the `cmap` table.
#[derive(Debug, Clone)]
pub(crate) struct SegmentDeltas<'a> {
    pub(crate) segments: Vec<SegmentWithDelta>,
    /// Subtable data starting from the `idRangeOffsets` array and including the `glyphIdArray`.
    /// Glyph ID offsets are counted from the `idRangeOffsets` entry of the segment.
    range_offsets: Cursor<'a>,
}

impl<'a> SegmentDeltas<'a> {
    const FORMAT: u16 = 4;

    fn parse(mut cursor: Cursor<'a>) -> Result<Self, ParseError> {
        let subtable_cursor = cursor;
        cursor.read_u16_checked(|format| {
            if format != Self::FORMAT {
                return Err(ParseErrorKind::UnexpectedTableFormat(format));
            }
            Ok(())
        })?;
        let subtable_len = cursor.read_u16()?;
        tracing::debug!(subtable_len, "parsing `cmap` format 4 subtable");
        // The declared length bounds all further reads.
        cursor = subtable_cursor.range(0..usize::from(subtable_len))?;
        cursor.skip(4)?; // format, length

        let language = cursor.read_u16()?;
        let segment_count = cursor.read_u16_checked(|seg_count_x2| {
            if seg_count_x2 % 2 != 0 {
                return Err(ParseErrorKind::OddSegmentCount(seg_count_x2));
            }
            Ok(seg_count_x2 >> 1)
        })?;
        let search_range = cursor.read_u16()?;
        let entry_selector = cursor.read_u16()?;
        let range_shift = cursor.read_u16()?;
        tracing::trace!(
            language,
            segment_count,
            search_range,
            entry_selector,
            range_shift,
            "read format 4 header"
        );

        let vec_len = 2 * usize::from(segment_count);
        let mut end_codes = cursor.split_at(vec_len)?;
        cursor.skip(2)?; // reserved padding
        let mut start_codes = cursor.split_at(vec_len)?;
        let mut id_deltas = cursor.split_at(vec_len)?;
        let range_offsets = cursor;
        let mut id_range_offsets = cursor.split_at(vec_len)?;

        let segments = (0..segment_count).map(|_| {
            Ok(SegmentWithDelta {
                start_code: start_codes.read_u16()?,
                end_code: end_codes.read_u16()?,
                id_delta: id_deltas.read_i16()?,
                id_range_offset: id_range_offsets.read_u16()?,
            })
        });

        Ok(Self {
            segments: segments.collect::<Result<_, ParseError>>()?,
            range_offsets,
        })
    }

    /// Maps a codepoint using the first segment containing it.
    fn map_codepoint(&self, c: u32) -> Result<GlyphId, ParseError> {
        let Some((segment_idx, segment)) = self
            .segments
            .iter()
            .enumerate()
            .find(|(_, segment)| segment.contains(c))
        else {
            return Ok(GlyphId::NOTDEF);
        };

        // `contains()` guarantees that `c` fits into `u16`
        #[allow(clippy::cast_possible_truncation)]
        let c = c as u16;
        #[allow(clippy::cast_sign_loss)] // deltas are applied modulo 65536
        let id_delta = segment.id_delta as u16;
        if segment.id_range_offset == 0 {
            return Ok(GlyphId::new(c.wrapping_add(id_delta)));
        }

        let slot = segment_idx
            + usize::from(segment.id_range_offset / 2)
            + usize::from(c - segment.start_code);
        let slot_offset = 2 * slot;
        if slot_offset + 2 > self.range_offsets.bytes.len() {
            let absolute_offset = self.range_offsets.offset() + slot_offset;
            return Err(self
                .range_offsets
                .err(ParseErrorKind::OffsetOutOfBounds(absolute_offset)));
        }
        let raw_glyph_id = self.range_offsets.at(slot_offset)?.read_u16()?;
        tracing::trace!(segment_idx, slot, raw_glyph_id, "read glyph ID array entry");
        Ok(if raw_glyph_id == 0 {
            GlyphId::NOTDEF
        } else {
            GlyphId::new(raw_glyph_id.wrapping_add(id_delta))
        })
    }
}

#[derive(Debug, Clone)]
enum CmapSubtable<'a> {
    SegmentDeltas(SegmentDeltas<'a>),
    Unsupported { format: u16 },
    NoUnicodeEncoding,
}

/// Support level of a [`CharMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmapSupport {
    /// The selected subtable is decoded.
    Supported,
    /// The first Unicode subtable has an unsupported format. All codepoints map to the missing glyph.
    UnsupportedFormat(u16),
    /// The table has no Unicode encoding records. All codepoints map to the missing glyph.
    NoUnicodeEncoding,
}

/// Parsed `cmap` table mapping Unicode codepoints to glyphs.
///
/// Only the first encoding record with the Unicode platform is considered, and only
/// format 4 subtables (segment mapping to delta values) are decoded.
#[derive(Debug, Clone)]
pub struct CharMap<'a> {
    encoding: Option<EncodingRecord>,
    subtable: CmapSubtable<'a>,
}

impl<'a> CharMap<'a> {
    /// Parses the `cmap` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is malformed; e.g., has an unexpected version, or the selected
    /// subtable is out of bounds.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ParseError> {
        let table_cursor = Cursor::new(bytes, Some(Tag::CMAP));
        let mut cursor = table_cursor;
        cursor.read_u16_checked(|version| {
            if version != 0 {
                return Err(ParseErrorKind::UnexpectedTableVersion(version.into()));
            }
            Ok(())
        })?;

        let num_tables = cursor.read_u16()?;
        tracing::debug!(num_tables, "parsing `cmap` table");
        let mut records = cursor.split_at(EncodingRecord::BYTE_LEN * usize::from(num_tables))?;
        for _ in 0..num_tables {
            let record = EncodingRecord::parse(&mut records)?;
            tracing::trace!(
                platform = record.platform.name().unwrap_or("unknown"),
                encoding_id = record.encoding_id,
                subtable_offset = record.subtable_offset,
                "read encoding record"
            );
            if record.platform != CmapPlatform::Unicode {
                continue;
            }

            let subtable_cursor = table_cursor.at(record.subtable_offset as usize)?;
            let format = { subtable_cursor }.read_u16()?;
            let subtable = if format == SegmentDeltas::FORMAT {
                CmapSubtable::SegmentDeltas(SegmentDeltas::parse(subtable_cursor)?)
            } else {
                tracing::warn!(format, "unsupported `cmap` subtable format");
                CmapSubtable::Unsupported { format }
            };
            return Ok(Self {
                encoding: Some(record),
                subtable,
            });
        }

        tracing::warn!("no Unicode encoding records in `cmap` table");
        Ok(Self {
            encoding: None,
            subtable: CmapSubtable::NoUnicodeEncoding,
        })
    }

    /// Returns the encoding record selected for mapping, if any.
    pub fn encoding(&self) -> Option<EncodingRecord> {
        self.encoding
    }

    /// Returns the support level for the selected subtable.
    pub fn support(&self) -> CmapSupport {
        match &self.subtable {
            CmapSubtable::SegmentDeltas(_) => CmapSupport::Supported,
            CmapSubtable::Unsupported { format } => CmapSupport::UnsupportedFormat(*format),
            CmapSubtable::NoUnicodeEncoding => CmapSupport::NoUnicodeEncoding,
        }
    }

    /// Maps a codepoint to a glyph. Codepoints not covered by the table map to [`GlyphId::NOTDEF`].
    ///
    /// # Errors
    ///
    /// Returns an error if the glyph ID array entry for the codepoint is out of bounds.
    pub fn resolve(&self, codepoint: u32) -> Result<GlyphId, ParseError> {
        match &self.subtable {
            CmapSubtable::SegmentDeltas(deltas) => deltas.map_codepoint(codepoint),
            CmapSubtable::Unsupported { .. } | CmapSubtable::NoUnicodeEncoding => {
                Ok(GlyphId::NOTDEF)
            }
        }
    }

    /// Overwrites glyph IDs of all records in the run, in run order.
    ///
    /// # Errors
    ///
    /// Returns an error if mapping any of the codepoints fails. Records preceding the failing one
    /// remain mapped.
    pub fn map_run(&self, run: &mut GlyphRun) -> Result<(), ParseError> {
        let mut missing_count = 0_usize;
        for record in run.iter_mut() {
            let glyph_id = self.resolve(record.codepoint())?;
            if glyph_id == GlyphId::NOTDEF {
                missing_count += 1;
            }
            record.set_glyph_id(glyph_id);
        }
        tracing::debug!(
            len = run.len(),
            missing_count,
            support = ?self.support(),
            "mapped glyph run"
        );
        Ok(())
    }
}
