//! `GDEF` table processing.

use super::{Cursor, GlyphId, Tag};
use crate::{
    alloc::BTreeMap,
    errors::ParseErrorKind,
    GlyphRun, ParseError,
};

/// Glyph class from the `GDEF` glyph class definition.
///
/// Discriminants are bit flags: class value `n` is represented by bit `n - 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GlyphClass {
    /// Unclassified glyph.
    #[default]
    Zero = 0,
    /// Base glyph (single character, spacing glyph).
    Base = 1 << 0,
    /// Ligature glyph (multiple character, spacing glyph).
    Ligature = 1 << 1,
    /// Mark glyph (non-spacing combining glyph).
    Mark = 1 << 2,
    /// Component glyph (part of a single character, spacing glyph).
    Component = 1 << 3,
}

impl GlyphClass {
    /// Converts a class value from the glyph class definition (`1..=4`).
    pub fn from_class_value(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Base,
            2 => Self::Ligature,
            3 => Self::Mark,
            4 => Self::Component,
            _ => return None,
        })
    }

    /// Returns the class value as encoded in the glyph class definition; 0 for [`Self::Zero`].
    pub fn class_value(self) -> u16 {
        match self {
            Self::Zero => 0,
            Self::Base => 1,
            Self::Ligature => 2,
            Self::Mark => 3,
            Self::Component => 4,
        }
    }

    /// Returns the bit representation of this class.
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Version of the `GDEF` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GdefVersion {
    /// Version 1.0.
    V1_0,
    /// Version 1.2, adding mark glyph sets.
    V1_2,
    /// Version 1.3, adding the item variation store.
    V1_3,
}

impl GdefVersion {
    fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0x_0001_0000 => Self::V1_0,
            0x_0001_0002 => Self::V1_2,
            0x_0001_0003 => Self::V1_3,
            _ => return None,
        })
    }
}

/// Header of the `GDEF` table. All offsets are counted from the start of the table; 0 means
/// the corresponding subtable is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GdefHeader {
    /// Table version.
    pub version: GdefVersion,
    /// Offset to the glyph class definition.
    pub glyph_class_def_offset: u16,
    /// Offset to the attachment point list.
    pub attach_list_offset: u16,
    /// Offset to the ligature caret list.
    pub lig_caret_list_offset: u16,
    /// Offset to the mark attachment class definition.
    pub mark_attach_class_def_offset: u16,
    /// Offset to the mark glyph sets definition (version 1.2+).
    pub mark_glyph_sets_def_offset: Option<u16>,
    /// Offset to the item variation store (version 1.3).
    pub item_var_store_offset: Option<u32>,
}

impl GdefHeader {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        let version = cursor.read_u32_checked(|raw| {
            GdefVersion::from_raw(raw).ok_or(ParseErrorKind::UnexpectedTableVersion(raw))
        })?;
        let glyph_class_def_offset = cursor.read_u16()?;
        let attach_list_offset = cursor.read_u16()?;
        let lig_caret_list_offset = cursor.read_u16()?;
        let mark_attach_class_def_offset = cursor.read_u16()?;
        let mark_glyph_sets_def_offset = if version >= GdefVersion::V1_2 {
            Some(cursor.read_u16()?)
        } else {
            None
        };
        let item_var_store_offset = if version >= GdefVersion::V1_3 {
            Some(cursor.read_u32()?)
        } else {
            None
        };

        Ok(Self {
            version,
            glyph_class_def_offset,
            attach_list_offset,
            lig_caret_list_offset,
            mark_attach_class_def_offset,
            mark_glyph_sets_def_offset,
            item_var_store_offset,
        })
    }
}

/// Ordered map from glyph IDs to glyph classes.
///
/// The map stores disjoint glyph ranges keyed by their first glyph. Adjacent ranges with the same
/// class are merged, so two maps assigning the same classes are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    ranges: BTreeMap<u16, (u16, GlyphClass)>,
}

impl ClassMap {
    /// Assigns `class` to all glyphs in `start..=end`, overwriting previous assignments.
    /// If `start > end`, the map is not changed.
    pub fn set_value_for_keys(&mut self, start: u16, end: u16, class: GlyphClass) {
        if start > end {
            return;
        }

        // Split the range covering `start`, if any.
        if let Some((prev_start, (prev_end, prev_class))) = self.range_before(start) {
            if prev_end >= start {
                self.ranges.insert(prev_start, (start - 1, prev_class));
                if prev_end > end {
                    self.ranges.insert(end + 1, (prev_end, prev_class));
                }
            }
        }
        // Drop or trim ranges starting inside `start..=end`.
        loop {
            let next = self.ranges.range(start..=end).next();
            let Some((&range_start, &(range_end, range_class))) = next else {
                break;
            };
            self.ranges.remove(&range_start);
            if range_end > end {
                self.ranges.insert(end + 1, (range_end, range_class));
            }
        }

        let (mut start, mut end) = (start, end);
        if let Some((prev_start, (prev_end, prev_class))) = self.range_before(start) {
            if prev_class == class && prev_end.checked_add(1) == Some(start) {
                self.ranges.remove(&prev_start);
                start = prev_start;
            }
        }
        let next = end
            .checked_add(1)
            .and_then(|next_start| Some((next_start, *self.ranges.get(&next_start)?)));
        if let Some((next_start, (next_end, next_class))) = next {
            if next_class == class {
                self.ranges.remove(&next_start);
                end = next_end;
            }
        }
        self.ranges.insert(start, (end, class));
    }

    fn range_before(&self, glyph: u16) -> Option<(u16, (u16, GlyphClass))> {
        let (&start, &range) = self.ranges.range(..glyph).next_back()?;
        Some((start, range))
    }

    /// Checks whether the map contains the specified glyph.
    pub fn contains(&self, glyph: GlyphId) -> bool {
        self.get(glyph).is_some()
    }

    /// Gets the class for the specified glyph.
    pub fn get(&self, glyph: GlyphId) -> Option<GlyphClass> {
        let glyph = glyph.to_u16();
        let (_, &(end, class)) = self.ranges.range(..=glyph).next_back()?;
        (glyph <= end).then_some(class)
    }

    /// Returns the number of glyphs in this map.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|(&start, &(end, _))| usize::from(end - start) + 1)
            .sum()
    }

    /// Checks whether this map is empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over disjoint `(first glyph, last glyph, class)` ranges in the glyph ID order.
    pub fn ranges(&self) -> impl Iterator<Item = (GlyphId, GlyphId, GlyphClass)> + '_ {
        self.ranges
            .iter()
            .map(|(&start, &(end, class))| (GlyphId::new(start), GlyphId::new(end), class))
    }

    /// Iterates over glyphs and their classes in the glyph ID order.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId, GlyphClass)> + '_ {
        self.ranges.iter().flat_map(|(&start, &(end, class))| {
            (start..=end).map(move |glyph| (GlyphId::new(glyph), class))
        })
    }
}

/// Glyph class definition from the `GDEF` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphClassDef {
    /// Class ranges (format 2).
    Ranges(ClassMap),
    /// Unsupported format (e.g., the class array format 1). No glyphs are classified.
    Unsupported {
        /// Class definition format.
        format: u16,
    },
}

impl GlyphClassDef {
    const RANGES_FORMAT: u16 = 2;

    fn parse(mut cursor: Cursor<'_>) -> Result<Self, ParseError> {
        let format = cursor.read_u16()?;
        if format != Self::RANGES_FORMAT {
            tracing::warn!(format, "unsupported glyph class definition format");
            return Ok(Self::Unsupported { format });
        }

        let range_count = cursor.read_u16()?;
        tracing::debug!(range_count, "parsing glyph class ranges");
        let mut class_map = ClassMap::default();
        for _ in 0..range_count {
            let start_glyph_id = cursor.read_u16()?;
            let end_glyph_id = cursor.read_u16()?;
            let class = cursor.read_u16_checked(|value| {
                GlyphClass::from_class_value(value).ok_or(ParseErrorKind::InvalidGlyphClass(value))
            })?;
            tracing::trace!(start_glyph_id, end_glyph_id, ?class, "read class range");
            class_map.set_value_for_keys(start_glyph_id, end_glyph_id, class);
        }
        Ok(Self::Ranges(class_map))
    }

    /// Returns the class for the specified glyph. Glyphs not covered by the definition
    /// are [`GlyphClass::Zero`].
    pub fn classify(&self, glyph: GlyphId) -> GlyphClass {
        match self {
            Self::Ranges(map) => map.get(glyph).unwrap_or_default(),
            Self::Unsupported { .. } => GlyphClass::Zero,
        }
    }
}

/// Parsed `GDEF` table.
///
/// Only the glyph class definition is decoded; attachment points and ligature carets are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gdef {
    header: GdefHeader,
    glyph_class_def: Option<GlyphClassDef>,
}

impl Gdef {
    /// Parses the `GDEF` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table has an unsupported version, the glyph class definition
    /// is out of bounds, or it contains class values outside `1..=4`.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let table_cursor = Cursor::new(bytes, Some(Tag::GDEF));
        let mut cursor = table_cursor;
        let header = GdefHeader::parse(&mut cursor)?;
        tracing::debug!(?header, "parsed `GDEF` header");

        let glyph_class_def = match header.glyph_class_def_offset {
            0 => None,
            offset => Some(GlyphClassDef::parse(table_cursor.at(offset.into())?)?),
        };
        Ok(Self {
            header,
            glyph_class_def,
        })
    }

    /// Returns the table header.
    pub fn header(&self) -> &GdefHeader {
        &self.header
    }

    /// Returns the glyph class definition, if present.
    pub fn glyph_class_def(&self) -> Option<&GlyphClassDef> {
        self.glyph_class_def.as_ref()
    }

    /// Returns the class for the specified glyph.
    pub fn classify(&self, glyph: GlyphId) -> GlyphClass {
        self.glyph_class_def
            .as_ref()
            .map_or(GlyphClass::Zero, |class_def| class_def.classify(glyph))
    }

    /// Overwrites glyph classes of all records in the run. If the table has no glyph class definition,
    /// the run is left as-is. Records without a mapped glyph are [`GlyphClass::Zero`].
    pub fn classify_run(&self, run: &mut GlyphRun) {
        let Some(class_def) = &self.glyph_class_def else {
            tracing::debug!("`GDEF` has no glyph class definition; skipping classification");
            return;
        };
        for record in run.iter_mut() {
            let class = record
                .glyph_id()
                .map_or(GlyphClass::Zero, |glyph| class_def.classify(glyph));
            record.set_glyph_class(class);
        }
        tracing::debug!(len = run.len(), "classified glyph run");
    }
}
