//! Shared test utilities: table builders and logging.

use std::{sync::OnceLock, vec, vec::Vec};

use tracing_subscriber::EnvFilter;

use crate::{font::SegmentWithDelta, Tag};


pub(crate) fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
            .ok();
    });
}

pub(crate) fn write_u16(writer: &mut Vec<u8>, value: u16) {
    writer.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn write_u32(writer: &mut Vec<u8>, value: u32) {
    writer.extend_from_slice(&value.to_be_bytes());
}

#[derive(Debug, Clone)]
enum TestSegment {
    Raw(SegmentWithDelta),
    Array {
        start_code: u16,
        id_delta: i16,
        glyphs: Vec<u16>,
    },
}

/// Builder for `cmap` format 4 subtables.
#[derive(Debug, Clone, Default)]
pub(crate) struct Format4Builder {
    segments: Vec<TestSegment>,
    extra_glyph_ids: Vec<u16>,
}

impl Format4Builder {
    /// Adds a segment mapping `start..=end` via the delta.
    pub(crate) fn delta(mut self, start_code: u16, end_code: u16, id_delta: i16) -> Self {
        self.segments.push(TestSegment::Raw(SegmentWithDelta {
            start_code,
            end_code,
            id_delta,
            id_range_offset: 0,
        }));
        self
    }

    /// Adds a segment mapping `start..start + glyphs.len()` via the glyph ID array.
    pub(crate) fn array(mut self, start_code: u16, id_delta: i16, glyphs: &[u16]) -> Self {
        assert!(!glyphs.is_empty());
        self.segments.push(TestSegment::Array {
            start_code,
            id_delta,
            glyphs: glyphs.to_vec(),
        });
        self
    }

    /// Adds a segment with the verbatim `idRangeOffset` value.
    pub(crate) fn raw(mut self, segment: SegmentWithDelta) -> Self {
        self.segments.push(TestSegment::Raw(segment));
        self
    }

    /// Appends glyph IDs to the end of the glyph ID array (after the glyphs of array segments).
    pub(crate) fn extra_glyph_ids(mut self, glyphs: &[u16]) -> Self {
        self.extra_glyph_ids.extend_from_slice(glyphs);
        self
    }

    /// Adds the terminating segment `0xffff..=0xffff` mapped to the missing glyph.
    pub(crate) fn sentinel(self) -> Self {
        self.delta(u16::MAX, u16::MAX, 1)
    }

    fn resolve_segments(&self) -> (Vec<SegmentWithDelta>, Vec<u16>) {
        let segment_count = self.segments.len();
        let mut glyph_id_array = vec![];
        let segments = self.segments.iter().enumerate().map(|(i, segment)| match segment {
            TestSegment::Raw(segment) => *segment,
            TestSegment::Array {
                start_code,
                id_delta,
                glyphs,
            } => {
                // Offset from this segment's `idRangeOffset` entry to the first glyph.
                let id_range_offset = 2 * (segment_count - i + glyph_id_array.len());
                glyph_id_array.extend_from_slice(glyphs);
                SegmentWithDelta {
                    start_code: *start_code,
                    end_code: *start_code + u16::try_from(glyphs.len() - 1).unwrap(),
                    id_delta: *id_delta,
                    id_range_offset: id_range_offset.try_into().unwrap(),
                }
            }
        });
        let segments: Vec<_> = segments.collect();
        glyph_id_array.extend_from_slice(&self.extra_glyph_ids);
        (segments, glyph_id_array)
    }

    pub(crate) fn write_subtable(&self, writer: &mut Vec<u8>) {
        let (segments, glyph_id_array) = self.resolve_segments();
        let subtable_len = 16 + 8 * segments.len() + 2 * glyph_id_array.len();

        write_u16(writer, 4); // subtable format
        write_u16(writer, subtable_len.try_into().unwrap());
        write_u16(writer, 0); // language

        let segment_count = u16::try_from(segments.len()).unwrap();
        write_u16(writer, 2 * segment_count);
        let entry_selector = segment_count.checked_ilog2().unwrap_or(0);
        let search_range = 1_u16 << (entry_selector + 1);
        write_u16(writer, search_range);
        write_u16(writer, entry_selector.try_into().unwrap());
        write_u16(writer, (2 * segment_count).saturating_sub(search_range));

        for segment in &segments {
            write_u16(writer, segment.end_code);
        }
        write_u16(writer, 0); // reserved padding
        for segment in &segments {
            write_u16(writer, segment.start_code);
        }
        for segment in &segments {
            writer.extend_from_slice(&segment.id_delta.to_be_bytes());
        }
        for segment in &segments {
            write_u16(writer, segment.id_range_offset);
        }
        for &glyph_id in &glyph_id_array {
            write_u16(writer, glyph_id);
        }
    }

    pub(crate) fn subtable(&self) -> Vec<u8> {
        let mut buffer = vec![];
        self.write_subtable(&mut buffer);
        buffer
    }

    /// Builds a `cmap` table with a single Unicode BMP encoding record.
    pub(crate) fn build_cmap(&self) -> Vec<u8> {
        cmap_table(&[(0, 3, &self.subtable())])
    }
}

/// Builds a `cmap` table from `(platform, encoding, subtable)` tuples. Subtables are laid out
/// in the record order.
pub(crate) fn cmap_table(records: &[(u16, u16, &[u8])]) -> Vec<u8> {
    let mut buffer = vec![];
    write_u16(&mut buffer, 0); // table version
    write_u16(&mut buffer, records.len().try_into().unwrap());

    let mut subtable_offset = 4 + 8 * records.len();
    for &(platform, encoding, subtable) in records {
        write_u16(&mut buffer, platform);
        write_u16(&mut buffer, encoding);
        write_u32(&mut buffer, subtable_offset.try_into().unwrap());
        subtable_offset += subtable.len();
    }
    for &(_, _, subtable) in records {
        buffer.extend_from_slice(subtable);
    }
    buffer
}

#[derive(Debug, Clone)]
pub(crate) enum TestClassDef {
    /// Format 1: consecutive class values starting from the glyph.
    Array { start_glyph: u16, classes: Vec<u16> },
    /// Format 2: `(start, end, class)` ranges.
    Ranges(Vec<(u16, u16, u16)>),
}

/// Builder for `GDEF` tables.
#[derive(Debug, Clone)]
pub(crate) struct GdefBuilder {
    version: u32,
    class_def: Option<TestClassDef>,
}

impl GdefBuilder {
    pub(crate) const V1_0: u32 = 0x_0001_0000;
    pub(crate) const V1_2: u32 = 0x_0001_0002;
    pub(crate) const V1_3: u32 = 0x_0001_0003;

    pub(crate) fn new(version: u32) -> Self {
        Self {
            version,
            class_def: None,
        }
    }

    pub(crate) fn ranges(ranges: &[(u16, u16, u16)]) -> Self {
        Self::new(Self::V1_0).class_def(TestClassDef::Ranges(ranges.to_vec()))
    }

    pub(crate) fn class_def(mut self, class_def: TestClassDef) -> Self {
        self.class_def = Some(class_def);
        self
    }

    pub(crate) fn header_len(&self) -> usize {
        match self.version {
            Self::V1_2 => 14,
            Self::V1_3 => 18,
            _ => 12,
        }
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let header_len = self.header_len();
        let mut buffer = vec![];
        write_u32(&mut buffer, self.version);
        let class_def_offset = if self.class_def.is_some() {
            u16::try_from(header_len).unwrap()
        } else {
            0
        };
        write_u16(&mut buffer, class_def_offset);
        write_u16(&mut buffer, 0); // attach list
        write_u16(&mut buffer, 0); // ligature caret list
        write_u16(&mut buffer, 0); // mark attachment class def
        if header_len >= 14 {
            write_u16(&mut buffer, 0); // mark glyph sets
        }
        if header_len >= 18 {
            write_u32(&mut buffer, 0); // item variation store
        }
        assert_eq!(buffer.len(), header_len);

        match &self.class_def {
            None => { /* no class definition */ }
            Some(TestClassDef::Array {
                start_glyph,
                classes,
            }) => {
                write_u16(&mut buffer, 1);
                write_u16(&mut buffer, *start_glyph);
                write_u16(&mut buffer, classes.len().try_into().unwrap());
                for &class in classes {
                    write_u16(&mut buffer, class);
                }
            }
            Some(TestClassDef::Ranges(ranges)) => {
                write_u16(&mut buffer, 2);
                write_u16(&mut buffer, ranges.len().try_into().unwrap());
                for &(start, end, class) in ranges {
                    write_u16(&mut buffer, start);
                    write_u16(&mut buffer, end);
                    write_u16(&mut buffer, class);
                }
            }
        }
        buffer
    }
}

/// Writes an sfnt font file containing the specified tables.
pub(crate) fn font_file(tables: &[(Tag, &[u8])]) -> Vec<u8> {
    const SFNT_HEADER_LEN: usize = 12;
    const TABLE_RECORD_LEN: usize = 16;

    let mut tables = tables.to_vec();
    tables.sort_unstable_by_key(|(tag, _)| *tag);

    let mut buffer = vec![];
    write_u32(&mut buffer, 0x_0001_0000);
    let table_count = u16::try_from(tables.len()).unwrap();
    write_u16(&mut buffer, table_count);
    let entry_selector = table_count.checked_ilog2().unwrap_or(0);
    let search_range = 1_u16 << (4 + entry_selector);
    write_u16(&mut buffer, search_range);
    write_u16(&mut buffer, entry_selector.try_into().unwrap());
    write_u16(&mut buffer, (16 * table_count).saturating_sub(search_range));

    let mut table_data = vec![];
    let data_offset = SFNT_HEADER_LEN + TABLE_RECORD_LEN * tables.len();
    for (tag, content) in &tables {
        let offset = data_offset + table_data.len();
        buffer.extend_from_slice(&tag.0);
        write_u32(&mut buffer, checksum(content));
        write_u32(&mut buffer, offset.try_into().unwrap());
        write_u32(&mut buffer, content.len().try_into().unwrap());

        table_data.extend_from_slice(content);
        // Pad the table heap to a 4-byte boundary.
        while table_data.len() % 4 != 0 {
            table_data.push(0);
        }
    }
    buffer.extend(table_data);
    buffer
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0_u32, |acc, chunk| {
        let mut word = [0_u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        acc.wrapping_add(u32::from_be_bytes(word))
    })
}

/// `cmap` table mapping `A..=F` to glyphs 36..=41, with the terminating segment.
pub(crate) fn latin_cmap() -> Vec<u8> {
    Format4Builder::default()
        .delta(65, 70, -29)
        .sentinel()
        .build_cmap()
}
