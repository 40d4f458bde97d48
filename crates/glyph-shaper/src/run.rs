//! Glyph runs threaded through the shaping pipeline.

use core::slice;

use crate::{alloc::Vec, GlyphClass, GlyphId};

/// Single record in a [`GlyphRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRecord {
    codepoint: u32,
    cluster: usize,
    glyph_id: Option<GlyphId>,
    glyph_class: GlyphClass,
}

impl GlyphRecord {
    /// Creates a record for the specified codepoint and cluster index. The record has no glyph
    /// and is unclassified.
    pub fn new(codepoint: u32, cluster: usize) -> Self {
        Self {
            codepoint,
            cluster,
            glyph_id: None,
            glyph_class: GlyphClass::Zero,
        }
    }

    /// Returns the source codepoint.
    pub fn codepoint(&self) -> u32 {
        self.codepoint
    }

    /// Returns the index of the source codepoint in the input.
    pub fn cluster(&self) -> usize {
        self.cluster
    }

    /// Returns the glyph ID, or `None` if the record wasn't mapped yet.
    pub fn glyph_id(&self) -> Option<GlyphId> {
        self.glyph_id
    }

    /// Sets the glyph ID.
    pub fn set_glyph_id(&mut self, glyph_id: GlyphId) {
        self.glyph_id = Some(glyph_id);
    }

    /// Returns the glyph class.
    pub fn glyph_class(&self) -> GlyphClass {
        self.glyph_class
    }

    /// Sets the glyph class.
    pub fn set_glyph_class(&mut self, class: GlyphClass) {
        self.glyph_class = class;
    }
}

/// Ordered sequence of [`GlyphRecord`]s, built once per shaping call and annotated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphRun {
    records: Vec<GlyphRecord>,
}

impl GlyphRun {
    /// Creates an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a run from a string; records are indexed by the char position.
    pub fn from_text(text: &str) -> Self {
        Self::from_codepoints(text.chars().map(u32::from))
    }

    /// Creates a run from a sequence of codepoints. Codepoints are not validated.
    pub fn from_codepoints(codepoints: impl IntoIterator<Item = u32>) -> Self {
        let records = codepoints
            .into_iter()
            .enumerate()
            .map(|(cluster, codepoint)| GlyphRecord::new(codepoint, cluster))
            .collect();
        Self { records }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks whether this run is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in the run order.
    pub fn iter(&self) -> slice::Iter<'_, GlyphRecord> {
        self.records.iter()
    }

    /// Iterates over mutable records in the run order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, GlyphRecord> {
        self.records.iter_mut()
    }

    /// Gets a record by index.
    pub fn get(&self, index: usize) -> Option<&GlyphRecord> {
        self.records.get(index)
    }

    /// Gets a mutable record by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut GlyphRecord> {
        self.records.get_mut(index)
    }

    /// Appends a record to the end of the run.
    pub fn push(&mut self, record: GlyphRecord) {
        self.records.push(record);
    }

    /// Inserts a record at `index`, shifting subsequent records.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, record: GlyphRecord) {
        self.records.insert(index, record);
    }

    /// Removes the record at `index`.
    pub fn remove(&mut self, index: usize) -> Option<GlyphRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Returns records as a slice.
    pub fn as_slice(&self) -> &[GlyphRecord] {
        &self.records
    }

    /// Iterates over glyph IDs of mapped records.
    pub fn glyph_ids(&self) -> impl Iterator<Item = GlyphId> + '_ {
        self.records.iter().filter_map(GlyphRecord::glyph_id)
    }
}

impl<'a> IntoIterator for &'a GlyphRun {
    type Item = &'a GlyphRecord;
    type IntoIter = slice::Iter<'a, GlyphRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a mut GlyphRun {
    type Item = &'a mut GlyphRecord;
    type IntoIter = slice::IterMut<'a, GlyphRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter_mut()
    }
}

impl FromIterator<GlyphRecord> for GlyphRun {
    fn from_iter<I: IntoIterator<Item = GlyphRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
