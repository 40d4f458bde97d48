//! Shaping pipeline.

use crate::{
    Direction, Face, FeatureSet, GlyphRun, LayoutError, ShapeError, ShapeStage, ShapingContext,
    Tag,
};

/// Parameters passed to a [`LayoutEngine`].
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct LayoutParams<'a> {
    /// Font face.
    pub face: &'a Face<'a>,
    /// OpenType script tag.
    pub script: Tag,
    /// OpenType language system tag.
    pub language: Tag,
    /// Text direction.
    pub direction: Direction,
    /// Enabled features.
    pub features: &'a FeatureSet,
}

/// Engine applying GSUB and GPOS features to an annotated [`GlyphRun`].
///
/// When called by [`shape_full()`], every record in the run has a glyph ID and a glyph class.
pub trait LayoutEngine {
    /// Applies glyph substitutions. The engine may insert, remove and replace records.
    ///
    /// # Errors
    ///
    /// Should return an error if substitution fails; this aborts shaping.
    fn apply_gsub(
        &mut self,
        params: &LayoutParams<'_>,
        run: &mut GlyphRun,
    ) -> Result<(), LayoutError>;

    /// Applies glyph positioning.
    ///
    /// # Errors
    ///
    /// Should return an error if positioning fails; this aborts shaping.
    fn apply_gpos(
        &mut self,
        params: &LayoutParams<'_>,
        run: &mut GlyphRun,
    ) -> Result<(), LayoutError>;
}

impl<L: LayoutEngine + ?Sized> LayoutEngine for &mut L {
    fn apply_gsub(
        &mut self,
        params: &LayoutParams<'_>,
        run: &mut GlyphRun,
    ) -> Result<(), LayoutError> {
        (**self).apply_gsub(params, run)
    }

    fn apply_gpos(
        &mut self,
        params: &LayoutParams<'_>,
        run: &mut GlyphRun,
    ) -> Result<(), LayoutError> {
        (**self).apply_gpos(params, run)
    }
}

/// [`LayoutEngine`] that leaves the run as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLayout;

impl LayoutEngine for NoopLayout {
    fn apply_gsub(&mut self, _: &LayoutParams<'_>, _: &mut GlyphRun) -> Result<(), LayoutError> {
        Ok(())
    }

    fn apply_gpos(&mut self, _: &LayoutParams<'_>, _: &mut GlyphRun) -> Result<(), LayoutError> {
        Ok(())
    }
}

/// Shapes the run: maps codepoints to nominal glyphs using `cmap`, classifies glyphs using `GDEF`
/// (if the face has this table), and then applies GSUB and GPOS features using the provided `engine`.
///
/// # Errors
///
/// Returns an error if the script or language are not set or have no OpenType tags, font tables
/// are malformed, or the layout engine fails. The first error aborts the remaining stages;
/// the run retains changes made by the completed stages.
#[tracing::instrument(level = "debug", skip_all, err, fields(len = run.len()))]
pub fn shape_full(
    ctx: &ShapingContext<'_>,
    run: &mut GlyphRun,
    mut engine: impl LayoutEngine,
) -> Result<(), ShapeError> {
    let stage = ShapeStage::TagResolution;
    let script = ctx.script_tag().map_err(|err| ShapeError::new(stage, err))?;
    let language = ctx
        .language_tag()
        .map_err(|err| ShapeError::new(stage, err))?;
    tracing::debug!(%script, %language, direction = ?ctx.direction(), "resolved tags");

    let face = ctx.face();
    let stage = ShapeStage::NominalMapping;
    face.char_map()
        .and_then(|char_map| char_map.map_run(run))
        .map_err(|err| ShapeError::new(stage, err))?;

    let stage = ShapeStage::Classification;
    let gdef = face.gdef().map_err(|err| ShapeError::new(stage, err))?;
    if let Some(gdef) = gdef {
        gdef.classify_run(run);
    } else {
        tracing::debug!("font has no `GDEF` table; skipping classification");
    }

    let params = LayoutParams {
        face,
        script,
        language,
        direction: ctx.direction(),
        features: ctx.features(),
    };
    engine
        .apply_gsub(&params, run)
        .map_err(|err| ShapeError::new(ShapeStage::Substitution, err))?;
    tracing::debug!(len = run.len(), "applied GSUB features");
    engine
        .apply_gpos(&params, run)
        .map_err(|err| ShapeError::new(ShapeStage::Positioning, err))?;
    tracing::debug!(len = run.len(), "applied GPOS features");
    Ok(())
}
