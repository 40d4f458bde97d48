//! Codepoint-to-glyph resolution and glyph classification for OpenType shaping.
//!
//! The crate covers the front of a shaping pipeline: it maps Unicode codepoints to nominal glyph IDs
//! using the `cmap` table (format 4), classifies glyphs using the `GDEF` glyph class definition,
//! and hands the annotated [`GlyphRun`] to external GSUB / GPOS engines via [`LayoutEngine`].
//!
//! # Crate features
//!
//! ## `std`
//!
//! *(On by default)*
//!
//! Enables `std::error::Error` implementations for error types. Without this feature,
//! the crate only depends on `alloc`.
//!
//! # Examples
//!
//! ```
//! use glyph_shaper::{
//!     shape_full, Face, Feature, FeatureSet, GlyphRun, Language, NoopLayout, Script,
//!     ShapingContext, Tag,
//! };
//!
//! # fn build_cmap() -> Vec<u8> {
//! #     let words: [u16; 20] = [
//! #         0, 1, // version, numTables
//! #         0, 3, 0, 12, // platform, encoding, offset (u32)
//! #         4, 32, 0, 4, 4, 1, 0, // format, length, language, segCountX2, searchRange, ...
//! #         70, 0xffff, 0, 65, 0xffff, // endCodes, pad, startCodes
//! #         (-29_i16) as u16, 1, // idDeltas
//! #     ];
//! #     let mut bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
//! #     bytes.extend_from_slice(&[0; 4]); // idRangeOffsets
//! #     bytes
//! # }
//! let cmap = build_cmap();
//! let face = Face::from_tables([(Tag::CMAP, cmap.as_slice())]);
//! let mut context = ShapingContext::new(&face);
//! context.set_script(Script::Latin);
//! context.set_language(Language::Default);
//! let features: FeatureSet = [Feature::Kerning, Feature::StandardLigatures]
//!     .into_iter()
//!     .collect();
//! context.set_features(&features)?;
//!
//! let mut run = GlyphRun::from_text("AB");
//! shape_full(&context, &mut run, &mut NoopLayout)?;
//! let glyphs: Vec<_> = run.iter().map(|record| record.glyph_id().unwrap().to_u16()).collect();
//! assert_eq!(glyphs, [36, 37]);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

#![no_std]
#![doc(html_root_url = "https://docs.rs/glyph-shaper/0.1.0")]

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc as std_alloc;

mod context;
mod errors;
mod features;
mod font;
mod run;
mod shape;
#[cfg(test)]
pub(crate) mod tests;

pub use crate::{
    context::{Direction, Language, Script, ShapingContext},
    errors::{
        ConfigError, LayoutError, ParseError, ParseErrorKind, ShapeError, ShapeErrorKind,
        ShapeStage,
    },
    features::{Feature, FeatureSet},
    font::{
        CharMap, ClassMap, CmapPlatform, CmapSupport, EncodingRecord, Face, Gdef, GdefHeader,
        GdefVersion, GlyphClass, GlyphClassDef, GlyphId, Tag,
    },
    run::{GlyphRecord, GlyphRun},
    shape::{shape_full, LayoutEngine, LayoutParams, NoopLayout},
};

mod alloc {
    pub(crate) use std_alloc::{
        collections::BTreeMap,
        string::String,
        vec,
        vec::Vec,
    };
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
