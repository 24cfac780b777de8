//! traitstack generates collections of layered images from trait selections.
//!
//! Every item of a collection is one row of a selection table naming, per trait category, the
//! variant it wears. A [`Catalog`] says which image file(s) each variant draws, possibly
//! depending on the other selections of the item, which variants cannot be combined, and
//! which ones stay out of the metadata.
//!
//! # Pipeline overview
//!
//! 1. **Read**: [`Table`] + [`TableLayout`] → [`RawItemSelection`] per row
//! 2. **Resolve**: [`resolve`] / [`resolve_all`] → ordered [`ResolvedItem`] (or a vetoed one)
//! 3. **Composite**: [`LayerCompositor`] stacks the item's layers with the "over" operator
//! 4. **Describe**: [`build_attributes`] + [`Blueprint`] → metadata document
//! 5. **Write**: [`Generator`] runs 3-4 on a worker pool and writes `<base>.png` +
//!    `<base>.json` per item
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic resolution**: resolving an item depends only on the catalog and the
//!   item's own selections.
//! - **Item isolation**: a failing item is reported and skipped; it never stops the batch and
//!   never leaves half of its output on disk.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod foundation;
mod input;
mod metadata;
mod pipeline;
mod render;
mod resolve;

pub use assets::decode::{decode_image, is_vector_path, load_layer};
pub use assets::svg_raster::{RasterSize, ResvgRasterizer, VectorRasterizer};
pub use catalog::model::{Catalog, FileEntry, FileOption, VariantDef};
pub use foundation::error::{ExclusionConflict, TraitStackError, TraitStackResult};
pub use input::table::{Table, TableLayout};
pub use metadata::attributes::{ATTRIBUTE_NUMBER_TRAIT, Attribute, build_attributes};
pub use metadata::blueprint::Blueprint;
pub use pipeline::check::{CheckReport, check};
pub use pipeline::config::{GenerateConfig, OutputNaming, output_base};
pub use pipeline::generate::{
    GenerationReport, Generator, ItemArtifacts, ItemFailure, ItemOutput, SupersededItem,
};
pub use render::composite::{StraightRgba8, over, over_in_place, overlay_top_left};
pub use render::compositor::{CompositorSettings, LayerCompositor};
pub use resolve::model::{RawItemSelection, ResolvedItem, ResolvedTrait};
pub use resolve::resolver::{Resolution, resolve, resolve_all};
