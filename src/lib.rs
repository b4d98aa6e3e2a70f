//! Analysis-and-rewrite engine that flattens static Lottie vector content
//! into pre-rendered raster images.
//!
//! The engine decides which layers and assets never visually change over
//! time, freezes each candidate to a single representative keyframe state,
//! asks an external renderer for a raster of that state, and rewrites the
//! document graph to reference the raster instead of the vector payload. The
//! result plays pixel-equivalent at a fraction of the evaluation cost.
//!
//! # Pipeline overview
//!
//! 1. **Extract**: walk layer → asset references down to the leaf assets and
//!    direct top-level layers that qualify ([`extract_units`], filtered by
//!    [`should_flatten`])
//! 2. **Normalize**: freeze each unit's transform to its resting pose
//!    ([`freeze_unit`])
//! 3. **Render** (external): rasterize each unit's subset document
//!    ([`LayerRenderer`])
//! 4. **Crop**: bound the frame to its content pixels ([`content_bounds`])
//! 5. **Rewrite**: substitute a generated raster asset for the vector layer
//!    ([`substitute`])
//! 6. **Export** (external): deliver the rewritten document exactly once
//!    ([`DocumentExporter`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pristine source**: all work happens on a clone produced once per run;
//!   the input document is never mutated.
//! - **Fail closed**: position sources that cannot be merged without guessing
//!   make their layer ineligible instead of being approximated.
//! - **No IO in the core**: rendering, image encoding, and delivery live
//!   behind collaborator traits.
#![forbid(unsafe_code)]

mod algebra;
mod classify;
mod document;
mod foundation;
mod graph;
mod normalize;
mod orchestrate;
mod raster;
mod rewrite;

pub use algebra::position::{
    Position, combine_position, final_position, layer_position, representative_value,
    shape_position,
};
pub use classify::eligibility::{
    has_position_change, has_repeater, has_rotation_change, has_scale_change, should_flatten,
};
pub use document::model::{
    AnimationDocument, Asset, Keyframed, Layer, LayerKind, PositionProperty, Property, Segment,
    ShapeItem, SplitPosition, Transform, find_layer, find_layer_mut,
};
pub use foundation::error::{StaticizeError, StaticizeResult};
pub use graph::extract::{
    EligibleUnit, Extraction, UnitOwner, base_assets, collect_layer_ref_ids, extract_units,
};
pub use normalize::freeze::{freeze_transform, freeze_unit};
pub use orchestrate::run::{
    DocumentExporter, LayerRenderer, PngFileEncoder, Progress, RasterEncoder, RenderRequest,
    StaticizeOptions, StaticizeRun, UnitId, staticize,
};
pub use raster::crop::{CropRect, content_bounds, crop};
pub use rewrite::substitute::{RasterResult, substitute};
