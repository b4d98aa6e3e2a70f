//! Run orchestration: fan out one render request per eligible unit, track
//! completion, trigger export exactly once.
//!
//! The run is an explicit state machine (`Dispatched → AllResolved`), with a
//! per-unit resolved flag and a completion count. `Progress::Complete` is the
//! transition edge and is observed exactly once; duplicate or late signals are
//! absorbed without side effects, so the exactly-once export guarantee is
//! structural rather than incidental.
//!
//! Rendering, image encoding, and document delivery are external
//! collaborators behind traits; the core suspends only at those boundaries.
//! There is no timeout: a dispatched unit whose signal never arrives leaves
//! the run in `Dispatched` forever, and the host must surface that as an
//! operational timeout.

use std::path::PathBuf;

use image::RgbaImage;

use crate::document::model::AnimationDocument;
use crate::foundation::error::{StaticizeError, StaticizeResult};
use crate::graph::extract::{EligibleUnit, Extraction, extract_units};
use crate::normalize::freeze::freeze_unit;
use crate::raster::crop::{content_bounds, crop};
use crate::rewrite::substitute::{RasterResult, substitute};

/// Options for one staticize run.
#[derive(Clone, Debug)]
pub struct StaticizeOptions {
    /// Filename handed to the exporter.
    pub filename: String,
    /// Supersample factor: frames render at `multiple_size` times the
    /// document viewport, and generated asset sizes are divided back down.
    pub multiple_size: u32,
}

impl Default for StaticizeOptions {
    fn default() -> Self {
        Self {
            filename: "static.json".to_string(),
            multiple_size: 2,
        }
    }
}

/// External renderer: draws a single-unit subset document at its current
/// (post-normalization) keyframe state. Must not mutate the subset.
pub trait LayerRenderer {
    /// Rasterize `subset` into an RGBA frame of the given viewport size.
    fn render(
        &mut self,
        subset: &AnimationDocument,
        width: u32,
        height: u32,
    ) -> StaticizeResult<RgbaImage>;
}

/// External raster encoder: turns a cropped frame into the opaque image
/// reference stored in the generated asset.
pub trait RasterEncoder {
    /// Encode `image`, keyed by the generated asset id for uniqueness.
    fn encode(&mut self, image: &RgbaImage, asset_id: &str) -> StaticizeResult<String>;
}

/// External exporter: serializes and delivers the rewritten document.
pub trait DocumentExporter {
    /// Deliver `doc` under `filename`. Invoked exactly once per run.
    fn export(&mut self, doc: &AnimationDocument, filename: &str) -> StaticizeResult<()>;
}

/// Stock encoder writing PNG files under a directory; the returned reference
/// is the file name, suitable for the generated asset's `p` field.
#[derive(Clone, Debug)]
pub struct PngFileEncoder {
    dir: PathBuf,
}

impl PngFileEncoder {
    /// Encoder writing into `dir` (created on first use).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RasterEncoder for PngFileEncoder {
    fn encode(&mut self, image: &RgbaImage, asset_id: &str) -> StaticizeResult<String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StaticizeError::raster(format!("create {:?}: {e}", self.dir)))?;
        let name = format!("{asset_id}.png");
        let path = self.dir.join(&name);
        image
            .save(&path)
            .map_err(|e| StaticizeError::raster(format!("write {path:?}: {e}")))?;
        Ok(name)
    }
}

/// Identifies one eligible unit within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitId(pub usize);

/// One render request handed to the host.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Unit to resolve with the rendered frame.
    pub unit: UnitId,
    /// Single-unit subset document, already normalized.
    pub subset: AnimationDocument,
    /// Render viewport width in pixels.
    pub width: u32,
    /// Render viewport height in pixels.
    pub height: u32,
}

/// Outcome of one resolution step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Units are still outstanding. A late or duplicate signal after
    /// completion also reports `Pending` with `resolved == total`, so it can
    /// never re-trigger an export.
    Pending {
        /// Units resolved so far.
        resolved: usize,
        /// Total eligible units.
        total: usize,
    },
    /// The final outstanding unit just resolved. Observed exactly once.
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Dispatched,
    AllResolved,
}

/// One in-flight staticize run over an exclusively owned working document.
#[derive(Debug)]
pub struct StaticizeRun {
    working: AnimationDocument,
    units: Vec<EligibleUnit>,
    parents: std::collections::HashSet<(crate::graph::extract::UnitOwner, i64)>,
    resolved: Vec<bool>,
    resolved_count: usize,
    state: RunState,
    multiple_size: u32,
}

impl StaticizeRun {
    /// Start a run: clone the pristine source, extract and normalize the
    /// eligible units. With zero units the run begins already complete.
    #[tracing::instrument(skip(source, options))]
    pub fn begin(source: &AnimationDocument, options: &StaticizeOptions) -> StaticizeRun {
        let working = source.clone();
        let Extraction { mut units, parents } = extract_units(source);
        for unit in &mut units {
            freeze_unit(unit);
        }
        let total = units.len();
        tracing::debug!(total, "run started");
        StaticizeRun {
            working,
            resolved: vec![false; total],
            resolved_count: 0,
            state: if total == 0 {
                RunState::AllResolved
            } else {
                RunState::Dispatched
            },
            units,
            parents,
            multiple_size: options.multiple_size.max(1),
        }
    }

    /// Number of eligible units in this run.
    pub fn total(&self) -> usize {
        self.units.len()
    }

    /// Whether every unit has resolved.
    pub fn is_complete(&self) -> bool {
        self.state == RunState::AllResolved
    }

    /// The per-unit render requests, order-independent.
    pub fn requests(&self) -> Vec<RenderRequest> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| RenderRequest {
                unit: UnitId(i),
                subset: unit.subset.clone(),
                width: self.working.w * self.multiple_size,
                height: self.working.h * self.multiple_size,
            })
            .collect()
    }

    /// Resolve a unit with its rendered frame: crop to content, encode, and
    /// substitute the raster into the working document. A frame with no
    /// content resolves the unit without rewriting, leaving the layer vector.
    pub fn resolve_frame(
        &mut self,
        unit: UnitId,
        frame: &RgbaImage,
        encoder: &mut dyn RasterEncoder,
    ) -> StaticizeResult<Progress> {
        if self.already_resolved(unit)? {
            return Ok(self.late_progress(unit));
        }
        let rect = content_bounds(frame);
        if rect.is_empty() {
            tracing::debug!(unit = unit.0, "empty crop, layer left as vector");
        } else {
            let target = &self.units[unit.0];
            let image_ref = encoder.encode(&crop(frame, rect), &target.generated_asset_id())?;
            let scale = f64::from(self.multiple_size);
            let raster = RasterResult {
                width: f64::from(rect.width()) / scale,
                height: f64::from(rect.height()) / scale,
                image_ref,
            };
            substitute(&mut self.working, target, &raster, &self.parents)?;
        }
        Ok(self.mark_resolved(unit))
    }

    /// Resolve a unit that produced no renderable content at all.
    pub fn resolve_empty(&mut self, unit: UnitId) -> StaticizeResult<Progress> {
        if self.already_resolved(unit)? {
            return Ok(self.late_progress(unit));
        }
        tracing::debug!(unit = unit.0, "unit resolved empty");
        Ok(self.mark_resolved(unit))
    }

    /// Borrow the working document (for export on completion).
    pub fn document(&self) -> &AnimationDocument {
        &self.working
    }

    /// Consume the run, yielding the working document.
    pub fn into_document(self) -> AnimationDocument {
        self.working
    }

    fn already_resolved(&self, unit: UnitId) -> StaticizeResult<bool> {
        let resolved = self.resolved.get(unit.0).ok_or_else(|| {
            StaticizeError::document(format!("unknown unit id {}", unit.0))
        })?;
        Ok(*resolved)
    }

    fn late_progress(&self, unit: UnitId) -> Progress {
        tracing::warn!(unit = unit.0, "duplicate resolution signal ignored");
        Progress::Pending {
            resolved: self.resolved_count,
            total: self.total(),
        }
    }

    fn mark_resolved(&mut self, unit: UnitId) -> Progress {
        self.resolved[unit.0] = true;
        self.resolved_count += 1;
        if self.state == RunState::Dispatched && self.resolved_count == self.total() {
            self.state = RunState::AllResolved;
            tracing::debug!(total = self.total(), "all units resolved");
            Progress::Complete
        } else {
            Progress::Pending {
                resolved: self.resolved_count,
                total: self.total(),
            }
        }
    }
}

/// Synchronous driver: render every unit in request order, resolve each
/// result, export exactly once on completion, and return the rewritten
/// document.
///
/// A document with zero eligible units exports immediately, deep-equal to the
/// input.
#[tracing::instrument(skip_all, fields(filename = %options.filename))]
pub fn staticize(
    source: &AnimationDocument,
    options: &StaticizeOptions,
    renderer: &mut dyn LayerRenderer,
    encoder: &mut dyn RasterEncoder,
    exporter: &mut dyn DocumentExporter,
) -> StaticizeResult<AnimationDocument> {
    let mut run = StaticizeRun::begin(source, options);
    if run.is_complete() {
        tracing::debug!("no eligible units, exporting untouched clone");
        exporter.export(run.document(), &options.filename)?;
        return Ok(run.into_document());
    }
    for request in run.requests() {
        let frame = renderer.render(&request.subset, request.width, request.height)?;
        if run.resolve_frame(request.unit, &frame, encoder)? == Progress::Complete {
            exporter.export(run.document(), &options.filename)?;
        }
    }
    if !run.is_complete() {
        return Err(StaticizeError::document(
            "render loop finished with unresolved units",
        ));
    }
    Ok(run.into_document())
}

#[cfg(test)]
#[path = "../../tests/unit/orchestrate/run.rs"]
mod tests;
