//! Freezing an eligible unit to its representative frame.
//!
//! Before a unit is handed to the renderer, its transform keyframes are forced
//! to a canonical resting pose: full opacity, zero rotation, uniform 100%
//! scale. Variance in those channels was either excluded by the classifier or
//! is irrelevant to the flattened frame's geometry; the working document's
//! own layer keeps its original channels, so the player re-applies them to the
//! substituted raster at runtime.
//!
//! Position and anchor are left untouched: their constant value is the
//! representative value used for composition.

use crate::document::model::{Keyframed, Segment, Transform};
use crate::graph::extract::EligibleUnit;

const FULL_OPACITY: f64 = 100.0;
const UNIFORM_SCALE: [f64; 3] = [100.0, 100.0, 100.0];

/// Freeze every layer in the unit's render subset.
pub fn freeze_unit(unit: &mut EligibleUnit) {
    for layer in &mut unit.subset.layers {
        if let Some(ks) = &mut layer.ks {
            freeze_transform(ks);
        }
    }
}

/// Force a transform block's opacity, rotation, and scale to neutral values.
pub fn freeze_transform(ks: &mut Transform) {
    if let Some(o) = &mut ks.o {
        if let Keyframed::Segments(segs) = &mut o.value {
            for seg in segs {
                pin(seg, &[FULL_OPACITY]);
            }
        }
    }
    if let Some(r) = &mut ks.r {
        match &mut r.value {
            Keyframed::Segments(segs) => {
                for seg in segs {
                    pin(seg, &[0.0]);
                }
            }
            Keyframed::Scalar(v) => *v = 0.0,
            _ => {}
        }
    }
    if let Some(s) = &mut ks.s {
        if let Keyframed::Segments(segs) = &mut s.value {
            for seg in segs {
                pin(seg, &UNIFORM_SCALE);
            }
        }
    }
}

/// Force a segment's start and end to the same value, keeping its timing and
/// easing attributes.
fn pin(seg: &mut Segment, value: &[f64]) {
    seg.s = Some(value.to_vec());
    seg.e = Some(value.to_vec());
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/freeze.rs"]
mod tests;
