//! Per-layer flattening eligibility.
//!
//! A pure predicate over one layer: no mutation, no side effects. A layer that
//! fails a check is simply left as vector content in the output; rejection is
//! the expected majority case, not an error.

use crate::algebra::position::{layer_position, shape_position};
use crate::document::model::{Keyframed, Layer, ShapeItem};

/// Whether `layer` is safe to flatten to a static raster.
///
/// Eligible layers are shape containers with no repeater, no shape-level
/// transform or color change, no multi-keyframe scale, and at most one of
/// {varying rotation, varying position}. Rotation-only or position-only motion
/// reduces to a single representative frame; combined motion does not, since a
/// flattened raster cannot re-derive the pivot/offset pairing across time.
pub fn should_flatten(layer: &Layer) -> bool {
    if !layer.ty.is_shape() {
        return false;
    }
    if has_repeater(layer) {
        tracing::debug!(ind = ?layer.ind, "skip: repeater multiplies geometry procedurally");
        return false;
    }
    if has_shape_or_color_change(layer) {
        tracing::debug!(ind = ?layer.ind, "skip: shape-level transform or color change");
        return false;
    }
    if has_scale_change(layer) {
        tracing::debug!(ind = ?layer.ind, "skip: multi-keyframe scale");
        return false;
    }
    if has_rotation_change(layer) && has_position_change(layer) {
        tracing::debug!(ind = ?layer.ind, "skip: combined rotation and position motion");
        return false;
    }
    true
}

/// Whether any child shape item is a repeater.
pub fn has_repeater(layer: &Layer) -> bool {
    shapes(layer).iter().any(|shape| shape.ty == "rp")
}

/// Whether the layer's rotation channel is time-varying.
pub fn has_rotation_change(layer: &Layer) -> bool {
    layer
        .ks
        .as_ref()
        .and_then(|ks| ks.r.as_ref())
        .is_some_and(|r| r.value.is_animated())
}

/// Whether the layer's position is time-varying, considering both the layer's
/// own channel(s) and the first child shape's position.
///
/// A position that cannot be read or merged at all (structured values,
/// mismatched split channels) counts as changing: the fail-closed policy keeps
/// such layers out of the eligible set rather than risking a wrong placement.
pub fn has_position_change(layer: &Layer) -> bool {
    let from_layer = match &layer.ks {
        Some(ks) => match layer_position(ks) {
            Ok(pos) => pos.is_some_and(|p| p.is_varying()),
            Err(err) => {
                tracing::warn!(ind = ?layer.ind, %err, "unreadable layer position, treating as varying");
                return true;
            }
        },
        None => false,
    };
    let from_shape = match shapes(layer).first() {
        Some(shape) => match shape_position(shape) {
            Ok(pos) => pos.is_some_and(|p| p.is_varying()),
            Err(err) => {
                tracing::warn!(ind = ?layer.ind, %err, "unreadable shape position, treating as varying");
                return true;
            }
        },
        None => false,
    };
    from_layer || from_shape
}

/// Whether the layer transform's scale carries multi-keyframe variation.
pub fn has_scale_change(layer: &Layer) -> bool {
    layer
        .ks
        .as_ref()
        .and_then(|ks| ks.s.as_ref())
        .is_some_and(|s| s.value.is_multi_segment())
}

/// Whether any child shape exhibits a transform or color change that cannot
/// survive flattening.
fn has_shape_or_color_change(layer: &Layer) -> bool {
    shapes(layer).iter().any(shape_varies)
}

fn shapes(layer: &Layer) -> &[ShapeItem] {
    layer.shapes.as_deref().unwrap_or_default()
}

fn shape_varies(shape: &ShapeItem) -> bool {
    if let Some(items) = &shape.it {
        items.iter().any(|item| item_varies(item, items.len()))
    } else if shape.ty == "tm" {
        trim_varies(shape)
    } else {
        false
    }
}

fn item_varies(item: &ShapeItem, sibling_count: usize) -> bool {
    match item.ty.as_str() {
        "sh" => item
            .ks
            .as_ref()
            .is_some_and(|ks| ks.value.is_multi_segment()),
        "st" => item.o.as_ref().is_some_and(|o| o.value.is_multi_segment()),
        // A transform alone in its group only re-expresses the group's own
        // frame; it matters once it composes with sibling geometry.
        "tr" if sibling_count > 1 => transform_item_varies(item),
        "tm" => trim_varies(item),
        // Fill color variance is tolerated: the representative frame carries
        // whichever color the frozen keyframes produce.
        _ => false,
    }
}

fn transform_item_varies(item: &ShapeItem) -> bool {
    let scale_varies = item
        .s
        .as_ref()
        .is_some_and(|s| matches!(&s.value, Keyframed::Segments(segs) if segs.len() > 1));
    let rotation_varies = item.r.as_ref().is_some_and(|r| r.value.is_multi_segment());
    scale_varies || rotation_varies
}

fn trim_varies(item: &ShapeItem) -> bool {
    let start = item.s.as_ref().is_some_and(|s| s.value.is_multi_segment());
    let end = item.e.as_ref().is_some_and(|e| e.value.is_multi_segment());
    start || end
}

#[cfg(test)]
#[path = "../../tests/unit/classify/eligibility.rs"]
mod tests;
