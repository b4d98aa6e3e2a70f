//! Pure position algebra over keyframed properties.
//!
//! Lottie splits placement across several sources: a layer transform may hold
//! one merged position channel or two independent x/y channels, and a shape
//! group may carry its own position on top of that. The routines here merge
//! those sources into a single channel without attempting any interpolation:
//! whenever two independently time-varying sources meet, the merge fails
//! closed instead of guessing, since a wrong merge corrupts placement
//! irreversibly.

use crate::document::model::{
    Keyframed, Layer, Property, Segment, ShapeItem, SplitPosition, Transform,
};
use crate::foundation::error::{StaticizeError, StaticizeResult};

/// Shape item kinds whose immediate children may carry position data.
const POSITION_BEARING: [&str; 4] = ["rc", "tr", "el", "sh"];

/// A merged position channel: one constant vector, or timed segments.
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// Constant `[x, y, ...]` vector.
    Constant(Vec<f64>),
    /// Time-bounded segments.
    Varying(Vec<Segment>),
}

impl Position {
    /// Whether this channel changes over time.
    pub fn is_varying(&self) -> bool {
        matches!(self, Position::Varying(_))
    }

    /// Convert back into a keyframed property value.
    pub fn into_keyframed(self) -> Keyframed {
        match self {
            Position::Constant(v) => Keyframed::Vector(v),
            Position::Varying(segs) => Keyframed::Segments(segs),
        }
    }

    fn from_keyframed(value: &Keyframed) -> StaticizeResult<Position> {
        match value {
            Keyframed::Scalar(v) => Ok(Position::Constant(vec![*v])),
            Keyframed::Vector(v) => Ok(Position::Constant(v.clone())),
            Keyframed::Segments(segs) => Ok(Position::Varying(segs.clone())),
            Keyframed::Free(_) => Err(StaticizeError::position(
                "position value has unsupported structured form",
            )),
        }
    }
}

/// The representative value of a constant property.
///
/// Multi-segment values are not collapsed here; callers decide what "frozen"
/// means per property kind.
pub fn representative_value(prop: &Property) -> Option<Vec<f64>> {
    prop.value.as_vector()
}

/// Read a layer transform's position as one merged channel.
///
/// Split x/y channels are combined according to which of the two varies; two
/// varying channels are zipped segment-by-segment and must have the same
/// length (no cross-rate interpolation is attempted).
pub fn layer_position(transform: &Transform) -> StaticizeResult<Option<Position>> {
    let Some(p) = &transform.p else {
        return Ok(None);
    };
    match p {
        crate::document::model::PositionProperty::Merged(prop) => {
            Position::from_keyframed(&prop.value).map(Some)
        }
        crate::document::model::PositionProperty::Split(split) => merge_split(split).map(Some),
    }
}

enum Axis<'a> {
    Constant(f64),
    Varying(&'a [Segment]),
}

fn axis<'a>(value: &'a Keyframed, name: &str) -> StaticizeResult<Axis<'a>> {
    match value {
        Keyframed::Scalar(v) => Ok(Axis::Constant(*v)),
        Keyframed::Vector(v) => v.first().copied().map(Axis::Constant).ok_or_else(|| {
            StaticizeError::position(format!("split {name} channel is an empty vector"))
        }),
        Keyframed::Segments(segs) => Ok(Axis::Varying(segs)),
        Keyframed::Free(_) => Err(StaticizeError::position(format!(
            "split {name} channel has unsupported structured form"
        ))),
    }
}

fn first_coord(end: &Option<Vec<f64>>) -> Option<f64> {
    end.as_ref().and_then(|v| v.first()).copied()
}

fn merge_split(split: &SplitPosition) -> StaticizeResult<Position> {
    let x = axis(&split.x.value, "x")?;
    let y = axis(&split.y.value, "y")?;
    match (x, y) {
        (Axis::Constant(x), Axis::Constant(y)) => Ok(Position::Constant(vec![x, y])),
        (Axis::Constant(x), Axis::Varying(segs)) => {
            Ok(Position::Varying(inject_constant(segs, x, 0)))
        }
        (Axis::Varying(segs), Axis::Constant(y)) => {
            Ok(Position::Varying(inject_constant(segs, y, 1)))
        }
        (Axis::Varying(xs), Axis::Varying(ys)) => {
            if xs.len() != ys.len() {
                return Err(StaticizeError::position(format!(
                    "split channels have mismatched segment counts ({} vs {})",
                    xs.len(),
                    ys.len()
                )));
            }
            let segs = xs
                .iter()
                .zip(ys)
                .map(|(sx, sy)| Segment {
                    t: sx.t,
                    s: match (first_coord(&sx.s), first_coord(&sy.s)) {
                        (Some(x), Some(y)) => Some(vec![x, y]),
                        _ => None,
                    },
                    e: match (first_coord(&sx.e), first_coord(&sy.e)) {
                        (Some(x), Some(y)) => Some(vec![x, y]),
                        _ => None,
                    },
                    extra: sx.extra.clone(),
                })
                .collect();
            Ok(Position::Varying(segs))
        }
    }
}

/// Build a two-coordinate segment list from one varying scalar channel,
/// injecting the other axis' constant at `constant_idx`.
fn inject_constant(segs: &[Segment], constant: f64, constant_idx: usize) -> Vec<Segment> {
    let pair = |coord: f64| {
        if constant_idx == 0 {
            vec![constant, coord]
        } else {
            vec![coord, constant]
        }
    };
    segs.iter()
        .map(|seg| Segment {
            t: seg.t,
            s: first_coord(&seg.s).map(pair),
            e: first_coord(&seg.e).map(pair),
            extra: seg.extra.clone(),
        })
        .collect()
}

/// Read the position carried by a shape's immediate child items.
///
/// Scans children restricted to the position-bearing kinds and returns none,
/// the single source found, or the sum of exactly two sources (a group whose
/// transform and nested primitive both place geometry).
pub fn shape_position(shape: &ShapeItem) -> StaticizeResult<Option<Position>> {
    let Some(items) = &shape.it else {
        return Ok(None);
    };
    let sources: Vec<&Property> = items
        .iter()
        .filter(|item| POSITION_BEARING.contains(&item.ty.as_str()))
        .filter_map(|item| item.p.as_ref())
        .collect();
    match sources.as_slice() {
        [one] => Position::from_keyframed(&one.value).map(Some),
        [a, b] => {
            let a = Position::from_keyframed(&a.value)?;
            let b = Position::from_keyframed(&b.value)?;
            combine_position(&a, &b).map(Some)
        }
        _ => Ok(None),
    }
}

/// Add two position sources together, vector-style.
///
/// At most one source may vary over time; two varying sources have no defined
/// merge rule and fail closed. Commutative for constant inputs.
pub fn combine_position(a: &Position, b: &Position) -> StaticizeResult<Position> {
    match (a, b) {
        (Position::Constant(a), Position::Constant(b)) => {
            Ok(Position::Constant(add_vectors(a, b)))
        }
        (Position::Constant(c), Position::Varying(segs))
        | (Position::Varying(segs), Position::Constant(c)) => {
            let segs = segs
                .iter()
                .map(|seg| Segment {
                    t: seg.t,
                    s: seg.s.as_ref().map(|v| add_vectors(v, c)),
                    e: seg.e.as_ref().map(|v| add_vectors(v, c)),
                    extra: seg.extra.clone(),
                })
                .collect();
            Ok(Position::Varying(segs))
        }
        (Position::Varying(_), Position::Varying(_)) => Err(StaticizeError::position(
            "cannot combine two time-varying position sources",
        )),
    }
}

fn add_vectors(a: &[f64], b: &[f64]) -> Vec<f64> {
    (0..a.len().max(b.len()))
        .map(|i| a.get(i).copied().unwrap_or(0.0) + b.get(i).copied().unwrap_or(0.0))
        .collect()
}

/// Merge a layer's own position with its first shape's position.
///
/// This is the placement substituted into a flattened layer: the raster sits
/// where the vector geometry used to, so both contributions must be summed.
pub fn final_position(layer: &Layer) -> StaticizeResult<Option<Position>> {
    let from_layer = match &layer.ks {
        Some(ks) => layer_position(ks)?,
        None => None,
    };
    let from_shape = match layer.shapes.as_ref().and_then(|shapes| shapes.first()) {
        Some(shape) => shape_position(shape)?,
        None => None,
    };
    match (from_layer, from_shape) {
        (Some(a), Some(b)) => combine_position(&a, &b).map(Some),
        (Some(a), None) => Ok(Some(a)),
        (None, b) => Ok(b),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/algebra/position.rs"]
mod tests;
