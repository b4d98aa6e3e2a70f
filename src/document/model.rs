use serde_json::{Map, Value};

/// Typed view over a Lottie animation document.
///
/// Only the attributes the staticizer reads or rewrites are typed; everything
/// else is preserved verbatim in flattened pass-through maps so that a
/// parse → rewrite → serialize round trip never drops data the player needs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationDocument {
    /// Viewport width in document units.
    #[serde(default)]
    pub w: u32,
    /// Viewport height in document units.
    #[serde(default)]
    pub h: u32,
    /// Top-level layer list, in paint order.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Reusable assets referenced from layers via `refId`.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Untouched attributes (`v`, `fr`, `ip`, `op`, `nm`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnimationDocument {
    /// Look up an asset by `id`.
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Mutable lookup of an asset by `id`.
    pub fn asset_mut(&mut self, id: &str) -> Option<&mut Asset> {
        self.assets.iter_mut().find(|a| a.id == id)
    }
}

/// Look up a layer by `ind` within one layer list.
///
/// `ind` values are only unique within their own list scope; callers must pass
/// the list the reference came from (the document's top-level list or a single
/// asset's list), never a merged view.
pub fn find_layer(layers: &[Layer], ind: i64) -> Option<&Layer> {
    layers.iter().find(|l| l.ind == Some(ind))
}

/// Mutable counterpart to [`find_layer`].
pub fn find_layer_mut(layers: &mut [Layer], ind: i64) -> Option<&mut Layer> {
    layers.iter_mut().find(|l| l.ind == Some(ind))
}

/// Numeric layer type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerKind(pub i64);

impl LayerKind {
    /// Shape-container layer (`ty: 4`).
    pub const SHAPE: LayerKind = LayerKind(4);
    /// Raster image layer (`ty: 2`).
    pub const IMAGE: LayerKind = LayerKind(2);

    /// Whether this is a shape-container layer.
    pub fn is_shape(self) -> bool {
        self == Self::SHAPE
    }
}

/// One layer in a document or asset layer list.
///
/// `ref_id` is declared first on purpose: serde emits struct fields in
/// declaration order, and some mobile players parse layer attributes in
/// emission order, so a substituted raster reference must appear before the
/// other attributes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Asset reference, present on precomp/image layers.
    #[serde(rename = "refId", default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Layer index, unique within the containing list only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ind: Option<i64>,
    /// Layer type tag.
    pub ty: LayerKind,
    /// `ind` of the parenting layer in the same list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    /// Layer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<Value>,
    /// Keyframed transform block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ks: Option<Transform>,
    /// Shape items, present on shape-container layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<ShapeItem>>,
    /// Human-readable type annotation written by the rewriter.
    #[serde(rename = "tyName", default, skip_serializing_if = "Option::is_none")]
    pub ty_name: Option<String>,
    /// Untouched attributes (`ip`, `op`, `st`, `bm`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reusable asset: either a mini-document with its own layer list or a
/// raster image entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Asset {
    /// Asset identifier referenced via `refId`.
    pub id: String,
    /// Raster width; fractional when the source frame was supersampled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    /// Raster height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// Image directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u: Option<String>,
    /// Image file name or data reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    /// Embedded flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<i64>,
    /// The asset's own layer list, for precomp assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<Layer>>,
    /// Untouched attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asset {
    /// Build a generated raster asset entry. Never mutated after creation.
    pub fn raster(
        id: impl Into<String>,
        width: f64,
        height: f64,
        image_ref: impl Into<String>,
    ) -> Asset {
        Asset {
            id: id.into(),
            w: Some(width),
            h: Some(height),
            u: Some(String::new()),
            p: Some(image_ref.into()),
            e: Some(1),
            layers: None,
            extra: Map::new(),
        }
    }
}

/// An item inside a shape layer's `shapes` list (or a group's `it` list).
///
/// The property slots (`p`, `o`, `c`, `s`, `e`, `r`, `ks`) mean different
/// things per kind; only the kinds the classifier and algebra inspect matter
/// here, the rest rides along in `extra`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeItem {
    /// Shape item kind tag (`rc`, `el`, `sh`, `tr`, `st`, `fl`, `tm`, `rp`, `gr`).
    pub ty: String,
    /// Nested items for group containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it: Option<Vec<ShapeItem>>,
    /// Position (`rc`/`el`/`tr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<Property>,
    /// Opacity (`st`/`fl`/`tr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<Property>,
    /// Color (`st`/`fl`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<Property>,
    /// Scale (`tr`) or trim start (`tm`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<Property>,
    /// Trim end (`tm`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<Property>,
    /// Rotation (`tr`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Property>,
    /// Path vertex data (`sh`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ks: Option<Property>,
    /// Untouched attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keyframed transform block (`ks`) of a layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<Property>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Property>,
    /// Position, merged or split into x/y channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<PositionProperty>,
    /// Anchor point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Property>,
    /// Scale in percent per axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<Property>,
    /// Untouched attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A position slot: one merged channel, or independent x/y channels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PositionProperty {
    /// Split channels (`{s: true, x: {...}, y: {...}}`).
    Split(SplitPosition),
    /// Single merged channel (`{k: ...}`).
    Merged(Property),
}

/// Independent x/y position channels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SplitPosition {
    /// Horizontal channel.
    pub x: Property,
    /// Vertical channel.
    pub y: Property,
    /// Untouched attributes (`s`, `ix`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A keyframed property: the `k` payload plus pass-through attributes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Property {
    /// The property value.
    #[serde(rename = "k")]
    pub value: Keyframed,
    /// Untouched attributes (`a`, `ix`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    /// A property holding a static numeric vector.
    pub fn vector(values: Vec<f64>) -> Property {
        Property {
            value: Keyframed::Vector(values),
            extra: Map::new(),
        }
    }

    /// A property holding a static scalar.
    pub fn scalar(value: f64) -> Property {
        Property {
            value: Keyframed::Scalar(value),
            extra: Map::new(),
        }
    }
}

/// The value of a keyframed property.
///
/// `Free` carries structured non-numeric payloads (static or animated path
/// vertex data) that the position algebra never touches but the classifier
/// still inspects for multi-keyframe form.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Keyframed {
    /// A single static number.
    Scalar(f64),
    /// A static numeric array.
    Vector(Vec<f64>),
    /// Time-bounded keyframe segments.
    Segments(Vec<Segment>),
    /// Any other structured value.
    Free(Value),
}

impl Keyframed {
    /// Whether this value is in animated (segment) form at all.
    ///
    /// Even a single segment counts: the player interpolates it, so the value
    /// is not a plain constant. Position-change detection uses this.
    pub fn is_animated(&self) -> bool {
        match self {
            Keyframed::Segments(_) => true,
            Keyframed::Free(v) => v
                .as_array()
                .is_some_and(|items| items.iter().any(Value::is_object)),
            _ => false,
        }
    }

    /// Whether this value carries more than one keyframe entry.
    ///
    /// Shape-level change detection (`sh`/`st`/`tr`/`tm`) uses this: a
    /// one-entry list still collapses to a single representable value.
    pub fn is_multi_segment(&self) -> bool {
        match self {
            Keyframed::Segments(segs) => segs.len() > 1,
            Keyframed::Free(v) => v.as_array().is_some_and(|items| items.len() > 1),
            _ => false,
        }
    }

    /// The constant numeric vector, if this value is constant and numeric.
    pub fn as_vector(&self) -> Option<Vec<f64>> {
        match self {
            Keyframed::Scalar(v) => Some(vec![*v]),
            Keyframed::Vector(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// One time-bounded keyframe segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Start time in frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    /// Start value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<Vec<f64>>,
    /// End value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<Vec<f64>>,
    /// Untouched attributes (easing handles `i`/`o`, hold flag `h`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    /// A plain linear segment, used by tests and the split-channel merge.
    pub fn new(t: f64, s: Vec<f64>, e: Vec<f64>) -> Segment {
        Segment {
            t: Some(t),
            s: Some(s),
            e: Some(e),
            extra: Map::new(),
        }
    }
}
