//! Substituting a rendered raster for a flattened unit's layer.
//!
//! Substitution is arena-style: the target layer is addressed by its
//! `(list, ind)` coordinates, a fresh record is built, and the slot is
//! replaced wholesale. Shared sub-structures are never mutated in place, so a
//! logical layer appearing in several representations can never alias.

use std::collections::HashSet;

use crate::algebra::position::final_position;
use crate::document::model::{
    AnimationDocument, Asset, Layer, LayerKind, PositionProperty, Property,
};
use crate::foundation::error::{StaticizeError, StaticizeResult};
use crate::graph::extract::{EligibleUnit, UnitOwner};

/// A rendered-and-cropped raster ready for substitution.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterResult {
    /// Width in document units (crop width over the supersample factor).
    pub width: f64,
    /// Height in document units.
    pub height: f64,
    /// Opaque image reference stored in the generated asset's `p` field.
    pub image_ref: String,
}

/// Replace `unit`'s target layer in `doc` with a reference to a new raster
/// asset built from `raster`.
///
/// Appends the generated asset, then rewrites the target layer in its owning
/// list: the shape payload is removed, position is recomputed from the merged
/// layer+shape channels, and the anchor is centered on the raster. A layer
/// captured as someone else's parent keeps its placement and only changes
/// type. The raster reference lands in the layer's first serialized field.
#[tracing::instrument(skip(doc, unit, raster, parents), fields(asset_id = tracing::field::Empty))]
pub fn substitute(
    doc: &mut AnimationDocument,
    unit: &EligibleUnit,
    raster: &RasterResult,
    parents: &HashSet<(UnitOwner, i64)>,
) -> StaticizeResult<()> {
    let asset_id = unit.generated_asset_id();
    tracing::Span::current().record("asset_id", asset_id.as_str());

    // Resolve the owning asset before appending, so a pathological id
    // collision with the generated asset cannot redirect the lookup.
    let owner_asset_idx = match &unit.owner {
        UnitOwner::Asset(id) => Some(
            doc.assets
                .iter()
                .position(|a| a.id == *id)
                .ok_or_else(|| {
                    StaticizeError::document(format!("owning asset '{id}' not found"))
                })?,
        ),
        UnitOwner::Document => None,
    };

    doc.assets.push(Asset::raster(
        &asset_id,
        raster.width,
        raster.height,
        &raster.image_ref,
    ));

    let is_parent = parents.contains(&(unit.owner.clone(), unit.target_ind));
    let layers = match owner_asset_idx {
        Some(idx) => doc.assets[idx].layers.as_mut().ok_or_else(|| {
            StaticizeError::document(format!("owning asset '{}' has no layers", unit.key()))
        })?,
        None => &mut doc.layers,
    };
    let slot = layers
        .iter()
        .position(|l| l.ind == Some(unit.target_ind))
        .ok_or_else(|| {
            StaticizeError::document(format!(
                "target layer ind {} not found in owning list",
                unit.target_ind
            ))
        })?;
    let replacement = rewritten_layer(&layers[slot], &asset_id, raster, is_parent)?;
    layers[slot] = replacement;
    Ok(())
}

fn rewritten_layer(
    old: &Layer,
    asset_id: &str,
    raster: &RasterResult,
    is_parent: bool,
) -> StaticizeResult<Layer> {
    let mut layer = old.clone();
    if !is_parent {
        // Read the merged placement from the original layer before any field
        // is replaced.
        let position = final_position(old)?;
        if let Some(ks) = &mut layer.ks {
            if let Some(position) = position {
                ks.p = Some(PositionProperty::Merged(Property {
                    value: position.into_keyframed(),
                    extra: serde_json::Map::new(),
                }));
            }
            ks.a = Some(Property::vector(vec![
                raster.width / 2.0,
                raster.height / 2.0,
                0.0,
            ]));
        }
    }
    layer.ty = LayerKind::IMAGE;
    layer.ty_name = Some(format!("image {asset_id}"));
    layer.shapes = None;
    layer.ref_id = Some(asset_id.to_string());
    Ok(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/rewrite/substitute.rs"]
mod tests;
