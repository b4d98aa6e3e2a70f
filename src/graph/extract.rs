//! Eligible-unit discovery over the layer/asset dependency graph.
//!
//! Flattening is only attempted at two granularities: top-level layers that
//! pass the classifier directly, and layers inside *leaf* assets, those that
//! reference no further assets. A non-leaf asset is itself a composition of
//! other assets and is left alone; its content gets flattened at the leaf
//! level instead.

use std::collections::{BTreeSet, HashSet};

use crate::classify::eligibility::should_flatten;
use crate::document::model::{AnimationDocument, Asset, Layer, find_layer};

/// The layer list a unit's target lives in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitOwner {
    /// The document's top-level layer list.
    Document,
    /// The layer list of the asset with this id.
    Asset(String),
}

/// One flattening candidate: a target layer, its optional captured parent,
/// and the owned single-unit document handed to the external renderer.
#[derive(Clone, Debug)]
pub struct EligibleUnit {
    /// Which layer list the target lives in.
    pub owner: UnitOwner,
    /// `ind` of the target layer within the owning list.
    pub target_ind: i64,
    /// `ind` of the captured parent, when the target has a resolvable one.
    pub parent_ind: Option<i64>,
    /// Render subset: document viewport and pass-through attributes, the
    /// target layer plus pruned parent, and an empty asset table.
    pub subset: AnimationDocument,
}

impl EligibleUnit {
    /// Owner key used in generated asset ids: the asset id, or the target
    /// layer's `ind` for document-level units.
    pub fn key(&self) -> String {
        match &self.owner {
            UnitOwner::Asset(id) => id.clone(),
            UnitOwner::Document => self.target_ind.to_string(),
        }
    }

    /// Deterministic id of the raster asset this unit produces.
    ///
    /// The per-owner sequence component (`target_ind`) keeps ids unique when
    /// several layers of the same asset are flattened.
    pub fn generated_asset_id(&self) -> String {
        format!("image_{}_{}", self.key(), self.target_ind)
    }
}

/// Result of unit extraction.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Flattening candidates, asset-derived units first.
    pub units: Vec<EligibleUnit>,
    /// `(owner, ind)` of every captured parent layer. The rewriter consults
    /// this: a layer that is someone's parent keeps its position and anchor
    /// even when substituted itself.
    pub parents: HashSet<(UnitOwner, i64)>,
}

/// Extract every eligible unit from `doc`: leaf-asset layers first, then
/// qualifying top-level layers.
#[tracing::instrument(skip(doc))]
pub fn extract_units(doc: &AnimationDocument) -> Extraction {
    let mut out = Extraction::default();
    for asset in base_assets(doc) {
        if let Some(layers) = &asset.layers {
            push_units(doc, layers, UnitOwner::Asset(asset.id.clone()), &mut out);
        }
    }
    push_units(doc, &doc.layers, UnitOwner::Document, &mut out);
    tracing::debug!(units = out.units.len(), "extraction finished");
    out
}

fn push_units(
    doc: &AnimationDocument,
    layers: &[Layer],
    owner: UnitOwner,
    out: &mut Extraction,
) {
    for layer in layers.iter().filter(|layer| should_flatten(layer)) {
        let Some(target_ind) = layer.ind else {
            // A layer without an index cannot be addressed for substitution.
            continue;
        };
        // An unresolvable parent reference is treated as "no parent", not an
        // error.
        let parent = layer.parent.and_then(|ind| find_layer(layers, ind));
        let parent_ind = parent.and_then(|p| p.ind);
        if let Some(ind) = parent_ind {
            out.parents.insert((owner.clone(), ind));
        }
        out.units.push(EligibleUnit {
            owner: owner.clone(),
            target_ind,
            parent_ind,
            subset: unit_subset(doc, layer, parent.map(prune_to_transform_items)),
        });
    }
}

/// Build the single-unit document the renderer receives.
fn unit_subset(
    doc: &AnimationDocument,
    target: &Layer,
    parent: Option<Layer>,
) -> AnimationDocument {
    let mut layers = vec![target.clone()];
    layers.extend(parent);
    AnimationDocument {
        w: doc.w,
        h: doc.h,
        layers,
        assets: Vec::new(),
        extra: doc.extra.clone(),
    }
}

/// Clone a captured parent with its shape children pruned to `tr`-kind items:
/// only the parent's aggregate transform, not its own geometry, composes into
/// the child's frame.
fn prune_to_transform_items(layer: &Layer) -> Layer {
    let mut pruned = layer.clone();
    if pruned.ty.is_shape() {
        if let Some(shapes) = &mut pruned.shapes {
            for shape in shapes {
                if let Some(items) = &mut shape.it {
                    items.retain(|item| item.ty == "tr");
                }
            }
        }
    }
    pruned
}

/// Collect the `refId`s referenced by a layer list.
pub fn collect_layer_ref_ids(layers: &[Layer], out: &mut BTreeSet<String>) {
    for layer in layers {
        if let Some(ref_id) = &layer.ref_id {
            out.insert(ref_id.clone());
        }
    }
}

/// The leaf assets of `doc`: reachable from some layer's `refId` and
/// referencing no further assets themselves.
pub fn base_assets(doc: &AnimationDocument) -> Vec<&Asset> {
    let mut direct = BTreeSet::new();
    collect_layer_ref_ids(&doc.layers, &mut direct);

    let mut leaves = BTreeSet::new();
    let mut visited = BTreeSet::new();
    for id in &direct {
        collect_leaf_ids(&doc.assets, id, &mut visited, &mut leaves);
    }
    doc.assets
        .iter()
        .filter(|asset| leaves.contains(&asset.id))
        .collect()
}

/// Depth-first walk over the asset-reference graph.
///
/// The visited set guarantees termination on malformed cyclic input; a cycle
/// simply contributes no leaves.
fn collect_leaf_ids(
    assets: &[Asset],
    id: &str,
    visited: &mut BTreeSet<String>,
    leaves: &mut BTreeSet<String>,
) {
    if !visited.insert(id.to_string()) {
        return;
    }
    let Some(asset) = assets.iter().find(|a| a.id == id) else {
        return;
    };
    let mut refs = BTreeSet::new();
    collect_layer_ref_ids(asset.layers.as_deref().unwrap_or_default(), &mut refs);
    if refs.is_empty() {
        leaves.insert(id.to_string());
    } else {
        for child in &refs {
            collect_leaf_ids(assets, child, visited, leaves);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/extract.rs"]
mod tests;
