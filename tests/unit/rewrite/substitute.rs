use super::*;
use crate::document::model::{Keyframed, find_layer};
use crate::graph::extract::extract_units;
use serde_json::json;

fn doc(value: serde_json::Value) -> AnimationDocument {
    serde_json::from_value(value).unwrap()
}

fn simple_doc() -> AnimationDocument {
    doc(json!({
        "w": 100, "h": 100,
        "layers": [{
            "ind": 1,
            "ty": 4,
            "ks": {
                "p": {"a": 0, "k": [50.0, 60.0, 0.0]},
                "a": {"a": 0, "k": [0.0, 0.0, 0.0]}
            },
            "shapes": [{
                "ty": "gr",
                "it": [{"ty": "rc", "p": {"k": [5.0, -10.0]}}]
            }],
            "ip": 0, "op": 60
        }],
        "assets": []
    }))
}

fn raster_40x40() -> RasterResult {
    RasterResult {
        width: 40.0,
        height: 40.0,
        image_ref: "image_1_1.png".to_string(),
    }
}

#[test]
fn substitution_rewrites_layer_and_appends_asset() {
    let mut d = simple_doc();
    let extraction = extract_units(&d);
    let unit = &extraction.units[0];
    substitute(&mut d, unit, &raster_40x40(), &extraction.parents).unwrap();

    // The generated asset is appended, never mutated afterwards.
    assert_eq!(d.assets.len(), 1);
    let asset = &d.assets[0];
    assert_eq!(asset.id, "image_1_1");
    assert_eq!(asset.w, Some(40.0));
    assert_eq!(asset.h, Some(40.0));
    assert_eq!(asset.p.as_deref(), Some("image_1_1.png"));
    assert_eq!(asset.e, Some(1));

    let layer = find_layer(&d.layers, 1).unwrap();
    assert_eq!(layer.ty, LayerKind::IMAGE);
    assert_eq!(layer.ref_id.as_deref(), Some("image_1_1"));
    assert_eq!(layer.ty_name.as_deref(), Some("image image_1_1"));
    assert!(layer.shapes.is_none());
    // Other attributes ride along untouched.
    assert_eq!(layer.extra["op"], json!(60));

    // Position is the merged layer+shape placement, anchor the raster center.
    let ks = layer.ks.as_ref().unwrap();
    let Some(PositionProperty::Merged(p)) = &ks.p else {
        panic!("expected merged position");
    };
    assert_eq!(p.value, Keyframed::Vector(vec![55.0, 50.0, 0.0]));
    assert_eq!(
        ks.a.as_ref().unwrap().value,
        Keyframed::Vector(vec![20.0, 20.0, 0.0])
    );
}

#[test]
fn raster_reference_serializes_first() {
    let mut d = simple_doc();
    let extraction = extract_units(&d);
    substitute(&mut d, &extraction.units[0], &raster_40x40(), &extraction.parents).unwrap();
    let serialized = serde_json::to_string(&d.layers[0]).unwrap();
    assert!(
        serialized.starts_with("{\"refId\":"),
        "refId must be the first emitted attribute, got: {serialized}"
    );
}

#[test]
fn captured_parents_keep_position_and_anchor() {
    let mut d = doc(json!({
        "w": 100, "h": 100,
        "layers": [
            {
                "ind": 1, "ty": 4,
                "ks": {"p": {"k": [30.0, 30.0]}, "a": {"k": [7.0, 7.0, 0.0]}},
                "shapes": [{"ty": "gr", "it": [{"ty": "rc", "p": {"k": [0.0, 0.0]}}]}]
            },
            {
                "ind": 2, "ty": 4, "parent": 1,
                "ks": {"p": {"k": [0.0, 0.0]}},
                "shapes": [{"ty": "gr", "it": [{"ty": "rc", "p": {"k": [0.0, 0.0]}}]}]
            }
        ],
        "assets": []
    }));
    let extraction = extract_units(&d);
    let parent_unit = extraction
        .units
        .iter()
        .find(|u| u.target_ind == 1)
        .unwrap();
    substitute(&mut d, parent_unit, &raster_40x40(), &extraction.parents).unwrap();

    let layer = find_layer(&d.layers, 1).unwrap();
    // Type and payload change, placement does not.
    assert_eq!(layer.ty, LayerKind::IMAGE);
    assert!(layer.shapes.is_none());
    let ks = layer.ks.as_ref().unwrap();
    let Some(PositionProperty::Merged(p)) = &ks.p else {
        panic!("expected original merged position");
    };
    assert_eq!(p.value, Keyframed::Vector(vec![30.0, 30.0]));
    assert_eq!(
        ks.a.as_ref().unwrap().value,
        Keyframed::Vector(vec![7.0, 7.0, 0.0])
    );
}

#[test]
fn asset_units_rewrite_inside_the_asset_layer_list() {
    let mut d = doc(json!({
        "w": 100, "h": 100,
        "layers": [{"ind": 1, "ty": 0, "refId": "A"}],
        "assets": [{"id": "A", "layers": [{
            "ind": 3,
            "ty": 4,
            "ks": {"p": {"k": [10.0, 10.0]}},
            "shapes": [{"ty": "gr", "it": [{"ty": "el", "p": {"k": [2.0, 2.0]}}]}]
        }]}]
    }));
    let extraction = extract_units(&d);
    let unit = &extraction.units[0];
    assert_eq!(unit.owner, UnitOwner::Asset("A".to_string()));
    let raster = RasterResult {
        width: 20.0,
        height: 10.0,
        image_ref: "image_A_3.png".to_string(),
    };
    substitute(&mut d, unit, &raster, &extraction.parents).unwrap();

    // Top-level precomp layer untouched; asset layer substituted.
    assert_eq!(d.layers[0].ty, LayerKind(0));
    let asset_layers = d.asset("A").unwrap().layers.as_deref().unwrap();
    let layer = find_layer(asset_layers, 3).unwrap();
    assert_eq!(layer.ty, LayerKind::IMAGE);
    assert_eq!(layer.ref_id.as_deref(), Some("image_A_3"));
    let ks = layer.ks.as_ref().unwrap();
    let Some(PositionProperty::Merged(p)) = &ks.p else {
        panic!("expected merged position");
    };
    assert_eq!(p.value, Keyframed::Vector(vec![12.0, 12.0]));
    assert_eq!(
        ks.a.as_ref().unwrap().value,
        Keyframed::Vector(vec![10.0, 5.0, 0.0])
    );
    assert!(d.asset("image_A_3").is_some());
}

#[test]
fn missing_target_layer_is_an_error() {
    let mut d = simple_doc();
    let extraction = extract_units(&d);
    let mut unit = extraction.units[0].clone();
    unit.target_ind = 42;
    let err = substitute(&mut d, &unit, &raster_40x40(), &extraction.parents).unwrap_err();
    assert!(matches!(err, StaticizeError::Document(_)));
}
