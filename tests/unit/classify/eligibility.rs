use super::*;
use serde_json::json;

fn layer(value: serde_json::Value) -> Layer {
    serde_json::from_value(value).unwrap()
}

fn static_shape_layer() -> serde_json::Value {
    json!({
        "ind": 1,
        "ty": 4,
        "ks": {
            "o": {"a": 0, "k": 100},
            "r": {"a": 0, "k": 0},
            "p": {"a": 0, "k": [100.0, 100.0, 0.0]},
            "a": {"a": 0, "k": [0.0, 0.0, 0.0]},
            "s": {"a": 0, "k": [100.0, 100.0, 100.0]}
        },
        "shapes": [{
            "ty": "gr",
            "it": [
                {"ty": "rc", "p": {"k": [0.0, 0.0]}, "s": {"k": [40.0, 40.0]}},
                {"ty": "fl", "c": {"k": [1.0, 0.0, 0.0, 1.0]}}
            ]
        }]
    })
}

const VARYING_POSITION: &str = r#"[
    {"t": 0, "s": [0.0, 0.0], "e": [50.0, 0.0]},
    {"t": 30, "s": [50.0, 0.0], "e": [100.0, 0.0]}
]"#;

fn varying_rotation() -> serde_json::Value {
    json!([{"t": 0, "s": [0.0], "e": [90.0]}, {"t": 30}])
}

#[test]
fn static_shape_layer_is_eligible() {
    assert!(should_flatten(&layer(static_shape_layer())));
}

#[test]
fn non_shape_layers_are_ineligible() {
    let mut v = static_shape_layer();
    v["ty"] = json!(2);
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn repeater_disqualifies() {
    let mut v = static_shape_layer();
    v["shapes"].as_array_mut().unwrap().push(json!({"ty": "rp"}));
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn rotation_only_motion_is_eligible() {
    let mut v = static_shape_layer();
    v["ks"]["r"] = json!({"a": 1, "k": varying_rotation()});
    let l = layer(v);
    assert!(has_rotation_change(&l));
    assert!(!has_position_change(&l));
    assert!(should_flatten(&l));
}

#[test]
fn position_only_motion_is_eligible() {
    let mut v = static_shape_layer();
    v["ks"]["p"] = json!({"a": 1, "k": serde_json::from_str::<serde_json::Value>(VARYING_POSITION).unwrap()});
    let l = layer(v);
    assert!(!has_rotation_change(&l));
    assert!(has_position_change(&l));
    assert!(should_flatten(&l));
}

#[test]
fn combined_rotation_and_position_motion_is_rejected() {
    let mut v = static_shape_layer();
    v["ks"]["r"] = json!({"a": 1, "k": varying_rotation()});
    v["ks"]["p"] = json!({"a": 1, "k": serde_json::from_str::<serde_json::Value>(VARYING_POSITION).unwrap()});
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn shape_level_position_motion_counts_as_position_change() {
    let mut v = static_shape_layer();
    v["shapes"][0]["it"][0]["p"] = json!({"a": 1, "k": [
        {"t": 0, "s": [0.0, 0.0], "e": [5.0, 5.0]}
    ]});
    v["ks"]["r"] = json!({"a": 1, "k": varying_rotation()});
    let l = layer(v);
    assert!(has_position_change(&l));
    assert!(!should_flatten(&l));
}

#[test]
fn multi_keyframe_scale_disqualifies() {
    let mut v = static_shape_layer();
    v["ks"]["s"] = json!({"a": 1, "k": [
        {"t": 0, "s": [100.0, 100.0, 100.0], "e": [200.0, 200.0, 100.0]},
        {"t": 30, "s": [200.0, 200.0, 100.0], "e": [100.0, 100.0, 100.0]}
    ]});
    let l = layer(v);
    assert!(has_scale_change(&l));
    assert!(!should_flatten(&l));
}

#[test]
fn animated_path_data_disqualifies() {
    let mut v = static_shape_layer();
    v["shapes"][0]["it"]
        .as_array_mut()
        .unwrap()
        .push(json!({"ty": "sh", "ks": {"k": [
            {"t": 0, "s": [{"v": [[0, 0]]}], "e": [{"v": [[9, 9]]}]},
            {"t": 30}
        ]}}));
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn varying_stroke_opacity_disqualifies() {
    let mut v = static_shape_layer();
    v["shapes"][0]["it"]
        .as_array_mut()
        .unwrap()
        .push(json!({"ty": "st", "o": {"k": [
            {"t": 0, "s": [100.0], "e": [0.0]},
            {"t": 30}
        ]}}));
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn varying_fill_color_is_tolerated() {
    let mut v = static_shape_layer();
    v["shapes"][0]["it"][1]["c"] = json!({"a": 1, "k": [
        {"t": 0, "s": [1.0, 0.0, 0.0, 1.0], "e": [0.0, 1.0, 0.0, 1.0]},
        {"t": 30}
    ]});
    assert!(should_flatten(&layer(v)));
}

#[test]
fn varying_trim_path_disqualifies() {
    let mut v = static_shape_layer();
    v["shapes"]
        .as_array_mut()
        .unwrap()
        .push(json!({"ty": "tm", "s": {"k": [
            {"t": 0, "s": [0.0], "e": [100.0]},
            {"t": 30}
        ]}, "e": {"k": 100}}));
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn varying_group_transform_scale_disqualifies() {
    let mut v = static_shape_layer();
    v["shapes"][0]["it"]
        .as_array_mut()
        .unwrap()
        .push(json!({"ty": "tr", "s": {"k": [
            {"t": 0, "s": [100.0, 100.0], "e": [50.0, 50.0]},
            {"t": 30, "s": [50.0, 50.0], "e": [100.0, 100.0]}
        ]}}));
    assert!(!should_flatten(&layer(v)));
}

#[test]
fn static_group_transform_scale_is_fine() {
    let mut v = static_shape_layer();
    // A plain [100, 100] vector has two entries but is not keyframed.
    v["shapes"][0]["it"]
        .as_array_mut()
        .unwrap()
        .push(json!({"ty": "tr", "s": {"k": [100.0, 100.0]}, "r": {"k": 0}}));
    assert!(should_flatten(&layer(v)));
}

#[test]
fn unmergeable_position_sources_fail_closed() {
    // Both split channels varying with mismatched segment counts: the layer
    // must be treated as position-changing and, combined with rotation,
    // rejected.
    let mut v = static_shape_layer();
    v["ks"]["p"] = json!({
        "s": true,
        "x": {"k": [{"t": 0, "s": [0.0], "e": [1.0]}]},
        "y": {"k": [{"t": 0, "s": [0.0], "e": [1.0]}, {"t": 10, "s": [1.0], "e": [2.0]}]}
    });
    let l = layer(v);
    assert!(has_position_change(&l));
}
