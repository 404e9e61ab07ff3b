//! Integration tests: negotiate Enable Files against a Capabilities File.
//!
//! Covers the observable contract end to end, from raw JSON text to the
//! resolved configuration: target matching, setting resolution, capability
//! modifiability and bounds, and default back-filling.

use bench_core::{BenchError, CapabilityId, RequestError, SchemaError, SourceError};
use bench_schema::{CapabilitiesFile, EnableFile, EnableIntent, EnableSource};
use serde_json::json;

const CAPABILITIES: &str = r#"{
    "name": "Bar",
    "description": "Exercise target",
    "scenes": {
        "triangle": {"description": "Single triangle"},
        "pushconstant": {}
    },
    "settings": {
        "quality": {"type": "selection", "options": ["low", "high"], "default": "low"},
        "vsync": {"type": "bool", "default": true},
        "instances": {"type": "integer", "min": 1, "max": 64},
        "scale": {"type": "float", "min": 0.5, "max": 2.0, "default": 1.0}
    },
    "capabilities": {
        "visual_settings": {"default": 50, "modifiable": true},
        "loops": {"default": 1, "modifiable": false},
        "fixed_framerate": {"default": 60.0, "modifiable": true},
        "gpu_delay_reuse": {"default": 3, "modifiable": true},
        "non_interactive": {"default": true, "modifiable": true}
    },
    "adaptations": {
        "nvidia_barriers": {"description": "Relaxed barriers"}
    }
}"#;

fn schema() -> CapabilitiesFile {
    CapabilitiesFile::from_json(CAPABILITIES).expect("fixture schema loads")
}

fn negotiate(request: serde_json::Value, fill_defaults: bool) -> Result<EnableFile, RequestError> {
    EnableFile::from_value(&schema(), &request, fill_defaults)
}

#[test]
fn selection_override_resolves_to_option_index() {
    let enable = negotiate(json!({"target": "Bar", "settings": {"quality": "high"}}), false).unwrap();
    assert_eq!(enable.setting("quality").unwrap().selected_index(), Some(1));
}

#[test]
fn selection_override_with_unknown_option_fails() {
    let err = negotiate(json!({"target": "Bar", "settings": {"quality": "ultra"}}), false).unwrap_err();
    assert!(matches!(err, RequestError::UnknownOption { .. }));
}

#[test]
fn visual_settings_zero_rejected_one_accepted() {
    let err = negotiate(json!({"target": "Bar", "capabilities": {"visual_settings": 0}}), false)
        .unwrap_err();
    assert!(matches!(err, RequestError::ConstraintViolation { .. }), "{err}");

    let enable = negotiate(json!({"target": "Bar", "capabilities": {"visual_settings": 1}}), false)
        .unwrap();
    let visual = enable.capabilities().float(CapabilityId::VisualSettings).unwrap();
    assert_eq!(visual.value, 1.0);
    assert!(visual.modifiable);
}

#[test]
fn non_modifiable_loops_rejected_for_any_value() {
    for loops in [0, 1, 5, 1000] {
        let err = negotiate(json!({"target": "Bar", "capabilities": {"loops": loops}}), true)
            .unwrap_err();
        assert_eq!(err, RequestError::NonModifiable { capability: "loops".into() });
        assert!(err.to_string().contains("non-modifiable"));
    }
}

#[test]
fn target_mismatch_rejected_first() {
    let err = negotiate(
        json!({
            "target": "Foo",
            "scenes": ["missing"],
            "intent": "bogus",
            "capabilities": {"loops": 5}
        }),
        true,
    )
    .unwrap_err();
    assert_eq!(
        err,
        RequestError::TargetMismatch { expected: "Bar".into(), found: "Foo".into() }
    );
}

#[test]
fn integer_setting_bounds_are_inclusive() {
    for ok in [1, 64] {
        let enable = negotiate(json!({"target": "Bar", "settings": {"instances": ok}}), false).unwrap();
        assert_eq!(enable.integer("instances"), Some(ok));
    }
    for bad in [0, 65] {
        let err = negotiate(json!({"target": "Bar", "settings": {"instances": bad}}), false)
            .unwrap_err();
        assert!(matches!(err, RequestError::OutOfRange { .. }), "{err}");
    }
}

#[test]
fn float_setting_bounds_are_inclusive() {
    for ok in [0.5, 2.0] {
        let enable = negotiate(json!({"target": "Bar", "settings": {"scale": ok}}), false).unwrap();
        assert_eq!(enable.float("scale"), Some(ok));
    }
    for bad in [-0.5, 3.0] {
        assert!(negotiate(json!({"target": "Bar", "settings": {"scale": bad}}), false).is_err());
    }
}

#[test]
fn fill_defaults_true_backfills_settings_and_capabilities() {
    let enable = negotiate(json!({"target": "Bar", "settings": {"quality": "high"}}), true).unwrap();

    // Explicit override wins over the default.
    assert_eq!(enable.selection("quality"), Some("high"));
    // Defaults appear for everything that has one.
    assert_eq!(enable.flag("vsync"), Some(true));
    assert_eq!(enable.float("scale"), Some(1.0));
    // No default, no entry.
    assert!(enable.setting("instances").is_none());

    let schema = schema();
    assert_eq!(enable.capabilities(), schema.capabilities());
    assert_eq!(enable.capabilities().loops(), Some(1));
}

#[test]
fn fill_defaults_false_keeps_only_requested_entries() {
    let enable = negotiate(
        json!({"target": "Bar", "settings": {"quality": "high"}, "capabilities": {"gpu_delay_reuse": 1}}),
        false,
    )
    .unwrap();
    assert_eq!(enable.settings().len(), 1);
    assert!(enable.setting("vsync").is_none());
    assert_eq!(enable.capabilities().len(), 1);
    assert_eq!(enable.capabilities().gpu_delay_reuse(), Some(1));
    assert!(enable.capabilities().loops().is_none());
}

#[test]
fn full_request_resolves() {
    let enable = EnableFile::from_json(
        &schema(),
        r#"{
            "target": "Bar",
            "scenes": ["pushconstant", "triangle"],
            "intent": "benchmark",
            "results": "results/run1.json",
            "settings": {"vsync": false, "instances": 8},
            "capabilities": {"fixed_framerate": {"default": 0}, "non_interactive": false},
            "adaptations": {"nvidia_barriers": true}
        }"#,
        false,
    )
    .unwrap();

    assert_eq!(enable.scenes(), ["pushconstant".to_string(), "triangle".to_string()]);
    assert_eq!(enable.intent(), EnableIntent::Benchmark);
    assert_eq!(enable.results(), "results/run1.json");
    assert_eq!(enable.flag("vsync"), Some(false));
    assert_eq!(enable.integer("instances"), Some(8));
    assert_eq!(enable.capabilities().fixed_framerate(), Some(0.0));
    assert_eq!(
        enable.capabilities().flag(CapabilityId::NonInteractive).map(|c| c.value),
        Some(false)
    );
    assert_eq!(enable.adaptation("nvidia_barriers"), Some(true));
}

#[test]
fn negative_fixed_framerate_rejected() {
    let err = negotiate(json!({"target": "Bar", "capabilities": {"fixed_framerate": -1}}), false)
        .unwrap_err();
    assert!(matches!(err, RequestError::ConstraintViolation { .. }));
}

#[test]
fn unknown_capability_name_rejected() {
    let err = negotiate(json!({"target": "Bar", "capabilities": {"turbo_mode": true}}), false)
        .unwrap_err();
    assert_eq!(err, RequestError::UnknownCapability { name: "turbo_mode".into() });
}

#[test]
fn capabilities_roundtrip_through_document() {
    let schema = schema();
    let reloaded = CapabilitiesFile::from_value(&schema.to_document()).unwrap();
    assert_eq!(schema, reloaded);
    assert_eq!(reloaded.setting("quality").unwrap().selected_option(), Some("low"));
}

#[test]
fn out_of_range_schema_default_rejected() {
    let err = CapabilitiesFile::from_json(
        r#"{"name": "t", "settings": {"n": {"type": "integer", "min": 0, "max": 10, "default": 42}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::DefaultOutOfRange { .. }), "{err}");
}

#[test]
fn capability_default_outside_slot_constraint_rejected() {
    let err = CapabilitiesFile::from_json(
        r#"{"name": "t", "capabilities": {"visual_settings": {"default": 0, "modifiable": true}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::DefaultViolatesConstraint { .. }), "{err}");
}

#[test]
fn filled_request_renegotiates_from_its_document() {
    let schema = schema();
    let enable = negotiate(json!({"target": "Bar", "capabilities": {"visual_settings": 5}}), true).unwrap();
    let again = EnableFile::from_value(&schema, &enable.to_document(), true).unwrap();
    assert_eq!(enable, again);
    assert_eq!(again.capabilities().loops(), Some(1));
}

#[test]
fn enable_file_from_path_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enable.json");
    std::fs::write(&path, r#"{"target": "Bar", "intent": "showcase"}"#).unwrap();

    let source = EnableSource::from_parts(Some(path), None).unwrap();
    let enable = EnableFile::from_source(&schema(), &source, false).unwrap();
    assert_eq!(enable.intent(), EnableIntent::Showcase);
}

#[test]
fn enable_file_from_yaml_path_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enable.yaml");
    std::fs::write(&path, "target: Bar\nscenes:\n  - triangle\n").unwrap();

    let source = EnableSource::Path(path);
    let enable = EnableFile::from_source(&schema(), &source, false).unwrap();
    assert!(enable.has_scene("triangle"));
}

#[test]
fn unreadable_enable_path_is_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = EnableSource::Path(dir.path().join("absent.json"));
    let err = EnableFile::from_source(&schema(), &source, false).unwrap_err();
    assert!(matches!(err, BenchError::Source(SourceError::Read { .. })));
}

#[test]
fn malformed_inline_document_is_request_error() {
    let source = EnableSource::Inline("{\"target\": ".into());
    let err = EnableFile::from_source(&schema(), &source, false).unwrap_err();
    assert!(matches!(err, BenchError::Request(RequestError::Syntax(_))));
}

#[test]
fn schema_is_shareable_across_threads() {
    let schema = std::sync::Arc::new(schema());
    let handles: Vec<_> = ["low", "high"]
        .into_iter()
        .map(|quality| {
            let schema = std::sync::Arc::clone(&schema);
            std::thread::spawn(move || {
                EnableFile::from_value(
                    &schema,
                    &json!({"target": "Bar", "settings": {"quality": quality}}),
                    false,
                )
                .map(|e| e.selection("quality").map(str::to_string))
            })
        })
        .collect();
    let picked: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert_eq!(picked, [Some("low".to_string()), Some("high".to_string())]);
}
