//! # Enable File — Run Request Negotiation
//!
//! An Enable File asks a target for one run configuration: which scenes
//! to run, why, where to put results, and which settings, capabilities and
//! adaptations to change.
//!
//! ```json
//! {
//!   "target": "vulkan_general",
//!   "scenes": ["triangle"],
//!   "intent": "benchmark",
//!   "results": "out/results.json",
//!   "settings": { "quality": "high" },
//!   "capabilities": { "loops": 5 },
//!   "adaptations": { "nvidia_barriers": false }
//! }
//! ```
//!
//! ## Negotiation Rules
//!
//! - `target` must equal the schema name. It is checked first; nothing else
//!   is read from a request addressed to another target.
//! - Every referenced scene, setting, capability and adaptation must be
//!   declared by the schema. Scenes may not repeat.
//! - Settings resolve through [`Setting::resolve_override`]; capabilities
//!   through [`Capabilities::negotiate`].
//! - With `fill_defaults`, schema settings that carry a default and were not
//!   overridden are copied in, as are declared capabilities that were not
//!   requested.
//!
//! The resolved [`EnableFile`] owns deep copies of everything it carries;
//! it never aliases the schema.

use std::collections::BTreeMap;
use std::str::FromStr;

use bench_core::document::{self, join};
use bench_core::{BenchError, Capabilities, RequestError, Setting, UnknownName};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::capabilities::CapabilitiesFile;
use crate::source::EnableSource;

/// Why the run was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnableIntent {
    /// No intent given.
    #[default]
    Undefined,
    /// Demonstration run.
    Showcase,
    /// Measured benchmark run.
    Benchmark,
    /// Correctness testing run.
    Testing,
}

impl EnableIntent {
    /// Returns the tag used in Enable Files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Showcase => "showcase",
            Self::Benchmark => "benchmark",
            Self::Testing => "testing",
        }
    }
}

impl std::fmt::Display for EnableIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnableIntent {
    type Err = UnknownName;

    /// Parse an intent tag. `undefined` is not a valid tag: absence of the
    /// field is the only way to request [`EnableIntent::Undefined`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "showcase" => Ok(Self::Showcase),
            "benchmark" => Ok(Self::Benchmark),
            "testing" => Ok(Self::Testing),
            other => Err(UnknownName {
                vocabulary: "intent",
                name: other.to_string(),
            }),
        }
    }
}

/// A validated run request, resolved against a [`CapabilitiesFile`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnableFile {
    target: String,
    scenes: Vec<String>,
    intent: EnableIntent,
    results: String,
    settings: BTreeMap<String, Setting>,
    capabilities: Capabilities,
    adaptations: BTreeMap<String, bool>,
}

impl EnableFile {
    /// Negotiate an Enable File given as JSON text.
    ///
    /// # Errors
    ///
    /// `RequestError::Syntax` if the text is not valid JSON (or repeats a
    /// key), otherwise any error from [`EnableFile::from_value`].
    pub fn from_json(
        schema: &CapabilitiesFile,
        text: &str,
        fill_defaults: bool,
    ) -> Result<Self, RequestError> {
        let root = document::parse_json(text).map_err(|e| RequestError::Syntax(e.to_string()))?;
        Self::from_value(schema, &root, fill_defaults)
    }

    /// Acquire the Enable File from `source` and negotiate it.
    ///
    /// # Errors
    ///
    /// `BenchError::Source` if the document cannot be read and
    /// `BenchError::Request` if it violates the schema.
    pub fn from_source(
        schema: &CapabilitiesFile,
        source: &EnableSource,
        fill_defaults: bool,
    ) -> Result<Self, BenchError> {
        let text = source.read()?;
        let root = source.format().parse(&text).map_err(RequestError::Syntax)?;
        tracing::debug!(source = %source, "acquired enable file");
        Ok(Self::from_value(schema, &root, fill_defaults)?)
    }

    /// Negotiate an already-parsed Enable File against `schema`.
    ///
    /// # Errors
    ///
    /// `RequestError` identifying the first field that breaks a rule.
    pub fn from_value(
        schema: &CapabilitiesFile,
        root: &Value,
        fill_defaults: bool,
    ) -> Result<Self, RequestError> {
        let root = document::as_object(root, "")?;

        let target = document::expect_str(document::required(root, "target", "")?, "target")?;
        if target != schema.name() {
            return Err(RequestError::TargetMismatch {
                expected: schema.name().to_string(),
                found: target.to_string(),
            });
        }

        let mut scenes: Vec<String> = Vec::new();
        if let Some(list) = root.get("scenes") {
            let list = list.as_array().ok_or_else(|| RequestError::InvalidType {
                field: "scenes".into(),
                expected: "an array of strings",
            })?;
            for item in list {
                let scene = document::expect_str(item, "scenes")?;
                if !schema.scenes().contains_key(scene) {
                    return Err(RequestError::UnknownScene { scene: scene.to_string() });
                }
                if scenes.iter().any(|s| s == scene) {
                    return Err(RequestError::DuplicateScene { scene: scene.to_string() });
                }
                scenes.push(scene.to_string());
            }
        }

        let intent = match document::optional_str(root, "intent", "")? {
            Some(tag) => tag
                .parse()
                .map_err(|_| RequestError::UnknownIntent { intent: tag.to_string() })?,
            None => EnableIntent::Undefined,
        };

        let results = document::optional_str(root, "results", "")?
            .unwrap_or_default()
            .to_string();

        let mut settings = BTreeMap::new();
        if let Some(block) = document::optional_object(root, "settings", "")? {
            for (name, value) in block {
                let declared = schema
                    .setting(name)
                    .ok_or_else(|| RequestError::UnknownSetting { setting: name.clone() })?;
                settings.insert(name.clone(), declared.resolve_override(value)?);
            }
        }
        if fill_defaults {
            for (name, declared) in schema.settings() {
                if declared.is_set() && !settings.contains_key(name) {
                    settings.insert(name.clone(), declared.clone());
                }
            }
        }

        let capabilities = Capabilities::negotiate(
            schema.capabilities(),
            document::optional_object(root, "capabilities", "")?,
            fill_defaults,
        )?;

        let mut adaptations = BTreeMap::new();
        if let Some(block) = document::optional_object(root, "adaptations", "")? {
            for (name, value) in block {
                if !schema.adaptations().contains_key(name) {
                    return Err(RequestError::UnknownAdaptation { adaptation: name.clone() });
                }
                let enabled = document::expect_bool(value, &join("adaptations", name))?;
                adaptations.insert(name.clone(), enabled);
            }
        }

        tracing::debug!(
            target_name = %target,
            %intent,
            scenes = scenes.len(),
            settings = settings.len(),
            capabilities = capabilities.len(),
            adaptations = adaptations.len(),
            fill_defaults,
            "resolved enable file"
        );

        Ok(Self {
            target: target.to_string(),
            scenes,
            intent,
            results,
            settings,
            capabilities,
            adaptations,
        })
    }

    /// Target name (equal to the schema name).
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Requested scenes in request order.
    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Returns true if `scene` was requested.
    pub fn has_scene(&self, scene: &str) -> bool {
        self.scenes.iter().any(|s| s == scene)
    }

    /// Intent of the run.
    pub fn intent(&self) -> EnableIntent {
        self.intent
    }

    /// Results output location (empty if none was given).
    pub fn results(&self) -> &str {
        &self.results
    }

    /// Resolved settings by name.
    pub fn settings(&self) -> &BTreeMap<String, Setting> {
        &self.settings
    }

    /// Look up a resolved setting.
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    /// Selected option of a selection setting.
    pub fn selection(&self, name: &str) -> Option<&str> {
        self.setting(name)?.selected_option()
    }

    /// Value of a boolean setting.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.setting(name)?.as_bool()
    }

    /// Value of an integer setting.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.setting(name)?.as_integer()
    }

    /// Value of a float setting.
    pub fn float(&self, name: &str) -> Option<f64> {
        self.setting(name)?.as_float()
    }

    /// Resolved capabilities.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Requested adaptations by name.
    pub fn adaptations(&self) -> &BTreeMap<String, bool> {
        &self.adaptations
    }

    /// Requested state of an adaptation, if the request named it.
    pub fn adaptation(&self, name: &str) -> Option<bool> {
        self.adaptations.get(name).copied()
    }

    /// Render in Enable File form.
    ///
    /// Only set values are written, and non-modifiable capabilities are
    /// left out. Negotiating the result against the same schema with the
    /// same `fill_defaults` yields an equal `EnableFile`.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("target".into(), json!(self.target));
        if !self.scenes.is_empty() {
            doc.insert("scenes".into(), json!(self.scenes));
        }
        if self.intent != EnableIntent::Undefined {
            doc.insert("intent".into(), json!(self.intent));
        }
        if !self.results.is_empty() {
            doc.insert("results".into(), json!(self.results));
        }
        let settings: Map<String, Value> = self
            .settings
            .iter()
            .filter_map(|(name, s)| s.request_value().map(|v| (name.clone(), v)))
            .collect();
        if !settings.is_empty() {
            doc.insert("settings".into(), Value::Object(settings));
        }
        let capabilities = self.capabilities.to_request_block();
        if !capabilities.is_empty() {
            doc.insert("capabilities".into(), Value::Object(capabilities));
        }
        if !self.adaptations.is_empty() {
            doc.insert("adaptations".into(), json!(self.adaptations));
        }
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> CapabilitiesFile {
        CapabilitiesFile::from_value(&json!({
            "name": "Bar",
            "scenes": {"intro": {}, "stress": {}},
            "settings": {
                "quality": {"type": "selection", "options": ["low", "high"], "default": "low"},
                "vsync": {"type": "bool"}
            },
            "capabilities": {
                "visual_settings": {"default": 50, "modifiable": true}
            },
            "adaptations": {"amd_wave32": {}}
        }))
        .unwrap()
    }

    #[test]
    fn intent_tags() {
        assert_eq!("showcase".parse::<EnableIntent>().unwrap(), EnableIntent::Showcase);
        assert_eq!("benchmark".parse::<EnableIntent>().unwrap(), EnableIntent::Benchmark);
        assert_eq!("testing".parse::<EnableIntent>().unwrap(), EnableIntent::Testing);
        assert!("undefined".parse::<EnableIntent>().is_err());
        assert_eq!(EnableIntent::default(), EnableIntent::Undefined);
    }

    #[test]
    fn minimal_request() {
        let enable = EnableFile::from_value(&schema(), &json!({"target": "Bar"}), false).unwrap();
        assert_eq!(enable.target(), "Bar");
        assert!(enable.scenes().is_empty());
        assert_eq!(enable.intent(), EnableIntent::Undefined);
        assert_eq!(enable.results(), "");
        assert!(enable.settings().is_empty());
        assert!(enable.capabilities().is_empty());
        assert!(enable.adaptations().is_empty());
    }

    #[test]
    fn target_is_required() {
        let err = EnableFile::from_value(&schema(), &json!({"scenes": []}), false).unwrap_err();
        assert_eq!(err, RequestError::MissingField { field: "target".into() });
    }

    #[test]
    fn target_mismatch_is_checked_before_anything_else() {
        let err = EnableFile::from_value(
            &schema(),
            &json!({"target": "Foo", "scenes": ["nope"], "settings": {"ghost": 1}}),
            true,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RequestError::TargetMismatch { expected: "Bar".into(), found: "Foo".into() }
        );
    }

    #[test]
    fn scenes_keep_order() {
        let enable = EnableFile::from_value(
            &schema(),
            &json!({"target": "Bar", "scenes": ["stress", "intro"]}),
            false,
        )
        .unwrap();
        assert_eq!(enable.scenes(), ["stress".to_string(), "intro".to_string()]);
        assert!(enable.has_scene("intro"));
    }

    #[test]
    fn unknown_scene_is_rejected() {
        let err = EnableFile::from_value(&schema(), &json!({"target": "Bar", "scenes": ["outro"]}), false)
            .unwrap_err();
        assert_eq!(err, RequestError::UnknownScene { scene: "outro".into() });
    }

    #[test]
    fn duplicate_scene_is_rejected() {
        let err = EnableFile::from_value(
            &schema(),
            &json!({"target": "Bar", "scenes": ["intro", "intro"]}),
            false,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::DuplicateScene { scene: "intro".into() });
    }

    #[test]
    fn unknown_intent_is_rejected() {
        let err = EnableFile::from_value(&schema(), &json!({"target": "Bar", "intent": "fun"}), false)
            .unwrap_err();
        assert_eq!(err, RequestError::UnknownIntent { intent: "fun".into() });
    }

    #[test]
    fn unknown_setting_is_rejected() {
        let err = EnableFile::from_value(
            &schema(),
            &json!({"target": "Bar", "settings": {"ghost": true}}),
            false,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::UnknownSetting { setting: "ghost".into() });
    }

    #[test]
    fn fill_defaults_skips_settings_without_default() {
        let enable = EnableFile::from_value(&schema(), &json!({"target": "Bar"}), true).unwrap();
        assert_eq!(enable.selection("quality"), Some("low"));
        assert!(enable.setting("vsync").is_none());
        assert_eq!(enable.capabilities().visual_settings(), Some(50.0));
    }

    #[test]
    fn adaptations_resolve_to_booleans() {
        let enable = EnableFile::from_value(
            &schema(),
            &json!({"target": "Bar", "adaptations": {"amd_wave32": true}}),
            false,
        )
        .unwrap();
        assert_eq!(enable.adaptation("amd_wave32"), Some(true));

        let err = EnableFile::from_value(
            &schema(),
            &json!({"target": "Bar", "adaptations": {"intel_xe": true}}),
            false,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::UnknownAdaptation { adaptation: "intel_xe".into() });

        let err = EnableFile::from_value(
            &schema(),
            &json!({"target": "Bar", "adaptations": {"amd_wave32": "yes"}}),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::InvalidType { .. }));
    }

    #[test]
    fn duplicate_adaptation_in_text_is_rejected() {
        let err = EnableFile::from_json(
            &schema(),
            r#"{"target": "Bar", "adaptations": {"amd_wave32": true, "amd_wave32": false}}"#,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::Syntax(_)));
    }

    #[test]
    fn resolved_request_does_not_alias_schema() {
        let schema = schema();
        let enable = EnableFile::from_value(
            &schema,
            &json!({"target": "Bar", "settings": {"quality": "high"}}),
            false,
        )
        .unwrap();
        assert_eq!(enable.selection("quality"), Some("high"));
        assert_eq!(schema.setting("quality").unwrap().selected_option(), Some("low"));
    }

    #[test]
    fn to_document_renegotiates_to_same_request() {
        let schema = schema();
        let enable = EnableFile::from_value(
            &schema,
            &json!({
                "target": "Bar",
                "scenes": ["intro"],
                "intent": "testing",
                "results": "out.json",
                "settings": {"vsync": true},
                "capabilities": {"visual_settings": 80},
                "adaptations": {"amd_wave32": false}
            }),
            true,
        )
        .unwrap();
        let again = EnableFile::from_value(&schema, &enable.to_document(), true).unwrap();
        assert_eq!(enable, again);
    }

    #[test]
    fn filled_non_modifiable_capability_survives_renegotiation() {
        let schema = CapabilitiesFile::from_value(&json!({
            "name": "Bar",
            "capabilities": {
                "loops": {"default": 2, "modifiable": false},
                "visual_settings": {"default": 50, "modifiable": true}
            }
        }))
        .unwrap();
        let enable = EnableFile::from_value(
            &schema,
            &json!({"target": "Bar", "capabilities": {"visual_settings": 10}}),
            true,
        )
        .unwrap();
        assert_eq!(enable.capabilities().loops(), Some(2));

        let doc = enable.to_document();
        assert!(doc["capabilities"].get("loops").is_none());
        let again = EnableFile::from_value(&schema, &doc, true).unwrap();
        assert_eq!(enable, again);

        let bare = EnableFile::from_value(&schema, &doc, false).unwrap();
        assert_eq!(bare.capabilities().loops(), None);
        assert_eq!(bare.capabilities().visual_settings(), Some(10.0));
    }

    #[test]
    fn intent_serializes_as_tag() {
        for intent in [EnableIntent::Showcase, EnableIntent::Benchmark, EnableIntent::Testing] {
            let rendered = serde_json::to_value(intent).unwrap();
            assert_eq!(rendered, json!(intent.as_str()));
            assert_eq!(serde_json::from_value::<EnableIntent>(rendered).unwrap(), intent);
        }
    }
}
