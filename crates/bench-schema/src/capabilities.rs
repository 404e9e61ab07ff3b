//! # Capabilities File — Target Schema
//!
//! A Capabilities File is the schema a target publishes: its identity,
//! the scenes it can run, its tunable settings, the capability slots it
//! supports and its vendor/platform adaptations.
//!
//! ```json
//! {
//!   "name": "vulkan_general",
//!   "description": "General Vulkan exercises",
//!   "version": 1,
//!   "scenes": { "triangle": { "description": "Single triangle" } },
//!   "settings": {
//!     "quality": { "type": "selection", "options": ["low", "high"], "default": "low" }
//!   },
//!   "capabilities": { "loops": { "default": 1, "modifiable": true } },
//!   "adaptations": { "nvidia_barriers": { "description": "Relaxed barriers" } }
//! }
//! ```
//!
//! Loading is all-or-nothing: the first violation aborts with a
//! [`SchemaError`]. Once loaded the schema is immutable and may be shared
//! by reference with every request validated against it.

use std::collections::BTreeMap;
use std::path::Path;

use bench_core::document::{self, join};
use bench_core::{BenchError, Capabilities, SchemaError, Setting, SettingKind};
use serde_json::{json, Map, Value};

use crate::source::{self, DocumentFormat};

/// Version assumed when a Capabilities File does not declare one.
pub const DEFAULT_VERSION: u32 = 1;

/// A scene the target can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Scene name.
    pub name: String,
    /// Human-readable description (may be empty).
    pub description: String,
}

/// A vendor- or platform-specific behaviour switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adaptation {
    /// Adaptation name.
    pub name: String,
    /// Human-readable description (may be empty).
    pub description: String,
}

/// A loaded, validated Capabilities File.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitiesFile {
    name: String,
    description: String,
    version: u32,
    scenes: BTreeMap<String, Scene>,
    settings: BTreeMap<String, Setting>,
    capabilities: Capabilities,
    adaptations: BTreeMap<String, Adaptation>,
}

impl CapabilitiesFile {
    /// Load a Capabilities File from JSON text.
    ///
    /// # Errors
    ///
    /// `SchemaError::Syntax` if the text is not valid JSON (or repeats a
    /// key), otherwise any error from [`CapabilitiesFile::from_value`].
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let root = document::parse_json(text).map_err(|e| SchemaError::Syntax(e.to_string()))?;
        Self::from_value(&root)
    }

    /// Load a Capabilities File from disk, JSON or YAML by extension.
    ///
    /// # Errors
    ///
    /// `BenchError::Source` if the file cannot be read and
    /// `BenchError::Schema` if its content is invalid.
    pub fn from_path(path: &Path) -> Result<Self, BenchError> {
        let text = source::read_text(path)?;
        let root = DocumentFormat::from_path(path)
            .parse(&text)
            .map_err(SchemaError::Syntax)?;
        Ok(Self::from_value(&root)?)
    }

    /// Load a Capabilities File from an already-parsed document.
    ///
    /// # Errors
    ///
    /// `SchemaError` identifying the first field that breaks a rule.
    pub fn from_value(root: &Value) -> Result<Self, SchemaError> {
        let root = document::as_object(root, "")?;

        let name = document::expect_str(document::required(root, "name", "")?, "name")?.to_string();
        let description = document::optional_str(root, "description", "")?
            .unwrap_or_default()
            .to_string();
        let version = match root.get("version") {
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| SchemaError::InvalidType {
                    field: "version".into(),
                    expected: "a non-negative 32-bit integer",
                })?,
            None => DEFAULT_VERSION,
        };

        let mut scenes = BTreeMap::new();
        if let Some(block) = document::optional_object(root, "scenes", "")? {
            for (scene_name, entry) in block {
                let scene = Scene {
                    name: scene_name.clone(),
                    description: described(entry, &join("scenes", scene_name))?,
                };
                insert_unique(&mut scenes, "scenes", scene_name, scene)?;
            }
        }

        let mut settings = BTreeMap::new();
        if let Some(block) = document::optional_object(root, "settings", "")? {
            for (setting_name, entry) in block {
                let path = join("settings", setting_name);
                let entry = document::as_object(entry, &path)?;
                let kind_name = document::expect_str(
                    document::required(entry, "type", &path)?,
                    &join(&path, "type"),
                )?;
                let kind: SettingKind =
                    kind_name.parse().map_err(|_| SchemaError::UnknownSettingType {
                        setting: setting_name.clone(),
                        kind: kind_name.to_string(),
                    })?;
                let setting = Setting::parse_schema_entry(setting_name, kind, entry)?;
                insert_unique(&mut settings, "settings", setting_name, setting)?;
            }
        }

        let capabilities = match document::optional_object(root, "capabilities", "")? {
            Some(block) => Capabilities::from_schema_block(block)?,
            None => Capabilities::new(),
        };

        let mut adaptations = BTreeMap::new();
        if let Some(block) = document::optional_object(root, "adaptations", "")? {
            for (adaptation_name, entry) in block {
                let adaptation = Adaptation {
                    name: adaptation_name.clone(),
                    description: described(entry, &join("adaptations", adaptation_name))?,
                };
                insert_unique(&mut adaptations, "adaptations", adaptation_name, adaptation)?;
            }
        }

        tracing::debug!(
            target_name = %name,
            version,
            scenes = scenes.len(),
            settings = settings.len(),
            capabilities = capabilities.len(),
            adaptations = adaptations.len(),
            "loaded capabilities file"
        );

        Ok(Self {
            name,
            description,
            version,
            scenes,
            settings,
            capabilities,
            adaptations,
        })
    }

    /// Target name; every Enable File must address exactly this name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description (may be empty).
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Schema version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Declared scenes by name.
    pub fn scenes(&self) -> &BTreeMap<String, Scene> {
        &self.scenes
    }

    /// Declared settings by name, with their defaults.
    pub fn settings(&self) -> &BTreeMap<String, Setting> {
        &self.settings
    }

    /// Look up a declared setting.
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    /// Declared capability slots with their defaults and modifiability.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Declared adaptations by name.
    pub fn adaptations(&self) -> &BTreeMap<String, Adaptation> {
        &self.adaptations
    }

    /// Render back into Capabilities File form.
    ///
    /// Loading the result yields a schema equal to `self`.
    pub fn to_document(&self) -> Value {
        let scenes: Map<String, Value> = self
            .scenes
            .values()
            .map(|s| (s.name.clone(), describe(&s.description)))
            .collect();
        let settings: Map<String, Value> = self
            .settings
            .iter()
            .map(|(name, s)| (name.clone(), s.to_schema_entry()))
            .collect();
        let adaptations: Map<String, Value> = self
            .adaptations
            .values()
            .map(|a| (a.name.clone(), describe(&a.description)))
            .collect();

        json!({
            "name": self.name,
            "description": self.description,
            "version": self.version,
            "scenes": scenes,
            "settings": settings,
            "capabilities": self.capabilities.to_schema_block(),
            "adaptations": adaptations,
        })
    }
}

/// Read the optional `description` of a scene or adaptation entry.
fn described(entry: &Value, path: &str) -> Result<String, SchemaError> {
    let entry = document::as_object(entry, path)?;
    Ok(document::optional_str(entry, "description", path)?
        .unwrap_or_default()
        .to_string())
}

fn describe(description: &str) -> Value {
    if description.is_empty() {
        json!({})
    } else {
        json!({ "description": description })
    }
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    section: &'static str,
    name: &str,
    value: T,
) -> Result<(), SchemaError> {
    if map.contains_key(name) {
        return Err(SchemaError::DuplicateEntry {
            section,
            name: name.to_string(),
        });
    }
    map.insert(name.to_string(), value);
    Ok(())
}
