//! # Setting Model
//!
//! A setting is a named, user-tunable value declared by a target in its
//! Capabilities File and optionally overridden by an Enable File. Four
//! kinds exist, each with its own payload and validation rule:
//!
//! | Kind | Payload | Value | Rule |
//! |------|---------|-------|------|
//! | `selection` | ordered unique options | index into options | must name an option |
//! | `bool` | - | `bool` | none |
//! | `integer` | `min`/`max` (32-bit) | `i64` | `min <= value <= max` |
//! | `float` | `min`/`max` | `f64` | `min <= value <= max` |
//!
//! The kind and its payload live together in [`SettingValue`], so a
//! setting can never carry bounds of one kind and a value of another.
//!
//! ## Invariants
//!
//! Every constructed [`Setting`] holds a value that satisfies its kind's
//! rule. Fields are private; the only ways in are the validating
//! constructors, [`Setting::parse_schema_entry`] and
//! [`Setting::resolve_override`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::document::{self, join};
use crate::error::{RequestError, SchemaError, UnknownName};

/// Discriminant of the four setting kinds, as written in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    /// One of an ordered list of option strings.
    Selection,
    /// On/off switch.
    Bool,
    /// Bounded integer.
    Integer,
    /// Bounded floating point number.
    Float,
}

impl SettingKind {
    /// Returns every kind in declaration order.
    pub fn all() -> &'static [SettingKind] {
        &[Self::Selection, Self::Bool, Self::Integer, Self::Float]
    }

    /// Returns the `type` string used in Capabilities Files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }
}

impl std::fmt::Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "selection" => Ok(Self::Selection),
            "bool" => Ok(Self::Bool),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            other => Err(UnknownName {
                vocabulary: "setting type",
                name: other.to_string(),
            }),
        }
    }
}

/// Kind-specific payload and current value of a setting.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// Selection among `options`; `value` indexes into `options`.
    Selection {
        /// Ordered, unique option strings.
        options: Vec<String>,
        /// Index of the selected option.
        value: Option<usize>,
    },
    /// Boolean switch.
    Bool {
        /// Current value.
        value: Option<bool>,
    },
    /// Integer within `[min, max]`.
    Integer {
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
        /// Current value.
        value: Option<i64>,
    },
    /// Floating point number within `[min, max]`.
    Float {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Current value.
        value: Option<f64>,
    },
}

impl SettingValue {
    /// Returns the kind discriminant of this payload.
    pub fn kind(&self) -> SettingKind {
        match self {
            Self::Selection { .. } => SettingKind::Selection,
            Self::Bool { .. } => SettingKind::Bool,
            Self::Integer { .. } => SettingKind::Integer,
            Self::Float { .. } => SettingKind::Float,
        }
    }

    /// Returns true if a value (default or override) is present.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Selection { value, .. } => value.is_some(),
            Self::Bool { value } => value.is_some(),
            Self::Integer { value, .. } => value.is_some(),
            Self::Float { value, .. } => value.is_some(),
        }
    }
}

/// A named, typed, user-tunable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    name: String,
    description: String,
    value: SettingValue,
}

impl Setting {
    /// Build a selection setting. `default`, when given, must be one of `options`.
    ///
    /// # Errors
    ///
    /// `SchemaError::DuplicateOption` if an option repeats and
    /// `SchemaError::UnknownDefaultOption` if `default` is not an option.
    pub fn selection(
        name: impl Into<String>,
        options: Vec<String>,
        default: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(SchemaError::DuplicateOption {
                    setting: name,
                    option: option.clone(),
                });
            }
        }
        let value = match default {
            Some(option) => match options.iter().position(|o| o == option) {
                Some(index) => Some(index),
                None => {
                    return Err(SchemaError::UnknownDefaultOption {
                        setting: name,
                        option: option.to_string(),
                    })
                }
            },
            None => None,
        };
        Ok(Self {
            name,
            description: String::new(),
            value: SettingValue::Selection { options, value },
        })
    }

    /// Build a boolean setting.
    pub fn boolean(name: impl Into<String>, default: Option<bool>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value: SettingValue::Bool { value: default },
        }
    }

    /// Build an integer setting bounded by `[min, max]`.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvertedRange` if `min > max` and
    /// `SchemaError::DefaultOutOfRange` if `default` is outside the bounds.
    pub fn integer(
        name: impl Into<String>,
        min: i32,
        max: i32,
        default: Option<i64>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if min > max {
            return Err(SchemaError::InvertedRange {
                setting: name,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        if let Some(v) = default {
            if v < i64::from(min) || v > i64::from(max) {
                return Err(SchemaError::DefaultOutOfRange {
                    setting: name,
                    value: v.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        Ok(Self {
            name,
            description: String::new(),
            value: SettingValue::Integer { min, max, value: default },
        })
    }

    /// Build a float setting bounded by `[min, max]`.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvertedRange` if `min > max` and
    /// `SchemaError::DefaultOutOfRange` if `default` is outside the bounds.
    pub fn float(
        name: impl Into<String>,
        min: f64,
        max: f64,
        default: Option<f64>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if min > max {
            return Err(SchemaError::InvertedRange {
                setting: name,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        if let Some(v) = default {
            if !(min..=max).contains(&v) {
                return Err(SchemaError::DefaultOutOfRange {
                    setting: name,
                    value: v.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        Ok(Self {
            name,
            description: String::new(),
            value: SettingValue::Float { min, max, value: default },
        })
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse one entry of a Capabilities File `settings` block.
    ///
    /// `kind` comes from the entry's `type` field; the caller dispatches on
    /// it. Reads `options` (selection) or `min`/`max` (integer, float), an
    /// optional `default` and an optional `description`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a required field is missing or mistyped,
    /// or if the default breaks the rule of its kind.
    pub fn parse_schema_entry(
        name: &str,
        kind: SettingKind,
        entry: &Map<String, Value>,
    ) -> Result<Self, SchemaError> {
        let path = join("settings", name);
        let default = entry.get("default");
        let default_path = join(&path, "default");

        let setting = match kind {
            SettingKind::Selection => {
                let options_path = join(&path, "options");
                let options = document::required(entry, "options", &path)?
                    .as_array()
                    .ok_or_else(|| SchemaError::InvalidType {
                        field: options_path.clone(),
                        expected: "an array of strings",
                    })?
                    .iter()
                    .map(|o| document::expect_str(o, &options_path).map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()?;
                let default = default
                    .map(|v| document::expect_str(v, &default_path))
                    .transpose()?;
                Self::selection(name, options, default)?
            }
            SettingKind::Bool => {
                let default = default
                    .map(|v| document::expect_bool(v, &default_path))
                    .transpose()?;
                Self::boolean(name, default)
            }
            SettingKind::Integer => {
                let min = document::expect_i32(document::required(entry, "min", &path)?, &join(&path, "min"))?;
                let max = document::expect_i32(document::required(entry, "max", &path)?, &join(&path, "max"))?;
                let default = default
                    .map(|v| document::expect_i64(v, &default_path))
                    .transpose()?;
                Self::integer(name, min, max, default)?
            }
            SettingKind::Float => {
                let min = document::expect_f64(document::required(entry, "min", &path)?, &join(&path, "min"))?;
                let max = document::expect_f64(document::required(entry, "max", &path)?, &join(&path, "max"))?;
                let default = default
                    .map(|v| document::expect_f64(v, &default_path))
                    .transpose()?;
                Self::float(name, min, max, default)?
            }
        };

        let description = document::optional_str(entry, "description", &path)?.unwrap_or_default();
        Ok(setting.with_description(description))
    }

    /// Resolve an Enable File override against this schema entry.
    ///
    /// Returns a deep copy of `self` (options, bounds and description
    /// preserved) whose value is taken from `value`. The schema entry is
    /// never modified.
    ///
    /// # Errors
    ///
    /// `RequestError::InvalidType` if `value` has the wrong JSON type,
    /// `RequestError::UnknownOption` for an unknown selection option and
    /// `RequestError::OutOfRange` for a numeric value outside the bounds.
    pub fn resolve_override(&self, value: &Value) -> Result<Self, RequestError> {
        let path = join("settings", &self.name);
        let mut resolved = self.clone();

        match &mut resolved.value {
            SettingValue::Selection { options, value: slot } => {
                let option = document::expect_str(value, &path)?;
                let index = options.iter().position(|o| o == option).ok_or_else(|| {
                    RequestError::UnknownOption {
                        setting: self.name.clone(),
                        option: option.to_string(),
                    }
                })?;
                *slot = Some(index);
            }
            SettingValue::Bool { value: slot } => {
                *slot = Some(document::expect_bool(value, &path)?);
            }
            SettingValue::Integer { min, max, value: slot } => {
                let v = document::expect_i64(value, &path)?;
                if v < i64::from(*min) || v > i64::from(*max) {
                    return Err(self.out_of_range(v.to_string(), min.to_string(), max.to_string()));
                }
                *slot = Some(v);
            }
            SettingValue::Float { min, max, value: slot } => {
                let v = document::expect_f64(value, &path)?;
                if !(*min..=*max).contains(&v) {
                    return Err(self.out_of_range(v.to_string(), min.to_string(), max.to_string()));
                }
                *slot = Some(v);
            }
        }

        Ok(resolved)
    }

    fn out_of_range(&self, value: String, min: String, max: String) -> RequestError {
        RequestError::OutOfRange {
            setting: self.name.clone(),
            value,
            min,
            max,
        }
    }

    /// Setting name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description (empty if none was declared).
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Kind discriminant.
    pub fn kind(&self) -> SettingKind {
        self.value.kind()
    }

    /// Kind-specific payload and value.
    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    /// Returns true if the setting carries a value.
    pub fn is_set(&self) -> bool {
        self.value.is_set()
    }

    /// Index of the selected option, for selection settings.
    pub fn selected_index(&self) -> Option<usize> {
        match &self.value {
            SettingValue::Selection { value, .. } => *value,
            _ => None,
        }
    }

    /// Selected option string, for selection settings.
    pub fn selected_option(&self) -> Option<&str> {
        match &self.value {
            SettingValue::Selection { options, value } => {
                value.and_then(|i| options.get(i)).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Value of a boolean setting.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            SettingValue::Bool { value } => *value,
            _ => None,
        }
    }

    /// Value of an integer setting.
    pub fn as_integer(&self) -> Option<i64> {
        match &self.value {
            SettingValue::Integer { value, .. } => *value,
            _ => None,
        }
    }

    /// Value of a float setting.
    pub fn as_float(&self) -> Option<f64> {
        match &self.value {
            SettingValue::Float { value, .. } => *value,
            _ => None,
        }
    }

    /// Render this setting as a Capabilities File `settings` entry.
    ///
    /// The current value, if any, is written as `default`.
    pub fn to_schema_entry(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("type".into(), json!(self.kind()));
        if !self.description.is_empty() {
            entry.insert("description".into(), json!(self.description));
        }
        match &self.value {
            SettingValue::Selection { options, .. } => {
                entry.insert("options".into(), json!(options));
            }
            SettingValue::Bool { .. } => {}
            SettingValue::Integer { min, max, .. } => {
                entry.insert("min".into(), json!(min));
                entry.insert("max".into(), json!(max));
            }
            SettingValue::Float { min, max, .. } => {
                entry.insert("min".into(), json!(min));
                entry.insert("max".into(), json!(max));
            }
        }
        if let Some(default) = self.request_value() {
            entry.insert("default".into(), default);
        }
        Value::Object(entry)
    }

    /// Render the current value as it is written in an Enable File
    /// (selections by option string). `None` if no value is set.
    pub fn request_value(&self) -> Option<Value> {
        match &self.value {
            SettingValue::Selection { .. } => self.selected_option().map(|o| json!(o)),
            SettingValue::Bool { value } => value.map(Value::Bool),
            SettingValue::Integer { value, .. } => value.map(|v| json!(v)),
            SettingValue::Float { value, .. } => value.map(|v| json!(v)),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Integer overrides at either bound succeed; one past either bound fails.
        #[test]
        fn integer_bounds_are_inclusive(min in -1000i32..1000, span in 0i32..1000) {
            let max = min + span;
            let setting = Setting::integer("n", min, max, None).unwrap();
            prop_assert!(setting.resolve_override(&json!(min)).is_ok());
            prop_assert!(setting.resolve_override(&json!(max)).is_ok());
            let below = setting.resolve_override(&json!(i64::from(min) - 1));
            let above = setting.resolve_override(&json!(i64::from(max) + 1));
            prop_assert!(
                matches!(below, Err(RequestError::OutOfRange { .. })),
                "value below min accepted"
            );
            prop_assert!(
                matches!(above, Err(RequestError::OutOfRange { .. })),
                "value above max accepted"
            );
        }

        /// Float overrides at either bound succeed; one unit past either bound fails.
        #[test]
        fn float_bounds_are_inclusive(min in -1000.0f64..1000.0, span in 0.0f64..1000.0) {
            let max = min + span;
            let setting = Setting::float("f", min, max, None).unwrap();
            prop_assert!(setting.resolve_override(&json!(min)).is_ok());
            prop_assert!(setting.resolve_override(&json!(max)).is_ok());
            prop_assert!(setting.resolve_override(&json!(min - 1.0)).is_err());
            prop_assert!(setting.resolve_override(&json!(max + 1.0)).is_err());
        }

        /// A known option resolves to its index; an unknown one is rejected.
        #[test]
        fn selection_lookup(
            options in prop::collection::btree_set("[a-z]{1,8}", 1..8),
            pick in any::<prop::sample::Index>(),
            stranger in "[A-Z]{1,8}",
        ) {
            let options: Vec<String> = options.into_iter().collect();
            let setting = Setting::selection("s", options.clone(), None).unwrap();
            let index = pick.index(options.len());
            let resolved = setting.resolve_override(&json!(options[index])).unwrap();
            prop_assert_eq!(resolved.selected_index(), Some(index));
            let rejected = setting.resolve_override(&json!(stranger));
            prop_assert!(
                matches!(rejected, Err(RequestError::UnknownOption { .. })),
                "unknown option accepted"
            );
        }
    }
}
