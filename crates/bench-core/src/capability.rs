//! # Capability Model — Fixed Catalogue of Coarse Toggles
//!
//! A capability is a coarse, performance-affecting toggle that a target
//! may advertise. The catalogue is closed: exactly 17 slots exist, each
//! independently optional, each with a fixed value type and a fixed
//! request constraint.
//!
//! | Slot | Type | Constraint |
//! |------|------|------------|
//! | `disable_cpu_performance_adaptations` | bool | - |
//! | `disable_gpu_performance_adaptations` | bool | - |
//! | `disable_vendor_performance_adaptations` | bool | - |
//! | `disable_vendor_adaptations` | bool | - |
//! | `disable_os_adaptations` | bool | - |
//! | `disable_loading_screen` | bool | - |
//! | `non_interactive` | bool | - |
//! | `fixed_framerate` | float | `>= 0` |
//! | `visual_settings` | float | `1..=100` |
//! | `loops` | integer | `>= 0` |
//! | `loop_time` | float | `>= 0` |
//! | `gpu_delay_reuse` | integer | `>= 1` |
//! | `gpu_no_coherent` | bool | - |
//! | `gpu_frame_deterministic` | bool | - |
//! | `gpu_fully_deterministic` | bool | - |
//! | `frameless` | bool | - |
//! | `file_output` | bool | - |
//!
//! Every `match` on [`CapabilityId`] is exhaustive, so adding a slot forces
//! its type and constraint to be declared. Slot names outside the
//! catalogue are rejected when parsed.
//!
//! ## Negotiation
//!
//! A schema declares each slot with a `default` and a `modifiable` flag.
//! A request may override a slot only if the schema declared it with
//! `modifiable = true`; the requested value must satisfy the slot
//! constraint. See [`Capabilities::negotiate`].

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::document::{self, join};
use crate::error::{FieldError, RequestError, SchemaError, UnknownName};

/// Identifier of one of the 17 capability slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityId {
    /// Disable CPU-side performance adaptations.
    DisableCpuPerformanceAdaptations,
    /// Disable GPU-side performance adaptations.
    DisableGpuPerformanceAdaptations,
    /// Disable vendor-specific performance adaptations.
    DisableVendorPerformanceAdaptations,
    /// Disable all vendor-specific adaptations.
    DisableVendorAdaptations,
    /// Disable OS-specific adaptations.
    DisableOsAdaptations,
    /// Skip the loading screen.
    DisableLoadingScreen,
    /// Run without user interaction.
    NonInteractive,
    /// Fixed framerate in frames per second.
    FixedFramerate,
    /// Global visual settings level, 1 to 100.
    VisualSettings,
    /// Number of loops to run.
    Loops,
    /// Duration of one loop in seconds.
    LoopTime,
    /// Number of frames before a GPU resource may be reused.
    GpuDelayReuse,
    /// Avoid coherent GPU memory.
    GpuNoCoherent,
    /// Deterministic output per frame.
    GpuFrameDeterministic,
    /// Fully deterministic GPU execution.
    GpuFullyDeterministic,
    /// Run without presenting frames.
    Frameless,
    /// Write output to files.
    FileOutput,
}

/// Total number of capability slots.
pub const CAPABILITY_COUNT: usize = 17;

impl CapabilityId {
    /// Returns all 17 slots in catalogue order.
    pub fn all() -> &'static [CapabilityId] {
        &[
            Self::DisableCpuPerformanceAdaptations,
            Self::DisableGpuPerformanceAdaptations,
            Self::DisableVendorPerformanceAdaptations,
            Self::DisableVendorAdaptations,
            Self::DisableOsAdaptations,
            Self::DisableLoadingScreen,
            Self::NonInteractive,
            Self::FixedFramerate,
            Self::VisualSettings,
            Self::Loops,
            Self::LoopTime,
            Self::GpuDelayReuse,
            Self::GpuNoCoherent,
            Self::GpuFrameDeterministic,
            Self::GpuFullyDeterministic,
            Self::Frameless,
            Self::FileOutput,
        ]
    }

    /// Returns the slot name used in both document kinds.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DisableCpuPerformanceAdaptations => "disable_cpu_performance_adaptations",
            Self::DisableGpuPerformanceAdaptations => "disable_gpu_performance_adaptations",
            Self::DisableVendorPerformanceAdaptations => "disable_vendor_performance_adaptations",
            Self::DisableVendorAdaptations => "disable_vendor_adaptations",
            Self::DisableOsAdaptations => "disable_os_adaptations",
            Self::DisableLoadingScreen => "disable_loading_screen",
            Self::NonInteractive => "non_interactive",
            Self::FixedFramerate => "fixed_framerate",
            Self::VisualSettings => "visual_settings",
            Self::Loops => "loops",
            Self::LoopTime => "loop_time",
            Self::GpuDelayReuse => "gpu_delay_reuse",
            Self::GpuNoCoherent => "gpu_no_coherent",
            Self::GpuFrameDeterministic => "gpu_frame_deterministic",
            Self::GpuFullyDeterministic => "gpu_fully_deterministic",
            Self::Frameless => "frameless",
            Self::FileOutput => "file_output",
        }
    }

    /// Value type carried by this slot.
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::FixedFramerate | Self::VisualSettings | Self::LoopTime => CapabilityKind::Float,
            Self::Loops | Self::GpuDelayReuse => CapabilityKind::Integer,
            Self::DisableCpuPerformanceAdaptations
            | Self::DisableGpuPerformanceAdaptations
            | Self::DisableVendorPerformanceAdaptations
            | Self::DisableVendorAdaptations
            | Self::DisableOsAdaptations
            | Self::DisableLoadingScreen
            | Self::NonInteractive
            | Self::GpuNoCoherent
            | Self::GpuFrameDeterministic
            | Self::GpuFullyDeterministic
            | Self::Frameless
            | Self::FileOutput => CapabilityKind::Bool,
        }
    }

    /// Constraint a requested value must satisfy.
    pub fn constraint(&self) -> CapabilityConstraint {
        match self {
            Self::FixedFramerate | Self::Loops | Self::LoopTime => CapabilityConstraint::AtLeast(0.0),
            Self::VisualSettings => CapabilityConstraint::Between(1.0, 100.0),
            Self::GpuDelayReuse => CapabilityConstraint::AtLeast(1.0),
            Self::DisableCpuPerformanceAdaptations
            | Self::DisableGpuPerformanceAdaptations
            | Self::DisableVendorPerformanceAdaptations
            | Self::DisableVendorAdaptations
            | Self::DisableOsAdaptations
            | Self::DisableLoadingScreen
            | Self::NonInteractive
            | Self::GpuNoCoherent
            | Self::GpuFrameDeterministic
            | Self::GpuFullyDeterministic
            | Self::Frameless
            | Self::FileOutput => CapabilityConstraint::Unconstrained,
        }
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityId {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownName {
                vocabulary: "capability",
                name: s.to_string(),
            })
    }
}

/// Value type of a capability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// `true`/`false`.
    Bool,
    /// 32-bit signed integer.
    Integer,
    /// Floating point number.
    Float,
}

/// A capability value, tagged with its type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapabilityValue {
    /// Boolean slot value.
    Bool(bool),
    /// Integer slot value.
    Integer(i32),
    /// Float slot value.
    Float(f64),
}

impl CapabilityValue {
    /// Parse `value` as the given kind.
    pub fn parse(kind: CapabilityKind, value: &Value, field: &str) -> Result<Self, FieldError> {
        match kind {
            CapabilityKind::Bool => document::expect_bool(value, field).map(Self::Bool),
            CapabilityKind::Integer => document::expect_i32(value, field).map(Self::Integer),
            CapabilityKind::Float => document::expect_f64(value, field).map(Self::Float),
        }
    }

    /// Value type of this value.
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Bool(_) => CapabilityKind::Bool,
            Self::Integer(_) => CapabilityKind::Integer,
            Self::Float(_) => CapabilityKind::Float,
        }
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(n) => json!(n),
            Self::Float(x) => json!(x),
        }
    }
}

impl std::fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Rule a requested capability value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapabilityConstraint {
    /// Any value of the right type.
    Unconstrained,
    /// `value >= bound`.
    AtLeast(f64),
    /// `low <= value <= high`.
    Between(f64, f64),
}

impl CapabilityConstraint {
    /// Returns true if `value` satisfies this constraint.
    ///
    /// Boolean values always do.
    pub fn allows(&self, value: &CapabilityValue) -> bool {
        let n = match value {
            CapabilityValue::Bool(_) => return true,
            CapabilityValue::Integer(n) => f64::from(*n),
            CapabilityValue::Float(x) => *x,
        };
        match self {
            Self::Unconstrained => true,
            Self::AtLeast(bound) => n >= *bound,
            Self::Between(low, high) => (*low..=*high).contains(&n),
        }
    }
}

impl std::fmt::Display for CapabilityConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("none"),
            Self::AtLeast(bound) => write!(f, ">= {bound}"),
            Self::Between(low, high) => write!(f, "{low}..={high}"),
        }
    }
}

/// A capability value together with its modifiability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability<T> {
    /// Current value.
    pub value: T,
    /// Whether an Enable File may override the value.
    pub modifiable: bool,
}

/// The catalogue: each slot is either absent or holds a [`Capability`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    slots: BTreeMap<CapabilityId, Capability<CapabilityValue>>,
}

impl Capabilities {
    /// Empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `capabilities` block of a Capabilities File.
    ///
    /// Every named slot needs both `default` (of the slot's type) and
    /// `modifiable`. Slots not mentioned stay absent.
    ///
    /// # Errors
    ///
    /// `SchemaError::UnknownCapability` for a name outside the catalogue,
    /// `SchemaError::CapabilityMissingField` for a missing key,
    /// `SchemaError::InvalidType` for a mistyped one and
    /// `SchemaError::DefaultViolatesConstraint` for a default the slot's
    /// request constraint would reject.
    pub fn from_schema_block(block: &Map<String, Value>) -> Result<Self, SchemaError> {
        let mut capabilities = Self::new();
        for (name, entry) in block {
            let id: CapabilityId = name
                .parse()
                .map_err(|_| SchemaError::UnknownCapability { name: name.clone() })?;
            let path = join("capabilities", name);
            let entry = document::as_object(entry, &path)?;

            let default = entry.get("default").ok_or_else(|| SchemaError::CapabilityMissingField {
                capability: name.clone(),
                field: "default",
            })?;
            let modifiable =
                entry.get("modifiable").ok_or_else(|| SchemaError::CapabilityMissingField {
                    capability: name.clone(),
                    field: "modifiable",
                })?;

            let value = CapabilityValue::parse(id.kind(), default, &join(&path, "default"))?;
            let constraint = id.constraint();
            if !constraint.allows(&value) {
                return Err(SchemaError::DefaultViolatesConstraint {
                    capability: name.clone(),
                    value: value.to_string(),
                    constraint,
                });
            }
            let modifiable = document::expect_bool(modifiable, &join(&path, "modifiable"))?;
            capabilities.insert(id, Capability { value, modifiable });
        }
        Ok(capabilities)
    }

    /// Negotiate an Enable File `capabilities` block against a schema.
    ///
    /// For every slot named in `request` the schema must have declared it
    /// with `modifiable = true`; the schema's flag is kept and the value is
    /// replaced by the requested one after the slot constraint is checked.
    /// A request entry may be the raw value or an object `{"default": v}`.
    ///
    /// With `fill_defaults`, slots the schema declared but the request did
    /// not name are copied unchanged. Without it they stay absent.
    ///
    /// # Errors
    ///
    /// `RequestError::UnknownCapability`, `UndeclaredCapability`,
    /// `NonModifiable`, `InvalidType` or `ConstraintViolation`.
    pub fn negotiate(
        schema: &Capabilities,
        request: Option<&Map<String, Value>>,
        fill_defaults: bool,
    ) -> Result<Self, RequestError> {
        let mut resolved = Self::new();

        for (name, raw) in request.into_iter().flatten() {
            let id: CapabilityId = name
                .parse()
                .map_err(|_| RequestError::UnknownCapability { name: name.clone() })?;
            let declared = schema.get(id).ok_or_else(|| RequestError::UndeclaredCapability {
                capability: name.clone(),
            })?;
            if !declared.modifiable {
                return Err(RequestError::NonModifiable { capability: name.clone() });
            }

            let path = join("capabilities", name);
            let (raw, path) = match raw {
                Value::Object(entry) => (
                    document::required(entry, "default", &path)?,
                    join(&path, "default"),
                ),
                other => (other, path),
            };
            let value = CapabilityValue::parse(id.kind(), raw, &path)?;

            let constraint = id.constraint();
            if !constraint.allows(&value) {
                return Err(RequestError::ConstraintViolation {
                    capability: name.clone(),
                    value: value.to_string(),
                    constraint,
                });
            }

            resolved.insert(
                id,
                Capability {
                    value,
                    modifiable: declared.modifiable,
                },
            );
        }

        if fill_defaults {
            for (id, capability) in schema.iter() {
                resolved.slots.entry(id).or_insert(*capability);
            }
        }

        Ok(resolved)
    }

    /// Store a slot, replacing any previous entry.
    pub fn insert(&mut self, id: CapabilityId, capability: Capability<CapabilityValue>) {
        self.slots.insert(id, capability);
    }

    /// Look up a slot.
    pub fn get(&self, id: CapabilityId) -> Option<&Capability<CapabilityValue>> {
        self.slots.get(&id)
    }

    /// Returns true if the slot is present.
    pub fn contains(&self, id: CapabilityId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of present slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no slot is present.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over present slots in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = (CapabilityId, &Capability<CapabilityValue>)> {
        self.slots.iter().map(|(id, c)| (*id, c))
    }

    /// Typed lookup of a boolean slot.
    pub fn flag(&self, id: CapabilityId) -> Option<Capability<bool>> {
        match self.get(id)? {
            Capability { value: CapabilityValue::Bool(b), modifiable } => Some(Capability {
                value: *b,
                modifiable: *modifiable,
            }),
            _ => None,
        }
    }

    /// Typed lookup of an integer slot.
    pub fn integer(&self, id: CapabilityId) -> Option<Capability<i32>> {
        match self.get(id)? {
            Capability { value: CapabilityValue::Integer(n), modifiable } => Some(Capability {
                value: *n,
                modifiable: *modifiable,
            }),
            _ => None,
        }
    }

    /// Typed lookup of a float slot.
    pub fn float(&self, id: CapabilityId) -> Option<Capability<f64>> {
        match self.get(id)? {
            Capability { value: CapabilityValue::Float(x), modifiable } => Some(Capability {
                value: *x,
                modifiable: *modifiable,
            }),
            _ => None,
        }
    }

    /// `fixed_framerate` value, if present.
    pub fn fixed_framerate(&self) -> Option<f64> {
        self.float(CapabilityId::FixedFramerate).map(|c| c.value)
    }

    /// `visual_settings` value, if present.
    pub fn visual_settings(&self) -> Option<f64> {
        self.float(CapabilityId::VisualSettings).map(|c| c.value)
    }

    /// `loops` value, if present.
    pub fn loops(&self) -> Option<i32> {
        self.integer(CapabilityId::Loops).map(|c| c.value)
    }

    /// `loop_time` value, if present.
    pub fn loop_time(&self) -> Option<f64> {
        self.float(CapabilityId::LoopTime).map(|c| c.value)
    }

    /// `gpu_delay_reuse` value, if present.
    pub fn gpu_delay_reuse(&self) -> Option<i32> {
        self.integer(CapabilityId::GpuDelayReuse).map(|c| c.value)
    }

    /// Render as a Capabilities File `capabilities` block.
    pub fn to_schema_block(&self) -> Map<String, Value> {
        self.iter()
            .map(|(id, c)| {
                (
                    id.as_str().to_string(),
                    json!({"default": c.value.to_json(), "modifiable": c.modifiable}),
                )
            })
            .collect()
    }

    /// Render as an Enable File `capabilities` block (raw values).
    ///
    /// Non-modifiable slots are left out: a request may never name them, and
    /// they can only have been copied from schema defaults, which
    /// `fill_defaults` restores.
    pub fn to_request_block(&self) -> Map<String, Value> {
        self.iter()
            .filter(|(_, c)| c.modifiable)
            .map(|(id, c)| (id.as_str().to_string(), c.value.to_json()))
            .collect()
    }
}
