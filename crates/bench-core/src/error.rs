//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error taxonomy for benchmark negotiation. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - [`SchemaError`] — the Capabilities File is malformed.
//! - [`RequestError`] — the Enable File violates the advertised schema.
//! - [`SourceError`] — the raw document could not be acquired.
//!
//! Every message names the document, the field path (for example
//! `settings.quality` or `capabilities.loops`) and the rule that failed.
//! Nothing here is recoverable: any error means the run cannot start.

use thiserror::Error;

use crate::capability::CapabilityConstraint;

/// Top-level error type for benchmark negotiation.
#[derive(Error, Debug)]
pub enum BenchError {
    /// The Capabilities File is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The Enable File does not conform to the Capabilities File.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A raw document could not be acquired.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Malformed Capabilities File.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The document text could not be parsed.
    #[error("capabilities file: invalid document: {0}")]
    Syntax(String),

    /// A required field is absent.
    #[error("capabilities file: missing required field `{field}`")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// A field holds a JSON value of the wrong type.
    #[error("capabilities file: field `{field}` must be {expected}")]
    InvalidType {
        /// Dotted path of the offending field.
        field: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// Two entries of one section share a name.
    #[error("capabilities file: duplicate {section} entry `{name}`")]
    DuplicateEntry {
        /// Section holding the duplicate (`scenes`, `settings`, `adaptations`).
        section: &'static str,
        /// The repeated name.
        name: String,
    },

    /// The `type` discriminant of a setting is not recognised.
    #[error("capabilities file: setting `{setting}` has unknown type {kind:?}")]
    UnknownSettingType {
        /// Setting name.
        setting: String,
        /// The unrecognised type string.
        kind: String,
    },

    /// A selection setting lists the same option twice.
    #[error("capabilities file: setting `{setting}` lists option {option:?} more than once")]
    DuplicateOption {
        /// Setting name.
        setting: String,
        /// The repeated option.
        option: String,
    },

    /// A selection default is not one of the declared options.
    #[error("capabilities file: default {option:?} of setting `{setting}` is not one of its options")]
    UnknownDefaultOption {
        /// Setting name.
        setting: String,
        /// The default that was not found.
        option: String,
    },

    /// A numeric setting declares `min > max`.
    #[error("capabilities file: setting `{setting}` has min {min} greater than max {max}")]
    InvertedRange {
        /// Setting name.
        setting: String,
        /// Declared lower bound.
        min: String,
        /// Declared upper bound.
        max: String,
    },

    /// A numeric default lies outside the setting's own bounds.
    #[error("capabilities file: default {value} of setting `{setting}` is outside [{min}, {max}]")]
    DefaultOutOfRange {
        /// Setting name.
        setting: String,
        /// The offending default.
        value: String,
        /// Declared lower bound.
        min: String,
        /// Declared upper bound.
        max: String,
    },

    /// The `capabilities` block names a slot outside the fixed catalogue.
    #[error("capabilities file: unknown capability `{name}`")]
    UnknownCapability {
        /// The unrecognised slot name.
        name: String,
    },

    /// A declared capability lacks `default` or `modifiable`.
    #[error("capabilities file: capability `{capability}` is missing `{field}`")]
    CapabilityMissingField {
        /// Capability slot name.
        capability: String,
        /// The absent key.
        field: &'static str,
    },

    /// A capability default falls outside its slot's constraint.
    #[error("capabilities file: capability `{capability}` default {value} violates {constraint}")]
    DefaultViolatesConstraint {
        /// Capability slot name.
        capability: String,
        /// The declared default, rendered.
        value: String,
        /// The slot rule it breaks.
        constraint: CapabilityConstraint,
    },
}

/// Enable File that violates the advertised schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// The document text could not be parsed.
    #[error("enable file: invalid document: {0}")]
    Syntax(String),

    /// A required field is absent.
    #[error("enable file: missing required field `{field}`")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// A field holds a JSON value of the wrong type.
    #[error("enable file: field `{field}` must be {expected}")]
    InvalidType {
        /// Dotted path of the offending field.
        field: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// The request addresses a different target than the schema describes.
    #[error("enable file: target {found:?} does not match capabilities file {expected:?}")]
    TargetMismatch {
        /// Name declared by the Capabilities File.
        expected: String,
        /// Target named by the Enable File.
        found: String,
    },

    /// A requested scene is not declared by the schema.
    #[error("enable file: unknown scene `{scene}`")]
    UnknownScene {
        /// Scene name.
        scene: String,
    },

    /// A scene is requested more than once.
    #[error("enable file: scene `{scene}` is requested more than once")]
    DuplicateScene {
        /// Scene name.
        scene: String,
    },

    /// The intent tag is not one of the fixed values.
    #[error("enable file: unknown intent {intent:?}")]
    UnknownIntent {
        /// The unrecognised intent string.
        intent: String,
    },

    /// A setting override names a setting the schema does not declare.
    #[error("enable file: unknown setting `{setting}`")]
    UnknownSetting {
        /// Setting name.
        setting: String,
    },

    /// A selection override names an option the setting does not offer.
    #[error("enable file: setting `{setting}` has no option {option:?}")]
    UnknownOption {
        /// Setting name.
        setting: String,
        /// The requested option.
        option: String,
    },

    /// A numeric setting override is outside the declared bounds.
    #[error("enable file: value {value} of setting `{setting}` is outside [{min}, {max}]")]
    OutOfRange {
        /// Setting name.
        setting: String,
        /// The requested value.
        value: String,
        /// Declared lower bound.
        min: String,
        /// Declared upper bound.
        max: String,
    },

    /// A capability slot name outside the fixed catalogue.
    #[error("enable file: unknown capability `{name}`")]
    UnknownCapability {
        /// The unrecognised slot name.
        name: String,
    },

    /// The request overrides a capability the schema never declared.
    #[error("enable file: capability `{capability}` is not declared by the capabilities file")]
    UndeclaredCapability {
        /// Capability slot name.
        capability: String,
    },

    /// The request overrides a capability declared with `modifiable = false`.
    #[error("enable file: attempt to override non-modifiable capability `{capability}`")]
    NonModifiable {
        /// Capability slot name.
        capability: String,
    },

    /// A capability value breaks the slot's constraint.
    #[error("enable file: capability `{capability}` value {value} violates constraint {constraint}")]
    ConstraintViolation {
        /// Capability slot name.
        capability: String,
        /// The requested value.
        value: String,
        /// The constraint that failed.
        constraint: CapabilityConstraint,
    },

    /// An adaptation is not declared by the schema.
    #[error("enable file: unknown adaptation `{adaptation}`")]
    UnknownAdaptation {
        /// Adaptation name.
        adaptation: String,
    },
}

/// A raw document could not be acquired.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Both a path and an inline document were supplied.
    #[error("enable file source: both a path and an inline document were supplied")]
    Conflicting,

    /// Neither a path nor an inline document was supplied.
    #[error("enable file source: neither a path nor an inline document was supplied")]
    Missing,

    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// A document field that is absent or of the wrong JSON type.
///
/// Produced by the helpers in [`crate::document`]; converts into the
/// matching variant of [`SchemaError`] or [`RequestError`] depending on
/// which document is being read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Required field is absent.
    #[error("missing required field `{field}`")]
    Missing {
        /// Dotted field path.
        field: String,
    },

    /// Field has the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    InvalidType {
        /// Dotted field path.
        field: String,
        /// Description of the expected type.
        expected: &'static str,
    },
}

impl From<FieldError> for SchemaError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::Missing { field } => Self::MissingField { field },
            FieldError::InvalidType { field, expected } => Self::InvalidType { field, expected },
        }
    }
}

impl From<FieldError> for RequestError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::Missing { field } => Self::MissingField { field },
            FieldError::InvalidType { field, expected } => Self::InvalidType { field, expected },
        }
    }
}

/// A fixed-vocabulary name could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {vocabulary} {name:?}")]
pub struct UnknownName {
    /// Which vocabulary was consulted (`setting type`, `capability`, `intent`).
    pub vocabulary: &'static str,
    /// The rejected name.
    pub name: String,
}
