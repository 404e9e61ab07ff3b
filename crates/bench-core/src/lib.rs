//! # bench-core — Foundational Types for Benchmark Negotiation
//!
//! A target publishes a Capabilities File describing the settings and
//! capabilities it supports; a test runner sends an Enable File asking for
//! a subset of them. This crate holds the value models both documents are
//! built from. It knows nothing about either document as a whole; that is
//! `bench-schema`'s job.
//!
//! ## Key Design Principles
//!
//! 1. **Sum types, not tags.** A [`Setting`] stores its kind and payload in
//!    one [`SettingValue`] enum, so a selection can never carry float bounds.
//!
//! 2. **Closed capability catalogue.** [`CapabilityId`] enumerates the 17
//!    slots. Each slot's value type and request constraint are exhaustive
//!    `match`es on that enum.
//!
//! 3. **Validated construction.** Everything read from a document passes
//!    the same checks: setting defaults against bounds and options,
//!    capability defaults against their slot constraint, and requests
//!    against both plus modifiability.
//!
//! 4. **Strict parsing.** [`document::parse_json`] rejects duplicate object
//!    keys instead of silently keeping the last one.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bench-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod capability;
pub mod document;
pub mod error;
pub mod setting;

// Re-export primary types for ergonomic imports.
pub use capability::{
    Capabilities, Capability, CapabilityConstraint, CapabilityId, CapabilityKind,
    CapabilityValue, CAPABILITY_COUNT,
};
pub use error::{BenchError, FieldError, RequestError, SchemaError, SourceError, UnknownName};
pub use setting::{Setting, SettingKind, SettingValue};
