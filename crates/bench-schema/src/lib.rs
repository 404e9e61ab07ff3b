//! # bench-schema — Capabilities and Enable File Negotiation
//!
//! Loads the schema a target publishes and validates run requests against
//! it, producing a fully resolved run configuration.
//!
//! ## Flow
//!
//! 1. [`CapabilitiesFile`] is loaded once per target and is immutable
//!    afterwards (`Send + Sync`, share it by reference).
//! 2. For each run, [`EnableFile`] is negotiated against that schema. The
//!    result is privately owned and deep-copied from the schema.
//!
//! ```no_run
//! use bench_schema::{CapabilitiesFile, EnableFile, EnableSource};
//!
//! # fn main() -> Result<(), bench_core::BenchError> {
//! let schema = CapabilitiesFile::from_path("capabilities.json".as_ref())?;
//! let source = EnableSource::from_env()?;
//! let run = EnableFile::from_source(&schema, &source, true)?;
//! let loops = run.capabilities().loops().unwrap_or(1);
//! # let _ = loops;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `bench-core` internally.
//! - No partial success: every loader either returns a fully valid value or
//!   the first error found.
//! - The only I/O is reading raw document text (see [`source`]).

pub mod capabilities;
pub mod enable;
pub mod source;

pub use capabilities::{Adaptation, CapabilitiesFile, Scene, DEFAULT_VERSION};
pub use enable::{EnableFile, EnableIntent};
pub use source::{DocumentFormat, EnableSource, ENABLE_JSON_VAR, ENABLE_PATH_VAR};
