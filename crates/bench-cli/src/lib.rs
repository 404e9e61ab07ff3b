//! # bench-cli — Benchmark Negotiation Command-Line Interface
//!
//! Provides the `bench` command for working with Capabilities Files and
//! Enable Files outside a running target.
//!
//! ## Subcommands
//!
//! - `bench check` — Load a Capabilities File and print what it declares.
//! - `bench resolve` — Negotiate an Enable File against a Capabilities File
//!   and emit the resolved run configuration as JSON.
//!
//! ```bash
//! bench check targets/vulkan_general.json
//! bench resolve targets/vulkan_general.json --enable runs/bench.json
//! BENCHMARKING_ENABLE_JSON='{"target":"vulkan_general"}' bench resolve targets/vulkan_general.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `bench-schema`; no negotiation logic lives here.

pub mod check;
pub mod resolve;
