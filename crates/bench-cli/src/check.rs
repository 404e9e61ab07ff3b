//! # Check Subcommand
//!
//! Loads a Capabilities File and prints a summary of its scenes, settings,
//! capabilities and adaptations. A file that fails to load is reported
//! through the error path and nothing is printed.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bench_schema::CapabilitiesFile;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the Capabilities File (JSON, or YAML by extension).
    pub capabilities: PathBuf,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let schema = CapabilitiesFile::from_path(&args.capabilities)
        .with_context(|| format!("failed to load {}", args.capabilities.display()))?;
    tracing::info!(target_name = schema.name(), "capabilities file is valid");
    print!("{}", summarize(&schema));
    Ok(0)
}

/// Render a human-readable summary of a schema.
pub fn summarize(schema: &CapabilitiesFile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "target:       {}", schema.name());
    if !schema.description().is_empty() {
        let _ = writeln!(out, "description:  {}", schema.description());
    }
    let _ = writeln!(out, "version:      {}", schema.version());

    let _ = writeln!(out, "scenes:       {}", schema.scenes().len());
    for scene in schema.scenes().values() {
        let _ = writeln!(out, "  {:<24} {}", scene.name, scene.description);
    }

    let _ = writeln!(out, "settings:     {}", schema.settings().len());
    for setting in schema.settings().values() {
        let default = setting
            .request_value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<24} {:<10} default {}",
            setting.name(),
            setting.kind().as_str(),
            default
        );
    }

    let _ = writeln!(out, "capabilities: {}", schema.capabilities().len());
    for (id, capability) in schema.capabilities().iter() {
        let access = if capability.modifiable { "modifiable" } else { "fixed" };
        let _ = writeln!(out, "  {:<24} {:<10} {}", id.as_str(), access, capability.value);
    }

    let _ = writeln!(out, "adaptations:  {}", schema.adaptations().len());
    for adaptation in schema.adaptations().values() {
        let _ = writeln!(out, "  {:<24} {}", adaptation.name, adaptation.description);
    }
    out
}
