//! # Resolve Subcommand
//!
//! Negotiates an Enable File against a Capabilities File and writes the
//! resolved run configuration as pretty-printed JSON, to stdout or to
//! `--out`.
//!
//! The output is itself an Enable File: feeding it back through `resolve`
//! with the same `--no-defaults` choice reproduces it. Non-modifiable
//! capabilities are omitted since a request may not name them; without
//! `--no-defaults` they are restored from the schema.
//!
//! The Enable File comes from `--enable <PATH>` or `--enable-json <TEXT>`,
//! which fall back to `BENCHMARKING_ENABLE_PATH` and
//! `BENCHMARKING_ENABLE_JSON`. Exactly one must be present.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use bench_schema::{CapabilitiesFile, EnableFile, EnableSource, ENABLE_JSON_VAR, ENABLE_PATH_VAR};

/// Arguments for the resolve subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the Capabilities File (JSON, or YAML by extension).
    pub capabilities: PathBuf,

    /// Path to the Enable File.
    #[arg(long, env = ENABLE_PATH_VAR)]
    pub enable: Option<PathBuf>,

    /// Inline Enable File JSON.
    #[arg(long, env = ENABLE_JSON_VAR)]
    pub enable_json: Option<String>,

    /// Only report what the Enable File sets; do not back-fill schema defaults.
    #[arg(long)]
    pub no_defaults: bool,

    /// Write the resolved configuration here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs) -> Result<u8> {
    let resolved = resolve_document(args)?;
    let text = serde_json::to_string_pretty(&resolved)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote resolved configuration");
        }
        None => println!("{text}"),
    }
    Ok(0)
}

/// Load both documents and negotiate, returning the resolved configuration.
pub fn resolve_document(args: &ResolveArgs) -> Result<Value> {
    let schema = CapabilitiesFile::from_path(&args.capabilities)
        .with_context(|| format!("failed to load {}", args.capabilities.display()))?;
    let source = EnableSource::from_parts(args.enable.clone(), args.enable_json.clone())?;
    let enable = EnableFile::from_source(&schema, &source, !args.no_defaults)
        .with_context(|| format!("failed to negotiate enable file {source}"))?;

    tracing::info!(
        target_name = enable.target(),
        intent = %enable.intent(),
        scenes = enable.scenes().len(),
        settings = enable.settings().len(),
        capabilities = enable.capabilities().len(),
        "enable file resolved"
    );
    Ok(enable.to_document())
}
