//! # Document Acquisition
//!
//! Obtains raw document text. This is the only I/O the engine performs.
//!
//! The Enable File arrives through exactly one of two mutually exclusive
//! inputs: a file path ([`ENABLE_PATH_VAR`]) or an inline document
//! ([`ENABLE_JSON_VAR`]). Supplying both, or neither, is a
//! [`SourceError`].
//!
//! Documents on disk may be JSON or YAML; the format is chosen from the
//! file extension (`.yaml`/`.yml` for YAML, anything else for JSON). Both
//! formats go through the strict parser, so duplicate keys are rejected
//! either way.

use std::path::{Path, PathBuf};

use bench_core::document::{self, StrictValue};
use bench_core::SourceError;
use serde_json::Value;

/// Environment variable naming an Enable File on disk.
pub const ENABLE_PATH_VAR: &str = "BENCHMARKING_ENABLE_PATH";

/// Environment variable holding an inline Enable File document.
pub const ENABLE_JSON_VAR: &str = "BENCHMARKING_ENABLE_JSON";

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text.
    Json,
    /// YAML text.
    Yaml,
}

impl DocumentFormat {
    /// Choose a format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    /// Parse `text` into a JSON value, rejecting duplicate keys.
    ///
    /// The error is the parser's message; callers wrap it in the taxonomy
    /// variant for the document being read.
    pub fn parse(&self, text: &str) -> Result<Value, String> {
        match self {
            Self::Json => document::parse_json(text).map_err(|e| format!("invalid JSON: {e}")),
            Self::Yaml => serde_yaml::from_str::<StrictValue>(text)
                .map(StrictValue::into_inner)
                .map_err(|e| format!("invalid YAML: {e}")),
        }
    }
}

/// Read a file to a string.
///
/// The file handle is released on every exit path.
pub fn read_text(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Where the Enable File comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnableSource {
    /// Read the document from this file.
    Path(PathBuf),
    /// Use this document text as-is.
    Inline(String),
}

impl EnableSource {
    /// Pick the source from two optional inputs.
    ///
    /// # Errors
    ///
    /// `SourceError::Conflicting` if both are given and
    /// `SourceError::Missing` if neither is.
    pub fn from_parts(path: Option<PathBuf>, inline: Option<String>) -> Result<Self, SourceError> {
        match (path, inline) {
            (Some(_), Some(_)) => Err(SourceError::Conflicting),
            (Some(path), None) => Ok(Self::Path(path)),
            (None, Some(text)) => Ok(Self::Inline(text)),
            (None, None) => Err(SourceError::Missing),
        }
    }

    /// Pick the source from [`ENABLE_PATH_VAR`] and [`ENABLE_JSON_VAR`].
    ///
    /// # Errors
    ///
    /// Same as [`EnableSource::from_parts`].
    pub fn from_env() -> Result<Self, SourceError> {
        Self::from_parts(
            std::env::var_os(ENABLE_PATH_VAR).map(PathBuf::from),
            std::env::var(ENABLE_JSON_VAR).ok(),
        )
    }

    /// Format of the document behind this source. Inline documents are JSON.
    pub fn format(&self) -> DocumentFormat {
        match self {
            Self::Path(path) => DocumentFormat::from_path(path),
            Self::Inline(_) => DocumentFormat::Json,
        }
    }

    /// Acquire the document text.
    ///
    /// # Errors
    ///
    /// `SourceError::Read` if the file cannot be read.
    pub fn read(&self) -> Result<String, SourceError> {
        match self {
            Self::Path(path) => read_text(path),
            Self::Inline(text) => Ok(text.clone()),
        }
    }
}

impl std::fmt::Display for EnableSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => f.write_str("<inline>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn both_sources_conflict() {
        let err = EnableSource::from_parts(Some("a.json".into()), Some("{}".into())).unwrap_err();
        assert!(matches!(err, SourceError::Conflicting));
    }

    #[test]
    fn no_source_is_missing() {
        let err = EnableSource::from_parts(None, None).unwrap_err();
        assert!(matches!(err, SourceError::Missing));
    }

    #[test]
    fn inline_source_reads_text() {
        let source = EnableSource::from_parts(None, Some(r#"{"target":"x"}"#.into())).unwrap();
        assert_eq!(source.read().unwrap(), r#"{"target":"x"}"#);
        assert_eq!(source.format(), DocumentFormat::Json);
        assert_eq!(source.to_string(), "<inline>");
    }

    #[test]
    fn path_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enable.json");
        std::fs::write(&path, r#"{"target":"x"}"#).unwrap();
        let source = EnableSource::from_parts(Some(path), None).unwrap();
        assert_eq!(source.read().unwrap(), r#"{"target":"x"}"#);
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = EnableSource::Path(dir.path().join("missing.json"));
        let err = source.read().unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("caps.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("caps.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("caps.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("caps")), DocumentFormat::Json);
    }

    #[test]
    fn yaml_and_json_parse_to_same_value() {
        let from_yaml = DocumentFormat::Yaml
            .parse("name: demo\nscenes:\n  intro:\n    description: Opening\n")
            .unwrap();
        let from_json = DocumentFormat::Json
            .parse(r#"{"name":"demo","scenes":{"intro":{"description":"Opening"}}}"#)
            .unwrap();
        assert_eq!(from_yaml, from_json);
        assert_eq!(from_json, json!({"name": "demo", "scenes": {"intro": {"description": "Opening"}}}));
    }

    #[test]
    fn yaml_duplicate_keys_are_rejected() {
        assert!(DocumentFormat::Yaml.parse("name: a\nname: b\n").is_err());
    }
}
