use anyhow::{Context, Result, bail};
use schemars::{Schema, schema_for};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::models::Config;
use super::validator::SchemaValidator;

/// Installed location checked before any development-local path.
pub const INSTALLED_CONFIG_PATH: &str = "/opt/desk-controller/config.json";

/// Ordered list of places a configuration may live.
///
/// Passed explicitly into the pipeline so callers (and tests) decide where to look;
/// nothing here consults process-wide state except the filesystem itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocator {
    candidates: Vec<PathBuf>,
}

impl ConfigLocator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// The installed path first, then `config.json` in the working directory.
    pub fn standard() -> Self {
        Self::new(vec![
            PathBuf::from(INSTALLED_CONFIG_PATH),
            PathBuf::from("config.json"),
        ])
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists. When none does, the last candidate is returned so the
    /// validator reports it as missing.
    pub fn locate(&self) -> Option<PathBuf> {
        let found = self
            .candidates
            .iter()
            .find(|p| {
                trace!(target: "desk_controller::loader", path = %p.display(), "probing config path");
                p.is_file()
            })
            .or_else(|| self.candidates.last())
            .cloned();
        if let Some(path) = &found {
            debug!(target: "desk_controller::loader", path = %path.display(), "selected config path");
        }
        found
    }
}

impl Default for ConfigLocator {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decode a document that already passed validation into typed models.
pub fn decode(document: Value) -> serde_json::Result<Config> {
    serde_json::from_value(document)
}

/// Validate and decode a JSON string, failing with the full report if it is invalid.
///
/// Relative icon paths in the warnings resolve against `base_dir`.
pub fn load_from_str(s: &str, base_dir: &Path) -> Result<Config> {
    let validation = SchemaValidator::default().validate_str(s, base_dir);
    finish(validation.document, &validation.diagnostics)
}

/// Validate and decode a configuration file.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    let validation = SchemaValidator::default().validate_file(path_ref);
    let cfg = finish(validation.document, &validation.diagnostics)
        .with_context(|| format!("Failed to load config file {}", path_ref.display()))?;
    debug!("Loaded config from {}", path_ref.display());
    Ok(cfg)
}

fn finish(document: Option<Value>, diagnostics: &super::Diagnostics) -> Result<Config> {
    if !diagnostics.is_ok() {
        bail!("Invalid configuration:\n{}", diagnostics.report());
    }
    let Some(document) = document else {
        bail!("Invalid configuration: no document");
    };
    decode(document).context("Failed to decode validated configuration")
}

/// Generate the JSON Schema for the Config model (for external validation or tooling).
pub fn generate_schema() -> Schema {
    schema_for!(Config)
}

/// Write the JSON Schema for the Config model to any writer (pretty-printed).
pub fn write_schema_to_writer<W: Write>(mut writer: W) -> Result<()> {
    let schema = generate_schema();
    let json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    writer
        .write_all(json.as_bytes())
        .context("Failed to write schema to writer")?;
    Ok(())
}
