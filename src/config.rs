//! Generator configuration module.
//!
//! Handles loading and validating `pephubgen.toml`. The file is optional:
//! stock defaults are used when it does not exist, and a file only needs the
//! keys it wants to override. Command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! data = "https://github.com/pepkit/data.pephub.git"  # Git URL or local path
//! out = "out"                     # Output directory for the static tree
//! info_file_name = "info"         # Name of every summary/detail file
//! sample_extension = ".json"      # Extension of per-sample files
//!
//! [serve]
//! host = "localhost"
//! port = 8000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default PEP data repository.
pub const PEPHUB_URL: &str = "https://github.com/pepkit/data.pephub.git";

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "pephubgen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `pephubgen.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Git URL or local path of the PEP data repository.
    pub data: String,
    /// Output directory for the generated tree.
    pub out: String,
    /// File name of namespace, project and sample summaries.
    pub info_file_name: String,
    /// Extension appended to per-sample file names (empty for none).
    pub sample_extension: String,
    /// Static file server settings.
    pub serve: ServeConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data: PEPHUB_URL.to_string(),
            out: "out".to_string(),
            info_file_name: "info".to_string(),
            sample_extension: ".json".to_string(),
            serve: ServeConfig::default(),
        }
    }
}

/// Static file server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
        }
    }
}

impl ServeConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GeneratorConfig {
    /// Validate that generated names stay inside the output tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let info = &self.info_file_name;
        if info.is_empty() {
            return Err(ConfigError::Validation(
                "info_file_name must not be empty".into(),
            ));
        }
        if has_separator(info) || info.starts_with('.') {
            return Err(ConfigError::Validation(
                "info_file_name must be a plain file name".into(),
            ));
        }
        if info == crate::generate::SAMPLES_DIR {
            return Err(ConfigError::Validation(
                "info_file_name must not collide with the samples directory".into(),
            ));
        }
        let ext = &self.sample_extension;
        if !ext.is_empty() && (!ext.starts_with('.') || has_separator(ext)) {
            return Err(ConfigError::Validation(
                "sample_extension must be empty or start with '.'".into(),
            ));
        }
        if self.serve.port == 0 {
            return Err(ConfigError::Validation(
                "serve.port must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn has_separator(name: &str) -> bool {
    name.contains('/') || name.contains('\\')
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GeneratorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GeneratorConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `pephubgen.toml` path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `pephubgen.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pephubgen Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# Git URL or local directory of the PEP data repository.
# A local directory is read in place; anything else is cloned.
data = "https://github.com/pepkit/data.pephub.git"

# Output directory for the generated static tree.
out = "out"

# File name used for every summary file:
#   <out>/<namespace>/info, <out>/<namespace>/<project>/info,
#   <out>/<namespace>/<project>/samples/info
info_file_name = "info"

# Extension of per-sample files (<sample_name><extension>). May be empty.
sample_extension = ".json"

# ---------------------------------------------------------------------------
# Static file server (`pephubgen serve`)
# ---------------------------------------------------------------------------
[serve]
host = "localhost"
port = 8000
"##
}
