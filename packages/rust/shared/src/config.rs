//! Application configuration for orderbridge.
//!
//! User config lives at `~/.orderbridge/orderbridge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "orderbridge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".orderbridge";

// ---------------------------------------------------------------------------
// Config structs (matching orderbridge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Blob store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Locations of the externally provisioned source documents.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Envelope key generation.
    #[serde(default)]
    pub keys: KeysConfig,
}

/// Which blob store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `<root>/<bucket>/<key>` on the local filesystem.
    #[default]
    Filesystem,
    /// Process-local map; contents are lost on exit.
    Memory,
    /// Amazon S3 or an S3-compatible service (requires the `s3` feature).
    S3,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the filesystem backend.
    #[serde(default = "default_root")]
    pub root: String,

    /// Destination bucket for transformed envelopes.
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Name of the env var that overrides `bucket_name` when set.
    #[serde(default = "default_bucket_env")]
    pub bucket_env: String,

    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_endpoint: Option<String>,

    /// AWS region override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_region: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_root(),
            bucket_name: default_bucket_name(),
            bucket_env: default_bucket_env(),
            s3_endpoint: None,
            s3_region: None,
        }
    }
}

fn default_root() -> String {
    "var/blobs".into()
}
fn default_bucket_name() -> String {
    "erp-crm-transformed-data".into()
}
fn default_bucket_env() -> String {
    "BUCKET_NAME".into()
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// JSON array of raw ERP orders.
    #[serde(default = "default_erp_data")]
    pub erp_data: String,

    /// CRM template document.
    #[serde(default = "default_crm_template")]
    pub crm_template: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            erp_data: default_erp_data(),
            crm_template: default_crm_template(),
        }
    }
}

fn default_erp_data() -> String {
    "erp_data.json".into()
}
fn default_crm_template() -> String {
    "crm_swagger.json".into()
}

/// `[keys]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Append a UUID v7 suffix to generated envelope keys.
    #[serde(default)]
    pub unique_keys: bool,
}

// ---------------------------------------------------------------------------
// Stage configs (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for the transform stage.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Path to the raw order batch.
    pub erp_data: PathBuf,
    /// Destination bucket.
    pub bucket: String,
    /// Whether envelope keys get a uniqueness suffix.
    pub unique_keys: bool,
}

impl From<&AppConfig> for TransformConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            erp_data: PathBuf::from(&config.sources.erp_data),
            bucket: resolve_bucket(&config.storage),
            unique_keys: config.keys.unique_keys,
        }
    }
}

/// Runtime configuration for the merge stage.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Path to the CRM template document.
    pub crm_template: PathBuf,
}

impl From<&AppConfig> for MergeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            crm_template: PathBuf::from(&config.sources.crm_template),
        }
    }
}

/// The destination bucket: the `bucket_env` variable if set and non-empty,
/// otherwise `bucket_name`.
pub fn resolve_bucket(storage: &StorageConfig) -> String {
    bucket_or_override(storage, std::env::var(&storage.bucket_env).ok())
}

fn bucket_or_override(storage: &StorageConfig, env_value: Option<String>) -> String {
    match env_value {
        Some(val) if !val.is_empty() => val,
        _ => storage.bucket_name.clone(),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.orderbridge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PipelineError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.orderbridge/orderbridge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PipelineError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PipelineError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PipelineError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
