//!
//! Handles application configuration: store endpoints, timeouts, collection
//! layout, and caption-fetch settings.
//! Configuration is typically loaded from a `config.toml` file.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use std::fs;

use crate::constants::{
    DEFAULT_OBJECT_COLLECTION, DEFAULT_RENDER_COLLECTION, DEFAULT_VECTOR_DIMENSION,
    DEFAULT_VECTOR_NAME,
};
use crate::error::RenderStoreError;

const APP_NAME: &str = "renderstore";
const CONFIG_FILE_NAME: &str = "config.toml";
const CAPTIONS_FILE_NAME: &str = "captions.csv";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Timeouts applied to store traffic, in seconds.
pub struct TimeoutConfig {
    /// Bound on connecting and on the liveness probe.
    #[serde(default = "default_init_secs")]
    pub init_secs: u64,
    /// Bound on read operations (counts, gets, searches).
    #[serde(default = "default_query_secs")]
    pub query_secs: u64,
    /// Bound on write operations (upserts, deletes).
    #[serde(default = "default_insert_secs")]
    pub insert_secs: u64,
}

impl TimeoutConfig {
    /// Initialization timeout as a [`Duration`].
    pub fn init(&self) -> Duration {
        Duration::from_secs(self.init_secs)
    }

    /// Query timeout as a [`Duration`].
    pub fn query(&self) -> Duration {
        Duration::from_secs(self.query_secs)
    }

    /// Insert timeout as a [`Duration`].
    pub fn insert(&self) -> Duration {
        Duration::from_secs(self.insert_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            init_secs: default_init_secs(),
            query_secs: default_query_secs(),
            insert_secs: default_insert_secs(),
        }
    }
}

fn default_init_secs() -> u64 {
    2
}

fn default_query_secs() -> u64 {
    45
}

fn default_insert_secs() -> u64 {
    120
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Names and vector layout of the collections the tool works against.
pub struct CollectionConfig {
    /// Collection holding one point per render image.
    #[serde(default = "default_render_collection")]
    pub renders: String,
    /// Collection holding one aggregated point per object.
    #[serde(default = "default_object_collection")]
    pub objects: String,
    /// Name of the vector slot points store their embedding under.
    #[serde(default = "default_vector_name")]
    pub vector_name: String,
    /// Dimension of the stored embeddings.
    #[serde(default = "default_vector_dimension")]
    pub vector_dimension: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            renders: default_render_collection(),
            objects: default_object_collection(),
            vector_name: default_vector_name(),
            vector_dimension: default_vector_dimension(),
        }
    }
}

fn default_render_collection() -> String {
    DEFAULT_RENDER_COLLECTION.to_string()
}

fn default_object_collection() -> String {
    DEFAULT_OBJECT_COLLECTION.to_string()
}

fn default_vector_name() -> String {
    DEFAULT_VECTOR_NAME.to_string()
}

fn default_vector_dimension() -> u64 {
    DEFAULT_VECTOR_DIMENSION
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Configuration for performance-related settings
pub struct PerformanceConfig {
    /// Batch size for Qdrant upserts
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    crate::constants::BATCH_SIZE
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
/// Where the captions CSV comes from and where it is kept.
pub struct CaptionConfig {
    /// Download URL for the captions CSV. Unset means `fetch-captions`
    /// requires `--url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local path of the captions file. Defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Top-level application configuration.
pub struct AppConfig {
    /// Host the store listens on (shared by both endpoints).
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP port, used for the liveness probe.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// gRPC port, used for all store calls.
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
    /// Whether to use TLS schemes on both endpoints.
    #[serde(default)]
    pub secure: bool,
    /// Timeout settings.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Collection layout.
    #[serde(default)]
    pub collections: CollectionConfig,
    /// Performance settings.
    #[serde(default)]
    pub performance: PerformanceConfig,
    /// Caption-fetch settings.
    #[serde(default)]
    pub captions: CaptionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            grpc_port: default_grpc_port(),
            secure: false,
            timeouts: TimeoutConfig::default(),
            collections: CollectionConfig::default(),
            performance: PerformanceConfig::default(),
            captions: CaptionConfig::default(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_http_port() -> u16 {
    6333
}

fn default_grpc_port() -> u16 {
    6334
}

impl AppConfig {
    fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// URL of the HTTP endpoint (liveness probe).
    pub fn http_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.http_port)
    }

    /// URL of the gRPC endpoint (store calls).
    pub fn grpc_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.grpc_port)
    }
}

/// Returns the default path to the configuration file.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not find config directory"))?
        .join(APP_NAME);
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Gets the configuration path by checking ENV, override, or default XDG.
pub fn get_config_path_or_default(override_path: Option<&PathBuf>) -> Result<PathBuf> {
    // Check for test environment variable first
    if let Ok(test_path_str) = std::env::var("RENDERSTORE_TEST_CONFIG_PATH") {
        log::debug!("Using test config path from ENV: {}", test_path_str);
        return Ok(PathBuf::from(test_path_str));
    }
    // Then check for direct override path
    if let Some(path) = override_path {
        log::debug!("Using override config path: {}", path.display());
        return Ok(path.clone());
    }
    // Otherwise, use default XDG path
    get_config_path()
}

/// Resolves the captions file path, deriving the default under the user data
/// directory when the config leaves it unset. Creates the parent directory.
pub fn get_captions_path(config: &AppConfig) -> Result<PathBuf> {
    let path = match &config.captions.file {
        Some(p) => p.clone(),
        None => {
            let base_dirs = dirs::data_dir().ok_or_else(|| {
                RenderStoreError::ConfigurationError(
                    "Could not determine user data directory".to_string(),
                )
            })?;
            base_dirs.join(APP_NAME).join(CAPTIONS_FILE_NAME)
        }
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    Ok(path)
}

/// Loads the application configuration from ENV, a specified path, or the
/// default location.
///
/// If the configuration file or directory does not exist at the target path,
/// it creates them with default settings.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(override_path: Option<&PathBuf>) -> Result<AppConfig> {
    let config_file_path = get_config_path_or_default(override_path)?;
    log::debug!("Attempting to load config from: {}", config_file_path.display());

    let app_config_dir = config_file_path
        .parent()
        .ok_or_else(|| anyhow!("Invalid config file path provided or determined"))?;

    if !config_file_path.exists() {
        log::info!(
            "Config file not found at '{}'. Creating default.",
            config_file_path.display()
        );
        fs::create_dir_all(app_config_dir).with_context(|| {
            format!("Failed to create config directory: {}", app_config_dir.display())
        })?;
        let default_config = AppConfig::default();
        save_config(&default_config, override_path)?;
        Ok(default_config)
    } else {
        log::debug!("Loading config from '{}'", config_file_path.display());
        let config_content = fs::read_to_string(&config_file_path).with_context(|| {
            format!("Failed to read config file at '{}'", config_file_path.display())
        })?;

        toml::from_str(&config_content).with_context(|| {
            format!(
                "Failed to parse config file at '{}'. Ensure it is valid TOML.",
                config_file_path.display()
            )
        })
    }
}

/// Saves the provided application configuration to ENV, a specified path, or
/// the default location.
///
/// Creates the configuration directory if it doesn't exist.
/// Overwrites the existing configuration file at the target path.
pub fn save_config(config: &AppConfig, override_path: Option<&PathBuf>) -> Result<()> {
    let config_file_path = get_config_path_or_default(override_path)?;
    let app_config_dir = config_file_path
        .parent()
        .ok_or_else(|| anyhow!("Invalid config file path provided or determined"))?;

    fs::create_dir_all(app_config_dir).with_context(|| {
        format!("Failed to create config directory: {}", app_config_dir.display())
    })?;

    let mut config_content = toml::to_string_pretty(config)
        .with_context(|| "Failed to serialize configuration to TOML")?;

    // Leave a hint for the one setting that has no usable default.
    if config.captions.url.is_none() {
        config_content.push_str("\n# [captions]\n");
        config_content.push_str("# url = \"https://example.com/datasets/corpus/resolve/main/captions.csv\"\n");
    }

    fs::write(&config_file_path, config_content).with_context(|| {
        format!("Failed to write config file to '{}'", config_file_path.display())
    })?;

    log::debug!("Configuration saved to '{}'", config_file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Path resolution consults RENDERSTORE_TEST_CONFIG_PATH, which is process
    // global; tests touching it or loading config must not interleave.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.http_port, 6333);
        assert_eq!(config.grpc_port, 6334);
        assert!(!config.secure);
        assert_eq!(config.timeouts.init_secs, 2);
        assert_eq!(config.timeouts.query_secs, 45);
        assert_eq!(config.timeouts.insert_secs, 120);
        assert_eq!(config.collections.renders, "renders");
        assert_eq!(config.collections.objects, "objects");
        assert_eq!(config.collections.vector_name, "default");
        assert_eq!(config.collections.vector_dimension, 512);
        assert_eq!(config.performance.batch_size, 128);
        assert!(config.captions.url.is_none());
    }

    #[test]
    fn test_url_helpers() {
        let mut config = AppConfig::default();
        assert_eq!(config.http_url(), "http://localhost:6333");
        assert_eq!(config.grpc_url(), "http://localhost:6334");

        config.host = "store.internal".to_string();
        config.secure = true;
        assert_eq!(config.http_url(), "https://store.internal:6333");
        assert_eq!(config.grpc_url(), "https://store.internal:6334");
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let _guard = env_guard();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config_path.exists());

        // The written file includes the captions hint comment.
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("host = \"localhost\""));
        assert!(content.contains("# url ="));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let _guard = env_guard();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.host = "10.0.0.5".to_string();
        config.timeouts.query_secs = 10;
        config.collections.renders = "staging_renders".to_string();
        config.captions.url = Some("https://example.com/captions.csv".to_string());

        save_config(&config, Some(&config_path)).unwrap();
        let loaded = load_config(Some(&config_path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let _guard = env_guard();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "host = \"render-box\"\n\n[timeouts]\ninsert_secs = 300\n",
        )
        .unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config.host, "render-box");
        assert_eq!(config.timeouts.insert_secs, 300);
        // Untouched sections keep their defaults.
        assert_eq!(config.timeouts.init_secs, 2);
        assert_eq!(config.collections.objects, "objects");
    }

    #[test]
    fn test_invalid_toml_errors() {
        let _guard = env_guard();
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "host = [not toml").unwrap();

        let result = load_config(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_wins() {
        let _guard = env_guard();
        let temp_dir = tempdir().unwrap();
        let env_path = temp_dir.path().join("env-config.toml");
        std::env::set_var("RENDERSTORE_TEST_CONFIG_PATH", &env_path);

        let resolved = get_config_path_or_default(None).unwrap();
        assert_eq!(resolved, env_path);

        // The env var also beats an explicit override.
        let other = temp_dir.path().join("other.toml");
        let resolved = get_config_path_or_default(Some(&other)).unwrap();
        assert_eq!(resolved, env_path);

        std::env::remove_var("RENDERSTORE_TEST_CONFIG_PATH");
        let resolved = get_config_path_or_default(Some(&other)).unwrap();
        assert_eq!(resolved, other);
    }
}
