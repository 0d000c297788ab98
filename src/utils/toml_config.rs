//! TOML-based configuration for Conclave
//!
//! Server, provider and collaboration tuning live in one TOML file
//! (`conclave.toml`). The provider credential itself is never stored there;
//! the file only names the environment variable that holds it.
//!
//! # Hot Reloading
//!
//! Use [`ConfigManager`] for lock-free access to the current configuration.
//! Edits to the file are picked up by the watcher and apply to the next
//! collaboration request.

use crate::llm::GatewaySettings;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from conclave.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConclaveConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub collaboration: CollaborationConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cors_origins: Vec::new(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable name containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_persona_model")]
    pub persona_model: String,

    #[serde(default = "default_synthesis_model")]
    pub synthesis_model: String,

    /// Probe for and use the provider's grouped-job API for large panels
    #[serde(default = "default_true")]
    pub batch_api: bool,

    /// Transport-level timeout for any single HTTP request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.x.ai/v1".to_string()
}

fn default_api_key_env() -> String {
    "XAI_API_KEY".to_string()
}

fn default_persona_model() -> String {
    "grok-3-mini".to_string()
}

fn default_synthesis_model() -> String {
    "grok-4-1-fast-reasoning".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            persona_model: default_persona_model(),
            synthesis_model: default_synthesis_model(),
            batch_api: default_true(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// ============= Collaboration Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationConfig {
    #[serde(default = "default_persona_max_tokens")]
    pub persona_max_tokens: u32,

    #[serde(default = "default_persona_temperature")]
    pub persona_temperature: f32,

    #[serde(default = "default_synthesis_max_tokens")]
    pub synthesis_max_tokens: u32,

    #[serde(default = "default_synthesis_temperature")]
    pub synthesis_temperature: f32,

    #[serde(default = "default_persona_timeout")]
    pub persona_timeout_secs: u64,

    #[serde(default = "default_synthesis_timeout")]
    pub synthesis_timeout_secs: u64,

    /// Ceiling for a whole bulk job before falling back to parallel calls
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,

    #[serde(default = "default_batch_poll_interval")]
    pub batch_poll_interval_ms: u64,
}

fn default_persona_max_tokens() -> u32 {
    1500
}

fn default_persona_temperature() -> f32 {
    0.7
}

fn default_synthesis_max_tokens() -> u32 {
    4000
}

fn default_synthesis_temperature() -> f32 {
    0.5
}

fn default_persona_timeout() -> u64 {
    120
}

fn default_synthesis_timeout() -> u64 {
    180
}

fn default_batch_timeout() -> u64 {
    600
}

fn default_batch_poll_interval() -> u64 {
    2000
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            persona_max_tokens: default_persona_max_tokens(),
            persona_temperature: default_persona_temperature(),
            synthesis_max_tokens: default_synthesis_max_tokens(),
            synthesis_temperature: default_synthesis_temperature(),
            persona_timeout_secs: default_persona_timeout(),
            synthesis_timeout_secs: default_synthesis_timeout(),
            batch_timeout_secs: default_batch_timeout(),
            batch_poll_interval_ms: default_batch_poll_interval(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl ConclaveConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ConclaveConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges. A missing credential is not an error here; the
    /// server still starts and collaboration requests report it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.provider;
        let c = &self.collaboration;

        if p.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.api_base must not be empty".to_string(),
            ));
        }
        if p.api_key_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.api_key_env must not be empty".to_string(),
            ));
        }
        for (field, model) in [
            ("provider.persona_model", &p.persona_model),
            ("provider.synthesis_model", &p.synthesis_model),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        for (field, value) in [
            ("provider.request_timeout_secs", p.request_timeout_secs),
            ("collaboration.persona_timeout_secs", c.persona_timeout_secs),
            ("collaboration.synthesis_timeout_secs", c.synthesis_timeout_secs),
            ("collaboration.batch_timeout_secs", c.batch_timeout_secs),
            ("collaboration.batch_poll_interval_ms", c.batch_poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    field
                )));
            }
        }

        for (field, value) in [
            ("collaboration.persona_max_tokens", c.persona_max_tokens),
            ("collaboration.synthesis_max_tokens", c.synthesis_max_tokens),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    field
                )));
            }
        }

        for (field, value) in [
            ("collaboration.persona_temperature", c.persona_temperature),
            ("collaboration.synthesis_temperature", c.synthesis_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be between 0.0 and 2.0, got {}",
                    field, value
                )));
            }
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get the provider API key from the environment
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.provider.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.provider.api_key_env.clone()))
    }

    /// Model routing and per-call timeouts for the completion gateway
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            persona_model: self.provider.persona_model.clone(),
            synthesis_model: self.provider.synthesis_model.clone(),
            persona_timeout: Duration::from_secs(self.collaboration.persona_timeout_secs),
            synthesis_timeout: Duration::from_secs(self.collaboration.synthesis_timeout_secs),
            credential_env: self.provider.api_key_env.clone(),
        }
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<ConclaveConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = ConclaveConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config.
    /// This won't have file watching capabilities.
    pub fn from_config(config: ConclaveConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("conclave.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<ConclaveConfig> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk. On error the previous
    /// configuration stays in place.
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = ConclaveConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&mut self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let watched_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == watched_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Editors often replace the file, so watch its directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let debounce = Duration::from_millis(500);
            let mut last_reload: Option<std::time::Instant> = None;

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce) {
                    continue;
                }

                // Let the write finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match ConclaveConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"
cors_origins = ["http://localhost:5173"]

[provider]
api_base = "http://localhost:9999/v1"
api_key_env = "CONCLAVE_TEST_KEY"
persona_model = "fast-model"
synthesis_model = "smart-model"
batch_api = false

[collaboration]
persona_max_tokens = 800
persona_timeout_secs = 30
"#
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_config() {
        let config = ConclaveConfig::parse(&create_test_config()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.provider.persona_model, "fast-model");
        assert!(!config.provider.batch_api);
        assert_eq!(config.collaboration.persona_max_tokens, 800);
        // untouched fields keep their defaults
        assert_eq!(config.collaboration.synthesis_max_tokens, 4000);
        assert_eq!(config.collaboration.batch_timeout_secs, 600);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ConclaveConfig::parse("").unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.provider.api_base, "https://api.x.ai/v1");
        assert_eq!(config.provider.api_key_env, "XAI_API_KEY");
        assert!(config.provider.batch_api);
    }

    #[test]
    fn test_gateway_settings_follow_config() {
        let config = ConclaveConfig::parse(&create_test_config()).unwrap();
        let settings = config.gateway_settings();

        assert_eq!(settings.persona_model, "fast-model");
        assert_eq!(settings.synthesis_model, "smart-model");
        assert_eq!(settings.persona_timeout, Duration::from_secs(30));
        assert_eq!(settings.synthesis_timeout, Duration::from_secs(180));
        assert_eq!(settings.credential_env, "CONCLAVE_TEST_KEY");
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let err = ConclaveConfig::parse("[collaboration]\npersona_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("persona_timeout_secs")));
    }

    #[test]
    fn test_validation_rejects_bad_temperature() {
        let err = ConclaveConfig::parse("[collaboration]\nsynthesis_temperature = 3.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let err = ConclaveConfig::parse("[provider]\nsynthesis_model = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("synthesis_model")));
    }

    #[test]
    fn test_missing_file() {
        let err = ConclaveConfig::load("/nonexistent/conclave.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_api_key_reports_variable_name() {
        let config = ConclaveConfig::parse("[provider]\napi_key_env = \"CONCLAVE_UNSET_KEY_FOR_TEST\"\n").unwrap();
        let err = config.api_key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable 'CONCLAVE_UNSET_KEY_FOR_TEST' referenced in config is not set"
        );
    }

    #[test]
    fn test_manager_reload_picks_up_changes() {
        let file = write_config(&create_test_config());
        let manager = ConfigManager::new(file.path()).unwrap();
        assert_eq!(manager.config().server.port, 8080);

        fs::write(file.path(), "[server]\nport = 9090\n").unwrap();
        manager.reload().unwrap();
        assert_eq!(manager.config().server.port, 9090);
    }

    #[test]
    fn test_manager_keeps_config_when_reload_fails() {
        let file = write_config(&create_test_config());
        let manager = ConfigManager::new(file.path()).unwrap();

        fs::write(file.path(), "[collaboration]\npersona_timeout_secs = 0\n").unwrap();
        assert!(manager.reload().is_err());
        assert_eq!(manager.config().server.port, 8080);
    }

    #[tokio::test]
    async fn test_stop_watching_drops_watcher() {
        let file = write_config(&create_test_config());
        let mut manager = ConfigManager::new(file.path()).unwrap();

        manager.start_watching().unwrap();
        assert!(manager.watcher.read().is_some());

        manager.stop_watching();
        assert!(manager.watcher.read().is_none());
    }

    #[test]
    fn test_clone_shares_config() {
        let manager = ConfigManager::from_config(ConclaveConfig::default());
        let clone = manager.clone();
        assert!(Arc::ptr_eq(&manager.config(), &clone.config()));
    }
}
