//! Init command implementation
//!
//! Scaffolds `conclave.toml` and `.env.example` in a project directory.

use super::output::Output;
use crate::utils::toml_config::ConclaveConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// conclave.toml already exists and `--force` was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Conclave");

    let base_path = &config.path;
    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let config_path = base_path.join("conclave.toml");
    if config_path.exists() && !config.force {
        output.warning("conclave.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let files = [
        ("config", "conclave.toml", generate_conclave_toml(&config)),
        ("env", ".env.example", generate_env_example()),
    ];

    for (kind, name, content) in files {
        let path = base_path.join(name);
        match write_file(&path, &content, config.force) {
            Ok(true) => output.created(kind, name),
            Ok(false) => output.skipped(name, "already exists"),
            Err(e) => {
                output.error(&format!("Failed to create {}: {}", name, e));
                return InitResult::Error(e.to_string());
            }
        }
    }

    output.complete("Conclave initialized!");

    output.header("Next Steps");
    output.info("1. Add your provider key:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set XAI_API_KEY");
    output.info("2. Start the server:");
    output.command("conclave-server");
    output.info("3. Or ask a question from the terminal:");
    output.command("conclave-server ask \"How should we roll out feature flags?\" --agents 5");

    InitResult::Success
}

/// Write `content` unless the file exists and `force` is off.
/// Returns whether the file was written.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_conclave_toml(config: &InitConfig) -> String {
    let defaults = ConclaveConfig::default();
    let p = &defaults.provider;
    let c = &defaults.collaboration;

    format!(
        r#"# Conclave configuration
# ======================

[server]
host = "{host}"
port = {port}
log_level = "info"
# Allowed browser origins; empty allows any origin
cors_origins = []

[provider]
# Any OpenAI-compatible endpoint
api_base = "{api_base}"
# Name of the environment variable holding the API key
api_key_env = "{api_key_env}"
persona_model = "{persona_model}"
synthesis_model = "{synthesis_model}"
# Use the provider's batch API for panels of 5 or more when available
batch_api = {batch_api}
request_timeout_secs = {request_timeout}

[collaboration]
persona_max_tokens = {persona_max_tokens}
persona_temperature = {persona_temperature:.1}
synthesis_max_tokens = {synthesis_max_tokens}
synthesis_temperature = {synthesis_temperature:.1}
persona_timeout_secs = {persona_timeout}
synthesis_timeout_secs = {synthesis_timeout}
batch_timeout_secs = {batch_timeout}
batch_poll_interval_ms = {batch_poll}
"#,
        host = config.host,
        port = config.port,
        api_base = p.api_base,
        api_key_env = p.api_key_env,
        persona_model = p.persona_model,
        synthesis_model = p.synthesis_model,
        batch_api = p.batch_api,
        request_timeout = p.request_timeout_secs,
        persona_max_tokens = c.persona_max_tokens,
        persona_temperature = c.persona_temperature,
        synthesis_max_tokens = c.synthesis_max_tokens,
        synthesis_temperature = c.synthesis_temperature,
        persona_timeout = c.persona_timeout_secs,
        synthesis_timeout = c.synthesis_timeout_secs,
        batch_timeout = c.batch_timeout_secs,
        batch_poll = c.batch_poll_interval_ms,
    )
}

fn generate_env_example() -> String {
    r#"# Conclave Environment Variables
# ==============================
# Copy this file to .env and fill in the values.

# Provider API key (name set by provider.api_key_env in conclave.toml)
XAI_API_KEY=

# Optional log filter, overrides server.log_level
# RUST_LOG=conclave=debug,tower_http=info
"#
    .to_string()
}
