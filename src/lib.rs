//! # Conclave - Multi-Persona Collaboration Server
//!
//! Answers a question with a panel of expert personas (analyst, coder, critic
//! and so on), each played by an LLM, then merges their answers into one
//! synthesis.
//!
//! ## Overview
//!
//! Conclave can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `conclave-server` binary
//! 2. **As a library** - Drive the [`agents::Orchestrator`] directly
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use conclave::{ConclaveConfig, OpenAIClient, Orchestrator};
//! use std::sync::Arc;
//!
//! let config = ConclaveConfig::load("conclave.toml")?;
//! let client = Arc::new(OpenAIClient::new(&config.provider.api_base, config.api_key().ok()));
//! let orchestrator = Orchestrator::from_config(&config, client, None);
//!
//! let result = orchestrator
//!     .orchestrate("How should we migrate our monolith?", Some(4), &[])
//!     .await?;
//! println!("{}", result.synthesis.unwrap_or_default());
//! ```
//!
//! ## Collaboration modes
//!
//! - Panels of 1-4 personas run **sequentially**; each persona sees a digest of
//!   the earlier answers.
//! - Panels of 5-25 run as a **batch** of independent calls, through the
//!   provider's grouped-job API when it is available and as parallel calls
//!   otherwise.
//!
//! ## Modules
//!
//! - [`agents`] - Persona catalog, selection, collaboration and synthesis
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line interface
//! - [`llm`] - Provider client abstraction and the OpenAI-compatible client
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Persona catalog, selection and collaboration pipeline.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{Orchestrator, PERSONAS};
pub use llm::{BulkCompletion, LLMClient, OpenAIClient};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConclaveConfig, ConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Completion provider used for every persona and synthesis call
    pub llm: Arc<dyn LLMClient>,
    /// Grouped-job capability, present when the provider probe succeeded
    pub bulk: Option<Arc<dyn BulkCompletion>>,
}

impl AppState {
    /// Orchestrator built from the current configuration, so reloaded tuning
    /// applies to the next request.
    pub fn orchestrator(&self) -> Orchestrator {
        let config = self.config_manager.config();
        Orchestrator::from_config(&config, self.llm.clone(), self.bulk.clone())
    }
}
