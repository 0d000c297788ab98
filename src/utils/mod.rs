//! Configuration utilities
//!
//! [`toml_config`] loads `conclave.toml` and keeps it hot-reloadable through
//! [`toml_config::ConfigManager`].

pub mod toml_config;
