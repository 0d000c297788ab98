//! API request handlers.

/// Collaboration and roster handlers.
pub mod agents;
/// Health check handler.
pub mod health;
