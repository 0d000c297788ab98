//! HTTP API Handlers and Routes
//!
//! The REST layer for Conclave, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Collaboration (`/agents`)
//! - `POST /agents/collaborate` - Run a collaboration and return the full result
//! - `POST /agents/collaborate/stream` - Same, as Server-Sent Events
//! - `GET /agents/roster` - List the persona catalog
//!
//! ## Health
//! - `GET /health` - Service status and enabled features
//!
//! # OpenAPI Documentation
//!
//! The generated document is served at `/api-docs/openapi.json`. When the
//! `swagger-ui` feature is enabled, interactive documentation is available at
//! `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::{create_router, with_middleware, ApiDoc, MAX_BODY_BYTES};
