use crate::{
    api::handlers::{agents, health},
    types::{
        AgentAnswer, ChatMessage, CollaborateRequest, CollaborationEvent, CollaborationMode,
        CollaborationResult, HealthResponse, MessageRole, PersonaSnapshot, PersonaSummary,
        RosterResponse,
    },
    AppState,
};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Queries plus conversation history never need more than this.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Generated OpenAPI document for every route
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Conclave",
        description = "Multi-persona LLM collaboration server"
    ),
    paths(
        agents::collaborate,
        agents::collaborate_stream,
        agents::roster,
        health::health,
    ),
    components(schemas(
        CollaborateRequest,
        CollaborationResult,
        CollaborationEvent,
        CollaborationMode,
        AgentAnswer,
        PersonaSnapshot,
        PersonaSummary,
        RosterResponse,
        HealthResponse,
        ChatMessage,
        MessageRole,
    )),
    tags(
        (name = "agents", description = "Multi-persona collaboration"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/agents/collaborate", post(agents::collaborate))
        .route("/agents/collaborate/stream", post(agents::collaborate_stream))
        .route("/agents/roster", get(agents::roster))
        .route("/api-docs/openapi.json", get(openapi_json))
}

/// Wrap the router in request tracing, CORS and the body size limit.
///
/// The limit sits outside the other layers so CORS sees the router's own
/// response body.
pub fn with_middleware(router: Router<AppState>, cors_origins: &[String]) -> Router<AppState> {
    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Permissive when no origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
