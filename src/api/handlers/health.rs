use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Service status and enabled features
///
/// Reports `degraded` while no provider credential is configured; the server
/// stays up but collaboration requests are rejected until one is set.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let configured = state.llm.has_credentials();

    let mut features = vec![
        "multi-persona".to_string(),
        "sequential-collaboration".to_string(),
        "batch-collaboration".to_string(),
        "streaming".to_string(),
    ];
    if state.bulk.is_some() {
        features.push("bulk-api".to_string());
    }

    Json(HealthResponse {
        status: if configured { "healthy" } else { "degraded" }.to_string(),
        service: "conclave".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.llm.provider_name().to_string(),
        features,
    })
}
