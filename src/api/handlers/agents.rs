use crate::{
    agents::catalog::{roster as catalog_roster, MAX_AGENTS_PER_SESSION},
    types::{CollaborateRequest, CollaborationEvent, CollaborationResult, Result, RosterResponse},
    AppState,
};
use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::StreamExt;

/// Run a collaboration and return the full result
#[utoipa::path(
    post,
    path = "/agents/collaborate",
    request_body = CollaborateRequest,
    responses(
        (status = 200, description = "Collaboration result", body = CollaborationResult),
        (status = 400, description = "Invalid input"),
        (status = 503, description = "Provider credential not configured")
    ),
    tag = "agents"
)]
pub async fn collaborate(
    State(state): State<AppState>,
    Json(payload): Json<CollaborateRequest>,
) -> Result<Json<CollaborationResult>> {
    let history = payload.conversation_history.unwrap_or_default();
    let result = state
        .orchestrator()
        .orchestrate(&payload.query, payload.num_agents, &history)
        .await?;

    Ok(Json(result))
}

/// Run a collaboration and stream progress as Server-Sent Events
///
/// Frames carry JSON tagged by `type` (`agents`, `agent_response`,
/// `synthesis`); the stream ends with `data: [DONE]`.
#[utoipa::path(
    post,
    path = "/agents/collaborate/stream",
    request_body = CollaborateRequest,
    responses(
        (status = 200, description = "Event stream of collaboration frames", content_type = "text/event-stream", body = CollaborationEvent),
        (status = 400, description = "Invalid input"),
        (status = 503, description = "Provider credential not configured")
    ),
    tag = "agents"
)]
pub async fn collaborate_stream(
    State(state): State<AppState>,
    Json(payload): Json<CollaborateRequest>,
) -> Result<impl IntoResponse> {
    let events = state.orchestrator().orchestrate_stream(
        payload.query,
        payload.num_agents,
        payload.conversation_history.unwrap_or_default(),
    )?;

    let frames = events.map(|event| match event {
        CollaborationEvent::Done => Ok(Event::default().data("[DONE]")),
        other => Event::default().json_data(&other),
    });

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(frames).keep_alive(KeepAlive::default()),
    ))
}

/// List the persona catalog
#[utoipa::path(
    get,
    path = "/agents/roster",
    responses(
        (status = 200, description = "All available personas", body = RosterResponse)
    ),
    tag = "agents"
)]
pub async fn roster() -> Json<RosterResponse> {
    let agents = catalog_roster();
    Json(RosterResponse {
        total: agents.len(),
        agents,
        max_per_session: MAX_AGENTS_PER_SESSION,
    })
}
