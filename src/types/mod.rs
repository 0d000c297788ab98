use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollaborateRequest {
    pub query: String,
    /// Number of personas to invite. Clamped to 1..=25, defaults to 7.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_agents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterResponse {
    pub agents: Vec<PersonaSummary>,
    pub total: usize,
    pub max_per_session: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub provider: String,
    pub features: Vec<String>,
}

// ============= Message Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ============= Collaboration Types =============

/// Public view of a persona, as listed by the roster and the `agents` stream frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub specialty: String,
}

/// Persona fields copied into each answer so results stay self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonaSnapshot {
    pub name: String,
    pub emoji: String,
    pub specialty: String,
}

/// One persona's contribution to a collaboration. Failures are answers too:
/// `failed` is set and `content` carries a readable error string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentAnswer {
    pub persona_id: String,
    pub persona: PersonaSnapshot,
    pub content: String,
    pub produced_at: DateTime<Utc>,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Which dispatch path produced a result's answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationMode {
    Sequential,
    BatchPrimary,
    BatchFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollaborationResult {
    pub mode: CollaborationMode,
    pub query: String,
    pub requested_agent_count: usize,
    pub answers: Vec<AgentAnswer>,
    pub synthesis: Option<String>,
    pub produced_at: DateTime<Utc>,
    /// Name of the bulk job, present only when the bulk path produced the answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

impl CollaborationResult {
    /// Answers that completed without a provider error.
    pub fn successful_answers(&self) -> impl Iterator<Item = &AgentAnswer> {
        self.answers.iter().filter(|a| !a.failed)
    }
}

/// Frames emitted by the streaming variant, in this order:
/// `Agents`, one `AgentResponse` per dispatched persona, `Synthesis`, `Done`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollaborationEvent {
    Agents { agents: Vec<PersonaSummary> },
    AgentResponse { response: AgentAnswer },
    Synthesis { content: String },
    Done,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Configuration(msg) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::LLM(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
