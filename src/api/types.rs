//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::Message;

/// Request to run the pipeline once.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunRequest {
    /// The natural-language request to turn into code
    pub request: String,

    /// Optional model override (uses default if not specified)
    pub model: Option<String>,
}

/// Final state of a completed run.
///
/// The transcript is the only success/failure channel: callers inspect
/// `evaluation_result` and the message contents to distinguish outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    /// Unique run identifier
    pub id: Uuid,

    /// Completion time (RFC 3339)
    pub created_at: String,

    /// Full transcript, oldest first
    pub messages: Vec<Message>,

    /// Code extracted by the generation stage, if any
    pub generated_code: Option<String>,

    /// Outcome string of the evaluation stage, if any
    pub evaluation_result: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Error payload for rejected requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
