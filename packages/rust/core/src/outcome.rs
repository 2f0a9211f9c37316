//! Stage results and their HTTP-style rendering.

use serde::Serialize;
use serde_json::{Value, json};

/// Result of one stage invocation.
///
/// Either the whole batch succeeded or nothing did; there is no partial
/// outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Confirmation message or merged document.
    Success(Value),
    /// Error message of the failure that aborted the stage.
    Failure(String),
}

impl StageOutcome {
    /// Failure carrying the display form of `err`.
    pub fn failure(err: impl std::fmt::Display) -> Self {
        Self::Failure(err.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// HTTP status the outcome maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure(_) => 500,
        }
    }

    /// Render as `{statusCode, body}` with a JSON-encoded body.
    ///
    /// Failures render as `{"erro": "<message>"}`.
    pub fn into_response(self) -> StageResponse {
        let status_code = self.status_code();
        let body = match self {
            Self::Success(value) => value.to_string(),
            Self::Failure(message) => json!({ "erro": message }).to_string(),
        };
        StageResponse { status_code, body }
    }
}

/// Wire form of a stage result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResponse {
    pub status_code: u16,
    /// JSON text.
    pub body: String,
}
