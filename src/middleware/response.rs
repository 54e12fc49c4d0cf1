use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// `{status, errors: [{message}]}` body shared by the account form routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub status: EnvelopeStatus,
    pub errors: Vec<ErrorMessage>,
}

impl StatusEnvelope {
    pub fn ok() -> Self {
        Self {
            status: EnvelopeStatus::Ok,
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            errors: vec![ErrorMessage { message: message.into() }],
        }
    }
}

impl IntoResponse for StatusEnvelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// [`ApiError`] rendered as an error envelope instead of plain text
#[derive(Debug)]
pub struct EnvelopeError(pub ApiError);

impl From<ApiError> for EnvelopeError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        let EnvelopeError(err) = self;
        tracing::debug!(code = err.error_code(), "{}", err.message());
        (err.status(), Json(StatusEnvelope::error(err.message()))).into_response()
    }
}

pub type EnvelopeResult = Result<StatusEnvelope, EnvelopeError>;
