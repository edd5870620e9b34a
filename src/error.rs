use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;

use crate::{models::ErrorBody, validation::ValidationFailure};

/// Upper bound on diagnostic text carried by a failure.
pub const DIAGNOSTIC_PREFIX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    UpstreamError,
    NoExtractableSvg,
    Configuration,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid request body")]
    InvalidInput(ValidationFailure),
    #[error("Missing OPENROUTER_API_KEY")]
    MissingApiKey,
    #[error("OpenRouter request failed: {0}")]
    Transport(String),
    #[error("OpenRouter error ({status})")]
    UpstreamStatus { status: u16, body: String },
    #[error("No response content from OpenRouter")]
    MissingContent { status: u16, body: String },
    #[error("Failed to generate valid SVG")]
    NoExtractableSvg { excerpt: String },
}

impl GenerationError {
    pub fn upstream_status(status: u16, body: &str) -> Self {
        Self::UpstreamStatus { status, body: prefix_chars(body, DIAGNOSTIC_PREFIX_CHARS) }
    }

    pub fn missing_content(status: u16, body: &str) -> Self {
        Self::MissingContent { status, body: prefix_chars(body, DIAGNOSTIC_PREFIX_CHARS) }
    }

    pub fn no_extractable_svg(raw: &str) -> Self {
        Self::NoExtractableSvg { excerpt: prefix_chars(raw, DIAGNOSTIC_PREFIX_CHARS) }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::MissingApiKey => ErrorKind::Configuration,
            Self::Transport(_) | Self::UpstreamStatus { .. } | Self::MissingContent { .. } => ErrorKind::UpstreamError,
            Self::NoExtractableSvg { .. } => ErrorKind::NoExtractableSvg,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorKind::NoExtractableSvg => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvalidInput(failure) => Some(failure.to_string()),
            Self::MissingApiKey => None,
            Self::Transport(reason) => Some(reason.clone()),
            Self::UpstreamStatus { body, .. } => Some(body.clone()),
            Self::MissingContent { body, .. } if body.is_empty() => None,
            Self::MissingContent { body, .. } => Some(body.clone()),
            Self::NoExtractableSvg { excerpt } => Some(excerpt.clone()),
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.to_string(), details: self.details() };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Char-boundary-safe prefix of at most `max` characters.
pub fn prefix_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
