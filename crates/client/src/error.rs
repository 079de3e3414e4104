//! Client error types.

use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use websurvey_core::data_url::DataUrlError;
use websurvey_core::validation::FieldErrors;

/// Failure of a call through the persistence gateway or auth API.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 422 with per-field messages.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not allowed")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    /// Any other non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never produced a response, or its body was unreadable.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Error bodies the server produces: `{message, errors}` for field errors,
/// `{error, code}` for everything else.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Option<FieldErrors>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl GatewayError {
    /// Classify a non-success response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return GatewayError::Transport(e),
        };
        Self::from_parts(status, &text)
    }

    fn from_parts(status: StatusCode, text: &str) -> Self {
        let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
        match status {
            StatusCode::UNPROCESSABLE_ENTITY if body.errors.is_some() => {
                GatewayError::Validation(body.errors.unwrap_or_default())
            }
            StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
            StatusCode::FORBIDDEN => GatewayError::Forbidden,
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            _ => GatewayError::Server {
                status: status.as_u16(),
                message: body
                    .error
                    .or(body.message)
                    .unwrap_or_else(|| text.trim().to_string()),
            },
        }
    }

    /// The per-field messages, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            GatewayError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Failure reading a chosen image file.
#[derive(Debug, thiserror::Error)]
pub enum ImageReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a recognized image: {source}")]
    NotAnImage {
        path: PathBuf,
        #[source]
        source: DataUrlError,
    },
}
