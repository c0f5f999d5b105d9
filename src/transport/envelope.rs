//! The uniform success/failure envelope
//!
//! The backend answers `{success, data?, error?}`. Every transport operation
//! hands callers an `ApiResponse` and never an error.

use super::TransportError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Message used when the body cannot be understood
pub const INVALID_RESPONSE: &str = "Invalid server response";

/// Result of a transport operation
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { data: T },
    Failure { error: String },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    #[allow(dead_code)] // Display layers branch on the envelope
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[allow(dead_code)]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    #[allow(dead_code)]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Convert to a `Result` with the failure text as the error
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { error } => Err(error),
        }
    }

}

impl<T> From<TransportError> for ApiResponse<T> {
    fn from(err: TransportError) -> Self {
        Self::Failure { error: err.message }
    }
}

/// Decode a response body into `T`.
///
/// A non-2xx status or a body whose `success` is not `true` fails with the
/// body's `error` text, falling back to `HTTP <status>`. Missing `data`
/// decodes from an empty object so all-optional payloads still succeed.
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, TransportError> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Err(TransportError::protocol(INVALID_RESPONSE));
    };

    let success = json.get("success").and_then(Value::as_bool) == Some(true);
    if !status.is_success() || !success {
        let message = json
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(|| format!("HTTP {}", status.as_u16()), ToString::to_string);
        return Err(if status.is_success() {
            TransportError::application(message)
        } else {
            TransportError::protocol(message)
        });
    }

    let data = match json.get("data") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(data) => data.clone(),
    };
    serde_json::from_value(data).map_err(|e| {
        tracing::debug!(error = %e, "Response data did not match the expected shape");
        TransportError::protocol(INVALID_RESPONSE)
    })
}
