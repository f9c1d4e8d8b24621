use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of backend failures as observed by the client. The
/// backend contract does not distinguish business errors from transport ones,
/// so classification happens at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    BadStatus,
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code:?} on {endpoint}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub endpoint: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}
