use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The request never produced a readable response.
    Transport,
    /// Non-2xx status.
    Server,
    /// 2xx status with a body that does not carry the required fields.
    MalformedResponse,
}

/// The single failure shape returned by every remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{detail}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub http_status: Option<u16>,
    pub detail: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, http_status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            http_status,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, None, detail)
    }

    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Server, Some(status), detail)
    }

    pub fn malformed(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::MalformedResponse, status, detail)
    }
}
