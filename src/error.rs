//! Error types shared by the cluster adapter and the HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Failures of a read against the orchestration API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    /// Credentials were rejected or lack permission for the read.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure, timeout, or an overloaded API server.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Anything else, including bodies that do not decode.
    #[error("{0}")]
    Unknown(String),
}

impl ClusterError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<reqwest::Error> for ClusterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            Self::Transient(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors surfaced to dashboard clients.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// Malformed context name, unknown debug kind and the like.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Cluster(ClusterError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Cluster(ClusterError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Cluster(ClusterError::Transient(_))
            | Self::Cluster(ClusterError::Unknown(_))
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
