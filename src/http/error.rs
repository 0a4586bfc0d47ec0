//! Request-level failures and their HTTP mapping.
//!
//! Every failure is surfaced to the client; nothing is retried or masked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::workload::Mismatch;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("missing query parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("query parameter `{name}` is not a non-negative integer: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("upload verification failed: {0}")]
    VerificationFailed(#[from] Mismatch),

    #[error("failed to read request body: {0}")]
    BodyRead(#[from] axum::Error),

    #[error("no dataset loaded")]
    NoDataset,
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::MissingParameter(_) | HandlerError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            HandlerError::VerificationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HandlerError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::NoDataset => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            HandlerError::BodyRead(_) => tracing::error!(error = %self, "Request failed"),
            _ => tracing::warn!(status = %status, error = %self, "Request rejected"),
        }
        (status, self.to_string()).into_response()
    }
}
