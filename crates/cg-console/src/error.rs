//! Console Error Types

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use cg_common::StatusCode;
use thiserror::Error;
use tracing::error;

use crate::api::common::RpcErrorBody;
use crate::runtime::RpcError;

/// Errors surfaced by the console gateway.
///
/// The display text is the message written back to clients on both surfaces.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Internal { message: String },

    /// Failure reported by a registered function, carrying its own code.
    #[error("{0}")]
    Function(#[from] RpcError),
}

impl ConsoleError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::InvalidArgument,
            Self::NotFound { .. } => StatusCode::NotFound,
            Self::Internal { .. } => StatusCode::Internal,
            Self::Function(err) => err.code,
        }
    }
}

impl From<ConsoleError> for tonic::Status {
    fn from(err: ConsoleError) -> Self {
        tonic::Status::new(err.code().into(), err.to_string())
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code == StatusCode::Internal {
            error!(error = %self, "Console request failed");
        }

        let message = self.to_string();
        let body = RpcErrorBody {
            error: message.clone(),
            message,
            code: code.as_i32(),
        };

        (code.http_status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
