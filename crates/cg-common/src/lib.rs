//! Console Gateway Common
//!
//! Types shared by every surface of the console gateway:
//! - Transport-neutral status codes and their gRPC/HTTP mappings
//! - Logging initialisation

pub mod logging;

use serde::{Deserialize, Serialize};

// ============================================================================
// Status Codes
// ============================================================================

/// Domain status code carried by every failure in the gateway.
///
/// Numbering follows the gRPC code space so the numeric value can be written
/// into HTTP error bodies without a translation table on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    /// Numeric value in the gRPC code space.
    pub fn as_i32(self) -> i32 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Cancelled => 1,
            StatusCode::Unknown => 2,
            StatusCode::InvalidArgument => 3,
            StatusCode::DeadlineExceeded => 4,
            StatusCode::NotFound => 5,
            StatusCode::AlreadyExists => 6,
            StatusCode::PermissionDenied => 7,
            StatusCode::ResourceExhausted => 8,
            StatusCode::FailedPrecondition => 9,
            StatusCode::Aborted => 10,
            StatusCode::OutOfRange => 11,
            StatusCode::Unimplemented => 12,
            StatusCode::Internal => 13,
            StatusCode::Unavailable => 14,
            StatusCode::DataLoss => 15,
            StatusCode::Unauthenticated => 16,
        }
    }

    /// Inverse of [`StatusCode::as_i32`]. Unknown values map to `Unknown`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => StatusCode::Ok,
            1 => StatusCode::Cancelled,
            3 => StatusCode::InvalidArgument,
            4 => StatusCode::DeadlineExceeded,
            5 => StatusCode::NotFound,
            6 => StatusCode::AlreadyExists,
            7 => StatusCode::PermissionDenied,
            8 => StatusCode::ResourceExhausted,
            9 => StatusCode::FailedPrecondition,
            10 => StatusCode::Aborted,
            11 => StatusCode::OutOfRange,
            12 => StatusCode::Unimplemented,
            13 => StatusCode::Internal,
            14 => StatusCode::Unavailable,
            15 => StatusCode::DataLoss,
            16 => StatusCode::Unauthenticated,
            _ => StatusCode::Unknown,
        }
    }

    /// HTTP status used when this code is written onto the HTTP surface.
    ///
    /// Mirrors the JSON/HTTP gateway convention so existing console clients
    /// see the same statuses they always have.
    pub fn http_status(self) -> http::StatusCode {
        match self {
            StatusCode::Ok => http::StatusCode::OK,
            // Client closed request; not in the http crate's constant table.
            StatusCode::Cancelled => {
                http::StatusCode::from_u16(499).unwrap_or(http::StatusCode::BAD_REQUEST)
            }
            StatusCode::Unknown => http::StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::InvalidArgument => http::StatusCode::BAD_REQUEST,
            StatusCode::DeadlineExceeded => http::StatusCode::GATEWAY_TIMEOUT,
            StatusCode::NotFound => http::StatusCode::NOT_FOUND,
            StatusCode::AlreadyExists => http::StatusCode::CONFLICT,
            StatusCode::PermissionDenied => http::StatusCode::FORBIDDEN,
            StatusCode::ResourceExhausted => http::StatusCode::TOO_MANY_REQUESTS,
            StatusCode::FailedPrecondition => http::StatusCode::BAD_REQUEST,
            StatusCode::Aborted => http::StatusCode::CONFLICT,
            StatusCode::OutOfRange => http::StatusCode::BAD_REQUEST,
            StatusCode::Unimplemented => http::StatusCode::NOT_IMPLEMENTED,
            StatusCode::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::Unavailable => http::StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::DataLoss => http::StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::Unauthenticated => http::StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<StatusCode> for tonic::Code {
    fn from(code: StatusCode) -> Self {
        tonic::Code::from_i32(code.as_i32())
    }
}

impl From<tonic::Code> for StatusCode {
    fn from(code: tonic::Code) -> Self {
        StatusCode::from_i32(code as i32)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
