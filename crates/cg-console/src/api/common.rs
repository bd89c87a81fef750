//! Common API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body written by the HTTP surface.
///
/// `error` and `message` carry the same text; `code` is the numeric status
/// code in the gRPC code space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RpcErrorBody {
    pub error: String,
    pub message: String,
    pub code: i32,
}
