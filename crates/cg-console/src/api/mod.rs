//! API Layer
//!
//! HTTP endpoints for the console gateway.

pub mod common;
pub mod monitoring;
pub mod openapi;
pub mod rpc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use common::RpcErrorBody;
pub use monitoring::monitoring_router;
pub use openapi::{openapi_router, ConsoleApiDoc};
pub use rpc::{rpc_router, RpcState};

/// Full HTTP router: function invocation, health and the OpenAPI document.
pub fn create_router(state: RpcState) -> Router {
    Router::new()
        .merge(rpc_router(state))
        .merge(monitoring_router())
        .merge(openapi_router())
        .layer(TraceLayer::new_for_http())
}
