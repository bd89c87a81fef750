//! OpenAPI Documentation

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

/// Console HTTP API OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Console Gateway API",
        version = "1.0.0",
        description = "Invoke registered console functions over HTTP"
    ),
    servers(
        (url = "http://localhost:7351", description = "Local development")
    ),
    tags(
        (name = "rpc", description = "Registered function invocation"),
        (name = "monitoring", description = "Health and monitoring")
    ),
    paths(
        super::rpc::rpc_func,
        super::monitoring::health,
    ),
    components(schemas(
        super::common::RpcErrorBody,
        super::monitoring::HealthResponse,
    ))
)]
pub struct ConsoleApiDoc;

pub fn openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/q/openapi", get(|| async { Json(ConsoleApiDoc::openapi()) }))
}
