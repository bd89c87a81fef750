//! Console RPC API
//!
//! HTTP surface of the dispatch gateway: `GET|POST /v2/console/rpc/{id}`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        ConnectInfo, Path as PathParam, Query, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, warn};

use crate::dispatch::{CallerAddress, RequestEnvelope, RpcGateway, Transport};
use crate::error::ConsoleError;
use crate::runtime::Metadata;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// RPC API state
#[derive(Clone)]
pub struct RpcState {
    pub gateway: Arc<RpcGateway>,
}

impl RpcState {
    pub fn new(gateway: Arc<RpcGateway>) -> Self {
        Self { gateway }
    }
}

/// Invoke a registered function
///
/// The id is prefixed with the console namespace and lowercased. The query
/// string becomes the function's params and the POST body its payload.
#[utoipa::path(
    post,
    path = "/v2/console/rpc/{id}",
    tag = "rpc",
    params(
        ("id" = String, Path, description = "Function ID, case-insensitive")
    ),
    request_body(content = String, description = "Raw payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Function result", body = String, content_type = "application/json"),
        (status = 400, description = "Missing ID or invalid payload", body = crate::api::common::RpcErrorBody),
        (status = 404, description = "Function not found", body = crate::api::common::RpcErrorBody),
        (status = 500, description = "Internal error", body = crate::api::common::RpcErrorBody)
    )
)]
pub async fn rpc_func(
    State(state): State<RpcState>,
    method: Method,
    id: Option<PathParam<String>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ConsoleError> {
    let id = id.map(|PathParam(id)| id).unwrap_or_default();

    let Query(pairs) = query.map_err(|e| {
        warn!(error = %e, "Error reading query parameters");
        ConsoleError::internal("Error reading query parameters")
    })?;
    let metadata = pairs.into_iter().fold(Metadata::new(), |mut metadata, (key, value)| {
        metadata.entry(key).or_default().push(value);
        metadata
    });

    let payload = if method == Method::GET {
        String::new()
    } else {
        let bytes = body.map_err(|e| {
            warn!(error = %e, "Error reading request body");
            ConsoleError::internal("Error reading request body")
        })?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ConsoleError::invalid_argument("Request body must be valid UTF-8"))?
    };

    let forwarded_for = headers.get(FORWARDED_FOR).and_then(|value| value.to_str().ok());
    let caller = CallerAddress::resolve(forwarded_for, connect_info.map(|ConnectInfo(addr)| addr));

    debug!(rpc_id = %id, method = %method, "Console RPC over HTTP");

    let request = RequestEnvelope {
        id,
        metadata,
        payload,
        caller,
    };
    let result = state.gateway.invoke(Transport::Http, request).await?;

    Ok(([(CONTENT_TYPE, "application/json")], result.payload).into_response())
}

pub fn rpc_router(state: RpcState) -> Router {
    Router::new()
        .route("/v2/console/rpc", get(rpc_func).post(rpc_func))
        .route("/v2/console/rpc/", get(rpc_func).post(rpc_func))
        .route("/v2/console/rpc/:id", get(rpc_func).post(rpc_func))
        .route("/v2/console/rpc/:id/", get(rpc_func).post(rpc_func))
        .with_state(state)
}
