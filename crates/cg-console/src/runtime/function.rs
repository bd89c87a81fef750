use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use async_trait::async_trait;
use cg_common::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Query-style parameters exposed to a function: ordered keys, each with the
/// values in the order they arrived.
pub type Metadata = BTreeMap<String, Vec<String>>;

/// Failure returned by a registered function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RpcError {
    pub code: StatusCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }
}

pub type RpcResult = std::result::Result<String, RpcError>;

/// Per-call context handed to a function alongside its payload.
///
/// The identity and session fields are reserved for end-user calls. Console
/// calls are already authenticated at the transport and never carry a user
/// session, so the gateway leaves them empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpcContext {
    pub query_params: Metadata,
    pub user_id: Option<Uuid>,
    pub username: String,
    pub session_vars: HashMap<String, String>,
    pub session_expiry: i64,
    pub session_id: String,
    pub client_ip: String,
    pub client_port: String,
}

impl RpcContext {
    /// Context for a console call: query params and caller address only.
    pub fn console(
        query_params: Metadata,
        client_ip: impl Into<String>,
        client_port: impl Into<String>,
    ) -> Self {
        Self {
            query_params,
            client_ip: client_ip.into(),
            client_port: client_port.into(),
            ..Default::default()
        }
    }
}

/// A function callable through the gateway.
#[async_trait]
pub trait RpcFunction: Send + Sync {
    async fn invoke(&self, ctx: RpcContext, payload: String) -> RpcResult;
}

#[async_trait]
impl<F, Fut> RpcFunction for F
where
    F: Fn(RpcContext, String) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult> + Send,
{
    async fn invoke(&self, ctx: RpcContext, payload: String) -> RpcResult {
        (self)(ctx, payload).await
    }
}
