//! Dispatch Gateway
//!
//! Transport-neutral core shared by the HTTP and gRPC console surfaces:
//! - Identifier normalisation and registry lookup
//! - Metadata filtering
//! - Payload normalisation (gateway-compatible vs raw mode)
//! - Result re-encoding
//!
//! The two surfaces intentionally differ in gateway-compatible mode. gRPC
//! callers send a JSON string literal and receive `{"payload": ...}`, while
//! HTTP callers send and receive raw bytes. Existing clients depend on both
//! shapes.

pub mod address;

use std::sync::Arc;

use cg_config::RpcConfig;
use serde::Serialize;
use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::runtime::{Metadata, RpcContext, RpcRegistry};

pub use address::CallerAddress;

/// Surface a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Grpc,
    Http,
}

/// How payloads are encoded between caller and function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Mimics the JSON/HTTP gateway envelope (default).
    GatewayCompatible,
    /// Pass-through, selected by the presence of the unwrap key.
    Raw,
}

/// Normalised function identifier: lowercased, with the surface namespace
/// applied when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn parse(raw: &str, namespace: Option<&str>) -> Result<Self> {
        if raw.is_empty() {
            return Err(ConsoleError::invalid_argument("RPC ID must be set"));
        }

        let id = raw.to_lowercase();
        Ok(match namespace {
            Some(namespace) => Self(format!("{}{}", namespace, id)),
            None => Self(id),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound call as seen by the gateway, before any normalisation.
#[derive(Debug, Clone, Default)]
pub struct RequestEnvelope {
    /// Identifier exactly as the transport delivered it.
    pub id: String,
    /// Transport metadata: query params on HTTP, call metadata on gRPC.
    pub metadata: Metadata,
    pub payload: String,
    pub caller: CallerAddress,
}

impl RequestEnvelope {
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn with_caller(mut self, caller: CallerAddress) -> Self {
        self.caller = caller;
        self
    }

    /// Append a metadata value, keeping earlier values for the same key.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.entry(key.into()).or_default().push(value.into());
        self
    }
}

/// Successful call result, already encoded for the originating surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope {
    pub payload: String,
    pub mode: PayloadMode,
}

#[derive(Serialize)]
struct WrappedPayload<'a> {
    payload: &'a str,
}

/// Request normalisation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub http_namespace: String,
    pub grpc_metadata_prefix: String,
    pub reserved_keys: Vec<String>,
    pub unwrap_key: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from(&RpcConfig::default())
    }
}

impl From<&RpcConfig> for GatewaySettings {
    fn from(config: &RpcConfig) -> Self {
        Self {
            http_namespace: config.http_namespace.clone(),
            grpc_metadata_prefix: config.grpc_metadata_prefix.clone(),
            reserved_keys: config.reserved_keys.clone(),
            unwrap_key: config.unwrap_key.clone(),
        }
    }
}

/// Resolves and invokes registered functions for both console surfaces.
///
/// Holds no per-call state; one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct RpcGateway {
    registry: Arc<RpcRegistry>,
    settings: GatewaySettings,
}

impl RpcGateway {
    pub fn new(registry: Arc<RpcRegistry>, settings: GatewaySettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &RpcRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Invoke the function named by `request` and encode its result for
    /// `transport`.
    pub async fn invoke(
        &self,
        transport: Transport,
        request: RequestEnvelope,
    ) -> Result<ResultEnvelope> {
        let namespace = match transport {
            Transport::Http => Some(self.settings.http_namespace.as_str()),
            Transport::Grpc => None,
        };
        let id = FunctionId::parse(&request.id, namespace)?;

        let function = self.registry.lookup(id.as_str()).ok_or_else(|| {
            debug!(rpc_id = %id, transport = ?transport, "RPC function not found");
            ConsoleError::not_found(format!("RPC function not found: {}", id))
        })?;

        let query_params = self.filter_metadata(transport, request.metadata);
        let mode = if query_params.contains_key(&self.settings.unwrap_key) {
            PayloadMode::Raw
        } else {
            PayloadMode::GatewayCompatible
        };

        let payload = decode_payload(transport, mode, request.payload)?;
        let ctx = RpcContext::console(query_params, request.caller.ip, request.caller.port);

        debug!(rpc_id = %id, transport = ?transport, mode = ?mode, "Invoking RPC function");
        let result = function.invoke(ctx, payload).await.map_err(|err| {
            debug!(
                rpc_id = %id,
                code = %err.code,
                error = %err.message,
                "RPC function returned an error"
            );
            ConsoleError::Function(err)
        })?;

        let payload = encode_result(transport, mode, result)?;
        debug!(rpc_id = %id, transport = ?transport, "RPC function completed");
        Ok(ResultEnvelope { payload, mode })
    }

    /// Copy transport metadata into the params a function may see.
    ///
    /// gRPC metadata only carries query params under the two-character
    /// gateway prefix; every other key is a transport header and is dropped.
    /// Reserved keys are removed on both surfaces.
    pub fn filter_metadata(&self, transport: Transport, metadata: Metadata) -> Metadata {
        metadata
            .into_iter()
            .filter_map(|(key, values)| match transport {
                Transport::Http => Some((key, values)),
                Transport::Grpc => key
                    .strip_prefix(self.settings.grpc_metadata_prefix.as_str())
                    .map(|stripped| (stripped.to_string(), values)),
            })
            .filter(|(key, _)| !self.settings.reserved_keys.iter().any(|reserved| reserved == key))
            .fold(Metadata::new(), |mut params, (key, values)| {
                params.entry(key).or_default().extend(values);
                params
            })
    }
}

fn decode_payload(transport: Transport, mode: PayloadMode, payload: String) -> Result<String> {
    match (transport, mode) {
        (Transport::Grpc, PayloadMode::GatewayCompatible) if !payload.is_empty() => {
            serde_json::from_str::<String>(&payload)
                .map_err(|_| ConsoleError::invalid_argument("Cannot unmarshal JSON string!"))
        }
        _ => Ok(payload),
    }
}

fn encode_result(transport: Transport, mode: PayloadMode, result: String) -> Result<String> {
    match (transport, mode) {
        (Transport::Grpc, PayloadMode::GatewayCompatible) => {
            serde_json::to_string(&WrappedPayload { payload: &result }).map_err(|_| {
                ConsoleError::internal("Error marshaling wrapped response to client")
            })
        }
        _ => Ok(result),
    }
}
