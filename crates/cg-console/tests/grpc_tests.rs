//! gRPC Surface Tests
//!
//! Tests for:
//! - Function invocation through `Console::rpc_func`
//! - Gateway-compatible and raw payload modes
//! - Metadata prefix handling
//! - Tournament create/get
//! - Concurrent invocations

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use tonic::metadata::MetadataValue;
use tonic::{Code, Request};
use uuid::Uuid;

use cg_console::{
    ConsoleService, GatewaySettings, RpcContext, RpcError, RpcGateway, RpcRegistry, Tournament,
    TournamentDescriptor, TournamentService, TournamentStore,
};
use cg_proto::console_server::Console;
use cg_proto::{CreateTournamentRequest, Rpc, TournamentId};

/// In-memory store for testing
#[derive(Default)]
struct MockStore {
    tournaments: Mutex<Vec<Tournament>>,
}

#[async_trait]
impl TournamentStore for MockStore {
    async fn create(&self, id: Uuid, descriptor: TournamentDescriptor) -> anyhow::Result<()> {
        self.tournaments.lock().push(Tournament {
            id,
            descriptor,
            create_time: Utc::now(),
        });
        Ok(())
    }

    async fn get(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Tournament>> {
        Ok(self
            .tournaments
            .lock()
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }
}

async fn echo(_ctx: RpcContext, payload: String) -> Result<String, RpcError> {
    Ok(payload)
}

async fn params(ctx: RpcContext, _payload: String) -> Result<String, RpcError> {
    Ok(serde_json::to_string(&ctx.query_params).unwrap())
}

async fn tagged(_ctx: RpcContext, payload: String) -> Result<String, RpcError> {
    tokio::task::yield_now().await;
    Ok(format!("tagged:{}", payload))
}

fn create_test_service() -> (ConsoleService, Arc<MockStore>) {
    let registry = RpcRegistry::builder()
        .register("echo", echo)
        .unwrap()
        .register("params", params)
        .unwrap()
        .register("tagged", tagged)
        .unwrap()
        .register("admin.echo", echo)
        .unwrap()
        .build();
    let gateway = RpcGateway::new(Arc::new(registry), GatewaySettings::default());
    let store = Arc::new(MockStore::default());
    let service = ConsoleService::new(Arc::new(gateway), TournamentService::new(store.clone()));
    (service, store)
}

fn rpc(id: &str, payload: &str) -> Request<Rpc> {
    Request::new(Rpc {
        id: id.to_string(),
        payload: payload.to_string(),
    })
}

// ============================================================================
// RpcFunc Tests
// ============================================================================

#[tokio::test]
async fn test_gateway_mode_wraps_result() {
    let (service, _) = create_test_service();

    let response = service.rpc_func(rpc("ECHO", r#""hello""#)).await.unwrap();
    let response = response.into_inner();

    assert_eq!(response.payload, r#"{"payload":"hello"}"#);
    assert!(response.id.is_empty());
}

#[tokio::test]
async fn test_gateway_mode_accepts_empty_payload() {
    let (service, _) = create_test_service();

    let response = service.rpc_func(rpc("echo", "")).await.unwrap();
    assert_eq!(response.into_inner().payload, r#"{"payload":""}"#);
}

#[tokio::test]
async fn test_gateway_mode_rejects_non_string_payload() {
    let (service, _) = create_test_service();

    let status = service.rpc_func(rpc("echo", "{\"a\":1}")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "Cannot unmarshal JSON string!");
}

#[tokio::test]
async fn test_raw_mode_passes_payload_through() {
    let (service, _) = create_test_service();

    let mut request = rpc("echo", "{\"a\":1}");
    request
        .metadata_mut()
        .insert("q_unwrap", MetadataValue::from_static(""));

    let response = service.rpc_func(request).await.unwrap().into_inner();
    assert_eq!(response.payload, "{\"a\":1}");
    assert!(response.id.is_empty());
}

#[tokio::test]
async fn test_no_namespace_on_grpc() {
    let (service, _) = create_test_service();

    let status = service.rpc_func(rpc("Unknown", "")).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "RPC function not found: unknown");
}

#[tokio::test]
async fn test_empty_id_is_invalid() {
    let (service, _) = create_test_service();

    let status = service.rpc_func(rpc("", "\"x\"")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "RPC ID must be set");
}

#[tokio::test]
async fn test_metadata_prefix_is_stripped() {
    let (service, _) = create_test_service();

    let mut request = rpc("params", "");
    let metadata = request.metadata_mut();
    metadata.insert("q_limit", MetadataValue::from_static("10"));
    metadata.insert("q_http_key", MetadataValue::from_static("secret"));
    metadata.insert("user-agent", MetadataValue::from_static("grpc-test"));
    metadata.insert("q_unwrap", MetadataValue::from_static(""));

    let response = service.rpc_func(request).await.unwrap();
    let params: serde_json::Value = serde_json::from_str(&response.into_inner().payload).unwrap();

    assert_eq!(params, serde_json::json!({"limit": ["10"], "unwrap": [""]}));
}

#[tokio::test]
async fn test_concurrent_calls_do_not_interfere() {
    let (service, _) = create_test_service();

    let calls = (0..32).map(|i| {
        let service = service.clone();
        async move {
            let id = if i % 2 == 0 { "echo" } else { "tagged" };
            let payload = serde_json::to_string(&format!("call-{}", i)).unwrap();
            let response = service.rpc_func(rpc(id, &payload)).await.unwrap();
            (i, id, response.into_inner().payload)
        }
    });

    for (i, id, payload) in join_all(calls).await {
        let wrapped: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let expected = if id == "echo" {
            format!("call-{}", i)
        } else {
            format!("tagged:call-{}", i)
        };
        assert_eq!(wrapped["payload"], expected);
    }
}

// ============================================================================
// Tournament Tests
// ============================================================================

fn tournament_request() -> CreateTournamentRequest {
    CreateTournamentRequest {
        title: "Spring Open".to_string(),
        operator: "best".to_string(),
        sort_order: 7,
        duration: 600,
        reset_schedule: "0 0 * * *".to_string(),
        start_time: 100,
        end_time: 200,
        max_size: 50,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_and_get_tournament() {
    let (service, store) = create_test_service();

    let created = service
        .create_tournament(Request::new(tournament_request()))
        .await
        .unwrap()
        .into_inner();
    assert!(Uuid::parse_str(&created.id).is_ok());
    assert_eq!(store.tournaments.lock().len(), 1);

    let tournament = service
        .get_tournament(Request::new(TournamentId { id: created.id.clone() }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(tournament.id, created.id);
    assert_eq!(tournament.title, "Spring Open");
    assert_eq!(tournament.sort_order, 1);
    assert_eq!(tournament.operator, "best");
    assert_eq!(tournament.metadata, "{}");
    assert_eq!(tournament.reset_schedule, "0 0 * * *");
    assert_eq!(tournament.max_size, 50);
}

#[tokio::test]
async fn test_invalid_tournament_is_not_stored() {
    let (service, store) = create_test_service();

    let request = CreateTournamentRequest {
        end_time: 50,
        ..tournament_request()
    };
    let status = service
        .create_tournament(Request::new(request))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(
        status.message(),
        "endTime must be > startTime. Use 0 to indicate a tournament that never ends."
    );
    assert!(store.tournaments.lock().is_empty());
}

#[tokio::test]
async fn test_get_tournament_errors() {
    let (service, _) = create_test_service();

    let status = service
        .get_tournament(Request::new(TournamentId { id: "bogus".to_string() }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = service
        .get_tournament(Request::new(TournamentId {
            id: Uuid::new_v4().to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "No such tournament.");
}
