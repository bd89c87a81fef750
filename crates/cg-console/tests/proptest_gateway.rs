//! Gateway property-based tests.
//!
//! Covers:
//! - gRPC gateway-compatible round trip for arbitrary payload strings
//! - Raw mode returns function output unchanged on both surfaces
//! - Case-insensitive ids, namespaced only on HTTP
//! - Tournament rules that hold regardless of the other fields

use std::sync::Arc;

use proptest::prelude::*;

use cg_console::{
    ConsoleError, CreateTournament, GatewaySettings, RequestEnvelope, RpcContext, RpcError,
    RpcGateway, RpcRegistry, TournamentDescriptor, Transport,
};

async fn echo(_ctx: RpcContext, payload: String) -> Result<String, RpcError> {
    Ok(payload)
}

fn gateway() -> RpcGateway {
    let registry = RpcRegistry::builder()
        .register("echo", echo)
        .unwrap()
        .register("admin.echo", echo)
        .unwrap()
        .build();
    RpcGateway::new(Arc::new(registry), GatewaySettings::default())
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn case_variant(id: &str, mask: &[bool]) -> String {
    id.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
        .collect()
}

proptest! {
    #[test]
    fn grpc_wrapped_result_round_trips(payload in any::<String>()) {
        let gateway = gateway();
        let encoded = serde_json::to_string(&payload).unwrap();

        let result = block_on(gateway.invoke(
            Transport::Grpc,
            RequestEnvelope::new("echo", encoded),
        ))
        .unwrap();

        let wrapped: serde_json::Value = serde_json::from_str(&result.payload).unwrap();
        prop_assert_eq!(wrapped["payload"].as_str(), Some(payload.as_str()));
    }

    #[test]
    fn raw_mode_is_identity_on_both_surfaces(payload in any::<String>()) {
        let gateway = gateway();

        for (transport, key) in [(Transport::Grpc, "q_unwrap"), (Transport::Http, "unwrap")] {
            let request = RequestEnvelope::new("echo", payload.clone()).with_metadata(key, "");
            let result = block_on(gateway.invoke(transport, request)).unwrap();
            prop_assert_eq!(&result.payload, &payload);
        }
    }

    #[test]
    fn ids_are_case_insensitive(mask in proptest::collection::vec(any::<bool>(), 1..8)) {
        let gateway = gateway();
        let id = case_variant("echo", &mask);

        let grpc = block_on(gateway.invoke(Transport::Grpc, RequestEnvelope::new(id.clone(), "")));
        prop_assert!(grpc.is_ok());

        let http = block_on(gateway.invoke(Transport::Http, RequestEnvelope::new(id, "")));
        prop_assert!(http.is_ok());
    }

    #[test]
    fn unknown_ids_report_surface_namespace(id in "[a-z][a-z0-9_]{0,15}") {
        prop_assume!(id != "echo");
        let gateway = gateway();

        let http = block_on(gateway.invoke(Transport::Http, RequestEnvelope::new(id.clone(), "")));
        match http {
            Err(ConsoleError::NotFound { message }) => {
                prop_assert_eq!(message, format!("RPC function not found: admin.{}", id));
            }
            other => prop_assert!(false, "unexpected result: {:?}", other),
        }

        let grpc = block_on(gateway.invoke(Transport::Grpc, RequestEnvelope::new(id.clone(), "")));
        match grpc {
            Err(ConsoleError::NotFound { message }) => {
                prop_assert_eq!(message, format!("RPC function not found: {}", id));
            }
            other => prop_assert!(false, "unexpected result: {:?}", other),
        }
    }

    #[test]
    fn zero_duration_always_fails(
        category in any::<i32>(),
        sort_order in any::<i32>(),
        start_time in any::<i64>(),
        end_time in any::<i64>(),
        max_size in any::<i32>(),
    ) {
        let request = CreateTournament {
            category,
            sort_order,
            operator: "best".to_string(),
            duration: 0,
            start_time,
            end_time,
            max_size,
            ..Default::default()
        };

        let err = TournamentDescriptor::validate(request).unwrap_err();
        prop_assert_eq!(err.to_string(), "Duration must be > 0");
    }

    #[test]
    fn open_ended_tournaments_accept_any_start(start_time in 0i64..i64::MAX) {
        let request = CreateTournament {
            operator: "set".to_string(),
            duration: 1,
            start_time,
            end_time: 0,
            ..Default::default()
        };

        prop_assert!(TournamentDescriptor::validate(request).is_ok());
    }
}
