//! Console Gateway
//!
//! Administrative console core:
//! - Function registry and runtime contract
//! - Dispatch gateway shared by the HTTP and gRPC surfaces
//! - HTTP surface (axum)
//! - gRPC surface (tonic)
//! - Tournament provisioning

pub mod api;
pub mod dispatch;
pub mod error;
pub mod grpc;
pub mod runtime;
pub mod tournament;

pub use dispatch::{
    CallerAddress, FunctionId, GatewaySettings, PayloadMode, RequestEnvelope, ResultEnvelope,
    RpcGateway, Transport,
};
pub use error::{ConsoleError, Result};
pub use grpc::ConsoleService;
pub use runtime::{
    Metadata, RegistryError, RpcContext, RpcError, RpcFunction, RpcRegistry, RpcRegistryBuilder,
    RpcResult,
};
pub use tournament::{
    CreateTournament, Operator, SortOrder, Tournament, TournamentDescriptor, TournamentService,
    TournamentStore,
};
