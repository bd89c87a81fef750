//! gRPC Surface
//!
//! `console.v1.Console` service: function invocation through the dispatch
//! gateway plus tournament provisioning.

use std::sync::Arc;

use cg_proto::console_server::Console;
use cg_proto::{CreateTournamentRequest, Rpc, Tournament as TournamentProto, TournamentId};
use tonic::metadata::{KeyAndValueRef, MetadataMap};
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::dispatch::{CallerAddress, RequestEnvelope, RpcGateway, Transport};
use crate::runtime::Metadata;
use crate::tournament::{CreateTournament, Tournament, TournamentService};

const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Clone)]
pub struct ConsoleService {
    gateway: Arc<RpcGateway>,
    tournaments: TournamentService,
}

impl ConsoleService {
    pub fn new(gateway: Arc<RpcGateway>, tournaments: TournamentService) -> Self {
        Self {
            gateway,
            tournaments,
        }
    }

    pub fn into_server(self) -> cg_proto::console_server::ConsoleServer<Self> {
        cg_proto::console_server::ConsoleServer::new(self)
    }
}

#[tonic::async_trait]
impl Console for ConsoleService {
    async fn rpc_func(&self, request: Request<Rpc>) -> Result<Response<Rpc>, Status> {
        let caller = caller_address(&request);
        let metadata = call_metadata(request.metadata());
        let Rpc { id, payload } = request.into_inner();

        debug!(rpc_id = %id, "Console RPC over gRPC");

        let envelope = RequestEnvelope {
            id,
            metadata,
            payload,
            caller,
        };
        let result = self.gateway.invoke(Transport::Grpc, envelope).await?;

        Ok(Response::new(Rpc {
            id: String::new(),
            payload: result.payload,
        }))
    }

    async fn create_tournament(
        &self,
        request: Request<CreateTournamentRequest>,
    ) -> Result<Response<TournamentId>, Status> {
        let id = self
            .tournaments
            .create(CreateTournament::from(request.into_inner()))
            .await?;

        Ok(Response::new(TournamentId { id: id.to_string() }))
    }

    async fn get_tournament(
        &self,
        request: Request<TournamentId>,
    ) -> Result<Response<TournamentProto>, Status> {
        let tournament = self.tournaments.get(&request.into_inner().id).await?;
        Ok(Response::new(TournamentProto::from(tournament)))
    }
}

/// Copy ASCII metadata into gateway metadata. Binary and non-ASCII values
/// cannot carry query params and are skipped.
fn call_metadata(map: &MetadataMap) -> Metadata {
    map.iter().fold(Metadata::new(), |mut metadata, entry| {
        if let KeyAndValueRef::Ascii(key, value) = entry {
            if let Ok(value) = value.to_str() {
                metadata
                    .entry(key.as_str().to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }
        metadata
    })
}

fn caller_address<T>(request: &Request<T>) -> CallerAddress {
    let forwarded_for = request
        .metadata()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok());
    CallerAddress::resolve(forwarded_for, request.remote_addr())
}

impl From<CreateTournamentRequest> for CreateTournament {
    fn from(request: CreateTournamentRequest) -> Self {
        let metadata = Some(request.metadata).filter(|metadata| !metadata.is_empty());
        Self {
            title: request.title,
            description: request.description,
            category: request.category,
            sort_order: request.sort_order,
            operator: request.operator,
            duration: request.duration,
            reset_schedule: request.reset_schedule,
            metadata,
            start_time: request.start_time,
            end_time: request.end_time,
            max_size: request.max_size,
            max_num_score: request.max_num_score,
            join_required: request.join_required,
        }
    }
}

impl From<Tournament> for TournamentProto {
    fn from(tournament: Tournament) -> Self {
        let descriptor = &tournament.descriptor;
        Self {
            id: tournament.id.to_string(),
            title: descriptor.title().to_string(),
            description: descriptor.description().to_string(),
            category: i32::from(descriptor.category()),
            sort_order: descriptor.sort_order().as_i32(),
            operator: descriptor.operator().as_str().to_string(),
            duration: i32::try_from(descriptor.duration()).unwrap_or(i32::MAX),
            reset_schedule: descriptor.reset_schedule().unwrap_or_default().to_string(),
            metadata: descriptor.metadata().to_string(),
            start_time: descriptor.start_time(),
            end_time: descriptor.end_time(),
            max_size: i32::try_from(descriptor.max_size()).unwrap_or(i32::MAX),
            max_num_score: i32::try_from(descriptor.max_num_score()).unwrap_or(i32::MAX),
            join_required: descriptor.join_required(),
            create_time: tournament.create_time.timestamp(),
        }
    }
}
