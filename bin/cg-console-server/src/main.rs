//! Console Gateway Server
//!
//! Serves the administrative console:
//! - HTTP: `/v2/console/rpc/{id}`, `/health`, `/q/openapi`
//! - gRPC: `console.v1.Console`
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CG_CONFIG` | - | Path to a TOML config file |
//! | `CG_HTTP_ADDR` | `0.0.0.0:7351` | HTTP bind address |
//! | `CG_GRPC_ADDR` | `0.0.0.0:7348` | gRPC bind address |
//! | `CG_RPC_NAMESPACE` | `admin.` | Namespace prefixed to HTTP RPC ids |
//! | `CG_LOG_LEVEL` | `info` | Log level |
//! | `CG_LOG_JSON` | `false` | JSON log output |
//! | `RUST_LOG` | - | Overrides `CG_LOG_LEVEL` |

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tokio::{net::TcpListener, signal, sync::watch, task::JoinError};
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{error, info};
use uuid::Uuid;

use cg_config::ConsoleConfig;
use cg_console::api::{create_router, RpcState};
use cg_console::{
    ConsoleService, GatewaySettings, RpcContext, RpcError, RpcGateway, RpcRegistry, Tournament,
    TournamentDescriptor, TournamentService, TournamentStore,
};

/// Console Gateway Server
#[derive(Parser, Debug)]
#[command(name = "cg-console-server")]
#[command(about = "Administrative console gateway over HTTP and gRPC")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, env = "CG_CONFIG")]
    config: Option<PathBuf>,
}

/// Store used when no persistence is wired in: logs creations and finds
/// nothing.
struct LoggingTournamentStore;

#[async_trait]
impl TournamentStore for LoggingTournamentStore {
    async fn create(&self, id: Uuid, descriptor: TournamentDescriptor) -> anyhow::Result<()> {
        info!(
            tournament_id = %id,
            title = %descriptor.title(),
            operator = %descriptor.operator(),
            duration = descriptor.duration(),
            "Tournament accepted (not persisted)"
        );
        Ok(())
    }

    async fn get(&self, _ids: &[Uuid]) -> anyhow::Result<Vec<Tournament>> {
        Ok(Vec::new())
    }
}

async fn echo(_ctx: RpcContext, payload: String) -> Result<String, RpcError> {
    Ok(payload)
}

async fn server_time(_ctx: RpcContext, _payload: String) -> Result<String, RpcError> {
    Ok(chrono::Utc::now().to_rfc3339())
}

fn build_registry() -> Result<RpcRegistry> {
    Ok(RpcRegistry::builder()
        .register("echo", echo)?
        .register("server_time", server_time)?
        .build())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ConsoleConfig::load(args.config.as_deref())?;

    cg_common::logging::init(&config.logging.level, config.logging.json)?;

    info!("Starting Console Gateway Server");
    run(config, shutdown_signal()).await?;
    info!("Console Gateway Server shutdown complete");
    Ok(())
}

/// Bind both surfaces, serve until `shutdown` resolves, then drain.
///
/// Fails if either listener cannot be bound, or if a server stops before
/// `shutdown` resolves.
async fn run<F>(config: ConsoleConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let registry = Arc::new(build_registry()?);
    info!(functions = ?registry.ids(), "RPC functions registered");

    let gateway = Arc::new(RpcGateway::new(registry, GatewaySettings::from(&config.rpc)));
    let tournaments = TournamentService::new(Arc::new(LoggingTournamentStore));

    let http_addr = config.http_addr()?;
    let http_listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP console on {}", http_addr))?;
    let grpc_addr = config.grpc_addr()?;
    let grpc_listener = TcpListener::bind(grpc_addr)
        .await
        .with_context(|| format!("Failed to bind gRPC console on {}", grpc_addr))?;

    info!("HTTP console listening on http://{}", http_listener.local_addr()?);
    info!("gRPC console listening on {}", grpc_listener.local_addr()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // HTTP surface
    let app = create_router(RpcState::new(gateway.clone()));
    let http_shutdown = wait_for(shutdown_rx.clone());
    let mut http_task = tokio::spawn(async move {
        axum::serve(
            http_listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(http_shutdown)
        .await
    });

    // gRPC surface
    let service = ConsoleService::new(gateway, tournaments);
    let grpc_shutdown = wait_for(shutdown_rx);
    let mut grpc_task = tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(service.into_server())
            .serve_with_incoming_shutdown(TcpListenerStream::new(grpc_listener), grpc_shutdown)
            .await
    });

    info!("Console Gateway Server started");
    info!("Press Ctrl+C to shutdown");

    tokio::select! {
        _ = shutdown => {
            info!("Shutdown signal received...");
        }
        result = &mut http_task => {
            let _ = shutdown_tx.send(true);
            return Err(server_stopped("HTTP", result));
        }
        result = &mut grpc_task => {
            let _ = shutdown_tx.send(true);
            return Err(server_stopped("gRPC", result));
        }
    }

    let _ = shutdown_tx.send(true);

    match http_task.await {
        Ok(Err(e)) => error!(error = %e, "HTTP server error"),
        Err(e) => error!(error = %e, "HTTP server task failed"),
        Ok(Ok(())) => {}
    }
    match grpc_task.await {
        Ok(Err(e)) => error!(error = %e, "gRPC server error"),
        Err(e) => error!(error = %e, "gRPC server task failed"),
        Ok(Ok(())) => {}
    }

    Ok(())
}

fn server_stopped<E>(surface: &str, result: Result<Result<(), E>, JoinError>) -> anyhow::Error
where
    E: Into<anyhow::Error>,
{
    let err = match result {
        Ok(Ok(())) => anyhow!("server exited"),
        Ok(Err(e)) => e.into(),
        Err(e) => anyhow::Error::from(e),
    };
    error!(error = %err, "{} console stopped before shutdown", surface);
    err.context(format!("{} console stopped before shutdown", surface))
}

async fn wait_for(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
