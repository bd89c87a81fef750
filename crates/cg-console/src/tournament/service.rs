use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use super::descriptor::{CreateTournament, TournamentDescriptor};
use crate::error::{ConsoleError, Result};

/// A tournament as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tournament {
    pub id: Uuid,
    pub descriptor: TournamentDescriptor,
    pub create_time: DateTime<Utc>,
}

/// Persistence for tournaments, provided by the embedding application.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn create(&self, id: Uuid, descriptor: TournamentDescriptor) -> anyhow::Result<()>;

    /// Fetch the tournaments with the given ids. Unknown ids are skipped.
    async fn get(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Tournament>>;
}

/// Validates provisioning requests and forwards them to a [`TournamentStore`].
#[derive(Clone)]
pub struct TournamentService {
    store: Arc<dyn TournamentStore>,
}

impl TournamentService {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateTournament) -> Result<Uuid> {
        let descriptor = TournamentDescriptor::validate(request)?;
        let id = Uuid::new_v4();

        self.store.create(id, descriptor).await.map_err(|e| {
            error!(tournament_id = %id, error = %e, "Error creating tournament");
            ConsoleError::internal("An error occurred while trying to create the tournament.")
        })?;

        info!(tournament_id = %id, "Tournament created");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Tournament> {
        let id = Uuid::parse_str(id)
            .ok()
            .filter(|id| !id.is_nil())
            .ok_or_else(|| ConsoleError::invalid_argument("Requires a valid tournament ID."))?;

        let tournaments = self.store.get(&[id]).await.map_err(|e| {
            error!(tournament_id = %id, error = %e, "Error retrieving tournament");
            ConsoleError::internal("An error occurred while trying get the tournament.")
        })?;

        tournaments
            .into_iter()
            .find(|tournament| tournament.id == id)
            .ok_or_else(|| ConsoleError::not_found("No such tournament."))
    }
}
