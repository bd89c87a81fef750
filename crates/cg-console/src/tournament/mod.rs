//! Tournament Provisioning
//!
//! Validation of tournament creation requests and the read-only lookup used
//! by the console. Storage itself is supplied through [`TournamentStore`].

pub mod descriptor;
pub mod service;

pub use descriptor::{CreateTournament, Operator, SortOrder, TournamentDescriptor};
pub use service::{Tournament, TournamentService, TournamentStore};
