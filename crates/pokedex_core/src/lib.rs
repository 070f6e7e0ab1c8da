//! Core domain logic for the Pokedex record store.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::pokemon::{
    BaseStats, NewPokemon, Pokemon, PokemonId, PokemonInput, PokemonType,
    PokemonValidationError, NAME_MAX_CHARS,
};
pub use repo::memory_repo::InMemoryPokemonRepository;
pub use repo::pokemon_repo::{
    PokemonRepository, RepoError, RepoResult, SqlitePokemonRepository,
};
pub use service::pokemon_service::{PokemonService, ServiceError, ServiceResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
