//! Domain model for Pokemon records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the data they constrain.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `PokemonId`.
//! - Deletion is a hard delete; ids are never reused.

pub mod pokemon;
