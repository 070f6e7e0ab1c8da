//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence context consumed by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage transport errors.

pub mod memory_repo;
pub mod pokemon_repo;
