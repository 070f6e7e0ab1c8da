//! Pokemon use-case service.
//!
//! # Responsibility
//! - Validate caller input before anything reaches the repository.
//! - Run every write as one unit of work (commit on success, rollback on error).
//!
//! # Invariants
//! - Invalid input never produces a repository write.
//! - Negative and unknown ids are both reported as `InvalidArgument`.
//! - Service layer remains storage-agnostic.

use crate::model::pokemon::{Pokemon, PokemonId, PokemonInput, PokemonValidationError};
use crate::repo::pokemon_repo::{PokemonRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for Pokemon use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input violates a field constraint.
    Validation(PokemonValidationError),
    /// Lookup key is out of range or matches no record.
    InvalidArgument(String),
    /// Persistence-layer failure, passed through unchanged.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidArgument(_) => None,
        }
    }
}

impl From<PokemonValidationError> for ServiceError {
    fn from(value: PokemonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service for Pokemon CRUD.
pub struct PokemonService<R: PokemonRepository> {
    repo: R,
}

impl<R: PokemonRepository> PokemonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates one record from `input`.
    ///
    /// # Contract
    /// - Requires `name` and `type`; `id` is ignored.
    /// - Returns `true` once the record is committed.
    pub fn create(&self, input: &PokemonInput) -> ServiceResult<bool> {
        let draft = match input.to_new_pokemon() {
            Ok(draft) => draft,
            Err(err) => {
                warn!("event=pokemon_create module=service status=rejected reason={err}");
                return Err(err.into());
            }
        };

        let created = self.in_unit_of_work("pokemon_create", |repo| repo.add(&draft))?;
        info!(
            "event=pokemon_create module=service status=ok id={} type={}",
            created.id, created.kind
        );
        Ok(true)
    }

    /// Updates an existing record and returns its new state.
    ///
    /// # Contract
    /// - Input is validated before lookup.
    /// - Record is located by `id` when present, otherwise by exact `name`.
    /// - Stats are overwritten; `name`/`type` only when provided.
    pub fn update(&self, input: &PokemonInput) -> ServiceResult<Pokemon> {
        if let Err(err) = input.validate_partial() {
            warn!("event=pokemon_update module=service status=rejected reason={err}");
            return Err(err.into());
        }

        let mut pokemon = self.locate(input)?;
        pokemon.apply(input);

        self.in_unit_of_work("pokemon_update", |repo| repo.update(&pokemon))?;
        info!(
            "event=pokemon_update module=service status=ok id={}",
            pokemon.id
        );
        Ok(pokemon)
    }

    /// Deletes a record by id.
    ///
    /// Returns `false` when no record had this id.
    pub fn delete(&self, id: PokemonId) -> ServiceResult<bool> {
        ensure_non_negative(id)?;
        let removed = self.in_unit_of_work("pokemon_delete", |repo| repo.remove(id))?;
        info!("event=pokemon_delete module=service status=ok id={id} removed={removed}");
        Ok(removed)
    }

    /// Gets one record by id.
    pub fn get_by_id(&self, id: PokemonId) -> ServiceResult<Pokemon> {
        ensure_non_negative(id)?;
        self.repo
            .get(id)?
            .ok_or_else(|| ServiceError::InvalidArgument(format!("no pokemon with id {id}")))
    }

    /// Lists every record ordered by id.
    pub fn get_all(&self) -> ServiceResult<Vec<Pokemon>> {
        Ok(self.repo.get_all()?)
    }

    fn locate(&self, input: &PokemonInput) -> ServiceResult<Pokemon> {
        match (input.id, input.name.as_deref()) {
            (Some(id), _) => self.get_by_id(id),
            (None, Some(name)) => self.repo.find_by_name(name)?.ok_or_else(|| {
                ServiceError::InvalidArgument("no pokemon with the given name".to_string())
            }),
            (None, None) => Err(ServiceError::InvalidArgument(
                "update requires an id or a name".to_string(),
            )),
        }
    }

    fn in_unit_of_work<T>(
        &self,
        event: &'static str,
        work: impl FnOnce(&R) -> RepoResult<T>,
    ) -> ServiceResult<T> {
        let result = work(&self.repo).and_then(|value| {
            self.repo.commit()?;
            Ok(value)
        });

        if let Err(err) = &result {
            warn!("event={event} module=service status=error error={err}");
            if let Err(rollback_err) = self.repo.rollback() {
                warn!(
                    "event={event} module=service status=error error_code=rollback_failed error={rollback_err}"
                );
            }
        }

        Ok(result?)
    }
}

fn ensure_non_negative(id: PokemonId) -> ServiceResult<()> {
    if id < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "id must be non-negative, got {id}"
        )));
    }
    Ok(())
}
