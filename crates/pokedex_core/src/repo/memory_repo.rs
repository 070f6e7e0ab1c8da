//! In-memory Pokemon repository.
//!
//! Same staging semantics as the SQLite implementation: writes land in a
//! staged snapshot that `commit` promotes and `rollback` discards.

use crate::model::pokemon::{NewPokemon, Pokemon, PokemonId};
use crate::repo::pokemon_repo::{PokemonRepository, RepoError, RepoResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Snapshot {
    rows: BTreeMap<PokemonId, Pokemon>,
    next_id: PokemonId,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    committed: Snapshot,
    staged: Option<Snapshot>,
}

impl MemoryState {
    fn view(&self) -> &Snapshot {
        self.staged.as_ref().unwrap_or(&self.committed)
    }

    fn stage(&mut self) -> &mut Snapshot {
        let committed = &self.committed;
        self.staged.get_or_insert_with(|| committed.clone())
    }
}

/// Process-local repository backed by ordered maps.
#[derive(Debug, Default)]
pub struct InMemoryPokemonRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryPokemonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether uncommitted writes are pending.
    pub fn has_pending_changes(&self) -> bool {
        self.lock().is_ok_and(|state| state.staged.is_some())
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepoError::InvalidData("in-memory repository lock poisoned".to_string()))
    }
}

impl PokemonRepository for InMemoryPokemonRepository {
    fn add(&self, pokemon: &NewPokemon) -> RepoResult<Pokemon> {
        pokemon.validate()?;
        let mut state = self.lock()?;
        let staged = state.stage();

        let id = staged.next_id;
        staged.next_id += 1;
        let created = pokemon.clone().into_pokemon(id);
        staged.rows.insert(id, created.clone());
        Ok(created)
    }

    fn get(&self, id: PokemonId) -> RepoResult<Option<Pokemon>> {
        Ok(self.lock()?.view().rows.get(&id).cloned())
    }

    fn get_all(&self) -> RepoResult<Vec<Pokemon>> {
        Ok(self.lock()?.view().rows.values().cloned().collect())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>> {
        Ok(self
            .lock()?
            .view()
            .rows
            .values()
            .find(|pokemon| pokemon.name == name)
            .cloned())
    }

    fn update(&self, pokemon: &Pokemon) -> RepoResult<()> {
        pokemon.validate()?;
        let mut state = self.lock()?;
        if !state.view().rows.contains_key(&pokemon.id) {
            return Err(RepoError::NotFound(pokemon.id));
        }
        state.stage().rows.insert(pokemon.id, pokemon.clone());
        Ok(())
    }

    fn remove(&self, id: PokemonId) -> RepoResult<bool> {
        let mut state = self.lock()?;
        Ok(state.stage().rows.remove(&id).is_some())
    }

    fn commit(&self) -> RepoResult<()> {
        let mut state = self.lock()?;
        if let Some(staged) = state.staged.take() {
            state.committed = staged;
        }
        Ok(())
    }

    fn rollback(&self) -> RepoResult<()> {
        self.lock()?.staged = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryPokemonRepository;
    use crate::model::pokemon::{BaseStats, NewPokemon, PokemonType};
    use crate::repo::pokemon_repo::PokemonRepository;

    fn squirtle() -> NewPokemon {
        NewPokemon::new("Squirtle", PokemonType::Water, BaseStats::default()).unwrap()
    }

    #[test]
    fn rollback_discards_staged_rows() {
        let repo = InMemoryPokemonRepository::new();
        repo.add(&squirtle()).unwrap();
        assert!(repo.has_pending_changes());
        assert_eq!(repo.get_all().unwrap().len(), 1);

        repo.rollback().unwrap();
        assert!(!repo.has_pending_changes());
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let repo = InMemoryPokemonRepository::new();
        let first = repo.add(&squirtle()).unwrap();
        repo.commit().unwrap();
        assert!(repo.remove(first.id).unwrap());
        repo.commit().unwrap();

        let second = repo.add(&squirtle()).unwrap();
        assert!(second.id > first.id);
    }
}
