//! Pokemon repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the persistence context used by `PokemonService`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `validate()` before SQL mutations.
//! - Writes are staged until `commit`; dropping the repository discards them.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::pokemon::{
    BaseStats, NewPokemon, Pokemon, PokemonId, PokemonType, PokemonValidationError,
};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::cell::Cell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const POKEMON_SELECT_SQL: &str = "SELECT
    id,
    name,
    type,
    attack,
    defense,
    health,
    special_attack,
    special_defense,
    speed
FROM pokemons";

const REQUIRED_TABLE: &str = "pokemons";
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "type",
    "attack",
    "defense",
    "health",
    "special_attack",
    "special_defense",
    "speed",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for Pokemon persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PokemonValidationError),
    Db(DbError),
    NotFound(PokemonId),
    InvalidData(String),
    /// Connection was not opened through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pokemon not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pokemon data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PokemonValidationError> for RepoError {
    fn from(value: PokemonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence context for Pokemon records.
///
/// Writes are staged and become durable only after `commit`.
pub trait PokemonRepository {
    /// Stages a new record and returns it with its store-assigned id.
    fn add(&self, pokemon: &NewPokemon) -> RepoResult<Pokemon>;
    fn get(&self, id: PokemonId) -> RepoResult<Option<Pokemon>>;
    /// Returns all records ordered by ascending id.
    fn get_all(&self) -> RepoResult<Vec<Pokemon>>;
    /// Returns the lowest-id record with exactly this name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>>;
    /// Stages a full overwrite of an existing record.
    fn update(&self, pokemon: &Pokemon) -> RepoResult<()>;
    /// Stages removal. Returns whether a record existed.
    fn remove(&self, id: PokemonId) -> RepoResult<bool>;
    /// Makes staged writes durable.
    fn commit(&self) -> RepoResult<()>;
    /// Discards staged writes.
    fn rollback(&self) -> RepoResult<()>;
}

impl<R: PokemonRepository + ?Sized> PokemonRepository for &R {
    fn add(&self, pokemon: &NewPokemon) -> RepoResult<Pokemon> {
        (**self).add(pokemon)
    }

    fn get(&self, id: PokemonId) -> RepoResult<Option<Pokemon>> {
        (**self).get(id)
    }

    fn get_all(&self) -> RepoResult<Vec<Pokemon>> {
        (**self).get_all()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>> {
        (**self).find_by_name(name)
    }

    fn update(&self, pokemon: &Pokemon) -> RepoResult<()> {
        (**self).update(pokemon)
    }

    fn remove(&self, id: PokemonId) -> RepoResult<bool> {
        (**self).remove(id)
    }

    fn commit(&self) -> RepoResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> RepoResult<()> {
        (**self).rollback()
    }
}

/// SQLite-backed Pokemon repository.
///
/// Staging uses a transaction opened by the first write. When the caller
/// already holds a transaction on the connection, writes join it and
/// `commit`/`rollback` are left to the caller.
pub struct SqlitePokemonRepository<'conn> {
    conn: &'conn Connection,
    owns_tx: Cell<bool>,
}

impl<'conn> SqlitePokemonRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            owns_tx: Cell::new(false),
        })
    }

    /// Returns whether uncommitted writes are pending.
    pub fn has_pending_changes(&self) -> bool {
        self.owns_tx.get()
    }

    fn stage(&self) -> RepoResult<()> {
        if !self.owns_tx.get() && self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN IMMEDIATE;")?;
            self.owns_tx.set(true);
        }
        Ok(())
    }
}

impl PokemonRepository for SqlitePokemonRepository<'_> {
    fn add(&self, pokemon: &NewPokemon) -> RepoResult<Pokemon> {
        pokemon.validate()?;
        self.stage()?;

        self.conn.execute(
            "INSERT INTO pokemons (
                name,
                type,
                attack,
                defense,
                health,
                special_attack,
                special_defense,
                speed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                pokemon.name.as_str(),
                pokemon.kind.as_str(),
                pokemon.stats.attack,
                pokemon.stats.defense,
                pokemon.stats.health,
                pokemon.stats.special_attack,
                pokemon.stats.special_defense,
                pokemon.stats.speed,
            ],
        )?;

        Ok(pokemon.clone().into_pokemon(self.conn.last_insert_rowid()))
    }

    fn get(&self, id: PokemonId) -> RepoResult<Option<Pokemon>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POKEMON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pokemon_row(row)?));
        }
        Ok(None)
    }

    fn get_all(&self) -> RepoResult<Vec<Pokemon>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POKEMON_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut pokemons = Vec::new();
        while let Some(row) = rows.next()? {
            pokemons.push(parse_pokemon_row(row)?);
        }
        Ok(pokemons)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POKEMON_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pokemon_row(row)?));
        }
        Ok(None)
    }

    fn update(&self, pokemon: &Pokemon) -> RepoResult<()> {
        pokemon.validate()?;
        self.stage()?;

        let changed = self.conn.execute(
            "UPDATE pokemons
             SET
                name = ?1,
                type = ?2,
                attack = ?3,
                defense = ?4,
                health = ?5,
                special_attack = ?6,
                special_defense = ?7,
                speed = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9;",
            params![
                pokemon.name.as_str(),
                pokemon.kind.as_str(),
                pokemon.stats.attack,
                pokemon.stats.defense,
                pokemon.stats.health,
                pokemon.stats.special_attack,
                pokemon.stats.special_defense,
                pokemon.stats.speed,
                pokemon.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(pokemon.id));
        }
        Ok(())
    }

    fn remove(&self, id: PokemonId) -> RepoResult<bool> {
        self.stage()?;
        let changed = self
            .conn
            .execute("DELETE FROM pokemons WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn commit(&self) -> RepoResult<()> {
        if self.owns_tx.get() {
            self.conn.execute_batch("COMMIT;")?;
            self.owns_tx.set(false);
        }
        Ok(())
    }

    fn rollback(&self) -> RepoResult<()> {
        if self.owns_tx.get() {
            self.owns_tx.set(false);
            self.conn.execute_batch("ROLLBACK;")?;
        }
        Ok(())
    }
}

impl Drop for SqlitePokemonRepository<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.rollback() {
            warn!("event=repo_drop module=repo status=error error_code=rollback_failed error={err}");
        }
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [REQUIRED_TABLE],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(REQUIRED_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({REQUIRED_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<HashSet<_>, _>>()?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !columns.contains(**column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: REQUIRED_TABLE,
            column: *column,
        });
    }

    Ok(())
}

fn parse_pokemon_row(row: &Row<'_>) -> RepoResult<Pokemon> {
    let id: PokemonId = row.get("id")?;

    let type_text: String = row.get("type")?;
    let kind = PokemonType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid pokemon type `{type_text}` in pokemons.type"))
    })?;

    let stats = BaseStats {
        attack: parse_stat(row, "attack")?,
        defense: parse_stat(row, "defense")?,
        health: parse_stat(row, "health")?,
        special_attack: parse_stat(row, "special_attack")?,
        special_defense: parse_stat(row, "special_defense")?,
        speed: parse_stat(row, "speed")?,
    };

    let pokemon = Pokemon {
        id,
        name: row.get("name")?,
        kind,
        stats,
    };
    pokemon
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("pokemon {id}: {err}")))?;
    Ok(pokemon)
}

fn parse_stat(row: &Row<'_>, column: &'static str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid stat value `{value}` in pokemons.{column}"))
    })
}
