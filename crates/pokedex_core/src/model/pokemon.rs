//! Pokemon domain model.
//!
//! # Responsibility
//! - Define the persisted record, its validated draft and the transfer input.
//! - Own the field validation policy shared by service and repositories.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `name` is non-blank and at most `NAME_MAX_CHARS` characters.
//! - Stats are unsigned, so negative values cannot be represented.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned record identity.
pub type PokemonId = i64;

/// Maximum name length in characters (Unicode scalar values).
pub const NAME_MAX_CHARS: usize = 255;

/// Elemental type of a Pokemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    /// Every variant, in declaration order.
    pub const ALL: [PokemonType; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Grass,
        Self::Electric,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Grass => "grass",
            Self::Electric => "electric",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }

    /// Parses a storage/wire name. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl Display for PokemonType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six base stats carried by every record.
///
/// Missing stats deserialize to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub attack: u32,
    pub defense: u32,
    pub health: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokemonValidationError {
    /// Name is missing or blank after trim.
    NameRequired,
    /// Name exceeds `NAME_MAX_CHARS`.
    NameTooLong { len: usize, max: usize },
    /// Type is missing on create.
    TypeRequired,
}

impl Display for PokemonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "name is required"),
            Self::NameTooLong { len, max } => {
                write!(f, "name must be at most {max} characters, got {len}")
            }
            Self::TypeRequired => write!(f, "type is required"),
        }
    }
}

impl Error for PokemonValidationError {}

/// Checks the name constraint shared by every write path.
pub fn validate_name(name: &str) -> Result<(), PokemonValidationError> {
    if name.trim().is_empty() {
        return Err(PokemonValidationError::NameRequired);
    }
    let len = name.chars().count();
    if len > NAME_MAX_CHARS {
        return Err(PokemonValidationError::NameTooLong {
            len,
            max: NAME_MAX_CHARS,
        });
    }
    Ok(())
}

/// Persisted Pokemon record.
///
/// Deserialization runs `validate()`, so an invalid payload never becomes a
/// `Pokemon` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PokemonWire")]
pub struct Pokemon {
    pub id: PokemonId,
    pub name: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: PokemonType,
    #[serde(flatten)]
    pub stats: BaseStats,
}

impl Pokemon {
    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), PokemonValidationError> {
        validate_name(&self.name)
    }

    /// Applies an update input in place.
    ///
    /// # Contract
    /// - `id` is never touched.
    /// - `name` and `kind` are replaced only when present in `input`.
    /// - `stats` are always replaced.
    /// - Callers must validate `input` first.
    pub fn apply(&mut self, input: &PokemonInput) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(kind) = input.kind {
            self.kind = kind;
        }
        self.stats = input.stats;
    }
}

#[derive(Deserialize)]
struct PokemonWire {
    id: PokemonId,
    name: String,
    #[serde(rename = "type")]
    kind: PokemonType,
    #[serde(flatten)]
    stats: BaseStats,
}

impl TryFrom<PokemonWire> for Pokemon {
    type Error = PokemonValidationError;

    fn try_from(value: PokemonWire) -> Result<Self, Self::Error> {
        let pokemon = Pokemon {
            id: value.id,
            name: value.name,
            kind: value.kind,
            stats: value.stats,
        };
        pokemon.validate()?;
        Ok(pokemon)
    }
}

/// Validated record draft awaiting a store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPokemon {
    pub name: String,
    pub kind: PokemonType,
    pub stats: BaseStats,
}

impl NewPokemon {
    /// Builds a draft and validates it.
    pub fn new(
        name: impl Into<String>,
        kind: PokemonType,
        stats: BaseStats,
    ) -> Result<Self, PokemonValidationError> {
        let draft = Self {
            name: name.into(),
            kind,
            stats,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<(), PokemonValidationError> {
        validate_name(&self.name)
    }

    /// Attaches the store-assigned id.
    pub fn into_pokemon(self, id: PokemonId) -> Pokemon {
        Pokemon {
            id,
            name: self.name,
            kind: self.kind,
            stats: self.stats,
        }
    }
}

/// Transfer input for create and update.
///
/// Missing optional fields deserialize to `None`; missing stats to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonInput {
    #[serde(default)]
    pub id: Option<PokemonId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<PokemonType>,
    #[serde(flatten)]
    pub stats: BaseStats,
}

impl PokemonInput {
    /// Validates fields that are present, as required by update.
    pub fn validate_partial(&self) -> Result<(), PokemonValidationError> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }

    /// Validates a create request and produces the draft to persist.
    pub fn to_new_pokemon(&self) -> Result<NewPokemon, PokemonValidationError> {
        let name = self
            .name
            .as_deref()
            .ok_or(PokemonValidationError::NameRequired)?;
        validate_name(name)?;
        let kind = self.kind.ok_or(PokemonValidationError::TypeRequired)?;
        Ok(NewPokemon {
            name: name.to_string(),
            kind,
            stats: self.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_name, PokemonType, PokemonValidationError, NAME_MAX_CHARS};

    #[test]
    fn validate_name_accepts_exact_limit() {
        assert!(validate_name(&"a".repeat(NAME_MAX_CHARS)).is_ok());
    }

    #[test]
    fn validate_name_counts_characters_not_bytes() {
        let name = "é".repeat(NAME_MAX_CHARS);
        assert!(name.len() > NAME_MAX_CHARS);
        assert!(validate_name(&name).is_ok());
    }

    #[test]
    fn validate_name_rejects_blank() {
        assert_eq!(
            validate_name("   "),
            Err(PokemonValidationError::NameRequired)
        );
    }

    #[test]
    fn type_names_parse_back() {
        for kind in PokemonType::ALL {
            assert_eq!(PokemonType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PokemonType::parse("shadow"), None);
    }
}
