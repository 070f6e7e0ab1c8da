use pokedex_core::db::open_db_in_memory;
use pokedex_core::{
    BaseStats, NewPokemon, Pokemon, PokemonInput, PokemonRepository, PokemonService,
    PokemonType, PokemonValidationError, ServiceError, SqlitePokemonRepository,
};
use rusqlite::Connection;

fn charmander_input() -> PokemonInput {
    PokemonInput {
        name: Some("Charmander".to_string()),
        kind: Some(PokemonType::Fire),
        stats: charmander_stats(),
        ..PokemonInput::default()
    }
}

fn charmander_stats() -> BaseStats {
    BaseStats {
        attack: 15,
        defense: 10,
        health: 15,
        special_attack: 15,
        special_defense: 5,
        speed: 15,
    }
}

fn bad_name_input() -> PokemonInput {
    PokemonInput {
        name: Some("a".repeat(260)),
        ..charmander_input()
    }
}

fn seed_charmander(conn: &Connection) -> Pokemon {
    let repo = SqlitePokemonRepository::try_new(conn).unwrap();
    let draft = NewPokemon::new("Charmander", PokemonType::Fire, charmander_stats()).unwrap();
    let created = repo.add(&draft).unwrap();
    repo.commit().unwrap();
    created
}

fn count_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM pokemons;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_single_pokemon_returns_true() {
    let conn = open_db_in_memory().unwrap();
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    assert!(service.create(&charmander_input()).unwrap());

    let all = service.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Charmander");
    assert_eq!(all[0].kind, PokemonType::Fire);
    assert_eq!(all[0].stats, charmander_stats());
}

#[test]
fn create_is_durable_after_service_is_dropped() {
    let conn = open_db_in_memory().unwrap();
    {
        let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());
        service.create(&charmander_input()).unwrap();
    }
    assert_eq!(count_rows(&conn), 1);
}

#[test]
fn create_with_bad_name_returns_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    let err = service.create(&bad_name_input()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(PokemonValidationError::NameTooLong { len: 260, max: 255 })
    ));
    assert_eq!(count_rows(&conn), 0);
}

#[test]
fn create_without_name_returns_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());
    let input = PokemonInput {
        name: None,
        ..charmander_input()
    };

    let err = service.create(&input).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(PokemonValidationError::NameRequired)
    ));
}

#[test]
fn update_with_bad_name_returns_validation_error_and_keeps_record() {
    let conn = open_db_in_memory().unwrap();
    let existing = seed_charmander(&conn);
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    let input = PokemonInput {
        id: Some(existing.id),
        ..bad_name_input()
    };
    let err = service.update(&input).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert_eq!(service.get_by_id(existing.id).unwrap(), existing);
}

#[test]
fn delete_existing_pokemon_returns_true() {
    let conn = open_db_in_memory().unwrap();
    let existing = seed_charmander(&conn);
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    assert!(service.delete(existing.id).unwrap());
    assert!(service.repository().get(existing.id).unwrap().is_none());
    assert!(matches!(
        service.get_by_id(existing.id),
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[test]
fn delete_missing_pokemon_returns_false() {
    let conn = open_db_in_memory().unwrap();
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    assert!(!service.delete(42).unwrap());
    assert!(matches!(
        service.delete(-1),
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[test]
fn update_existing_pokemon_returns_updated_pokemon() {
    let conn = open_db_in_memory().unwrap();
    let existing = seed_charmander(&conn);
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    let new_stats = BaseStats {
        attack: 35,
        defense: 5,
        health: 15,
        special_attack: 20,
        special_defense: 10,
        speed: 25,
    };
    let input = PokemonInput {
        id: Some(existing.id),
        stats: new_stats,
        ..PokemonInput::default()
    };

    let updated = service.update(&input).unwrap();
    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.name, "Charmander");
    assert_eq!(updated.kind, PokemonType::Fire);
    assert_eq!(updated.stats, new_stats);
    assert_eq!(service.get_by_id(existing.id).unwrap(), updated);
}

#[test]
fn update_can_rename_and_retype() {
    let conn = open_db_in_memory().unwrap();
    let existing = seed_charmander(&conn);
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    let input = PokemonInput {
        id: Some(existing.id),
        name: Some("Charmeleon".to_string()),
        kind: Some(PokemonType::Dragon),
        stats: charmander_stats(),
    };
    let updated = service.update(&input).unwrap();
    assert_eq!(updated.name, "Charmeleon");
    assert_eq!(updated.kind, PokemonType::Dragon);
}

#[test]
fn update_unknown_id_returns_invalid_argument() {
    let conn = open_db_in_memory().unwrap();
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());
    let input = PokemonInput {
        id: Some(100),
        ..charmander_input()
    };

    assert!(matches!(
        service.update(&input),
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[test]
fn get_by_id_existing_pokemon_returns_pokemon_with_correct_id() {
    let conn = open_db_in_memory().unwrap();
    let existing = seed_charmander(&conn);
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    let loaded = service.get_by_id(existing.id).unwrap();
    assert_eq!(loaded.id, existing.id);
    assert_eq!(loaded, existing);
}

#[test]
fn get_by_id_invalid_id_returns_invalid_argument() {
    let conn = open_db_in_memory().unwrap();
    let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());

    for id in [-1, -3, 100] {
        let err = service.get_by_id(id).unwrap_err();
        assert!(
            matches!(err, ServiceError::InvalidArgument(_)),
            "id {id} produced {err}"
        );
    }
}

#[test]
fn get_all_returns_every_added_pokemon() {
    for count in [5, 10, 15] {
        let conn = open_db_in_memory().unwrap();
        let service = PokemonService::new(SqlitePokemonRepository::try_new(&conn).unwrap());
        for _ in 0..count {
            service.create(&charmander_input()).unwrap();
        }

        let all = service.get_all().unwrap();
        assert_eq!(all.len(), count);
        assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));
    }
}
