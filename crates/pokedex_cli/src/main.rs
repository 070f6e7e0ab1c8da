//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pokedex_core` wiring: config, logging, store bootstrap.
//! - Keep output deterministic `key=value` lines for quick sanity checks.

use pokedex_core::{CoreConfig, PokemonService, SqlitePokemonRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();
    let config = CoreConfig::from_env();

    println!("pokedex_core ping={}", pokedex_core::ping());
    println!("pokedex_core version={}", pokedex_core::core_version());

    match run(&config) {
        Ok(count) => {
            println!("pokedex_core store={}", config.store_label());
            println!("pokedex_core pokemon_count={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("pokedex_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> Result<usize, Box<dyn std::error::Error>> {
    if let Some(log_dir) = &config.log_dir {
        pokedex_core::init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = config.open_store()?;
    let repo = SqlitePokemonRepository::try_new(&conn)?;
    let service = PokemonService::new(repo);
    Ok(service.get_all()?.len())
}
