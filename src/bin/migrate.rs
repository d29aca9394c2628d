//! Applies the embedded schema migrations to the configured database.
//!
//! `contacts-migrate` applies every pending migration;
//! `contacts-migrate revert` reverts the most recent one.

use std::env;

use dotenvy::dotenv;

use contacts_app::db::{establish_connection_pool, revert_last_migration, run_pending_migrations};
use contacts_app::models::config::ServerConfig;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let server_config = match ServerConfig::load(&app_env) {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("Failed to establish database connection: {err}");
            std::process::exit(1);
        }
    };

    let result = match env::args().nth(1).as_deref() {
        None | Some("run") => run_pending_migrations(&pool).map(|applied| {
            if applied.is_empty() {
                log::info!("Database schema is up to date");
            }
        }),
        Some("revert") => revert_last_migration(&pool).map(|_| ()),
        Some(other) => {
            log::error!("Unknown command `{other}`, expected `run` or `revert`");
            std::process::exit(2);
        }
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
