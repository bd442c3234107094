// --- File: crates/clinibook_config/src/lib.rs ---
//! Typed configuration loading for Clinibook.
//!
//! Configuration is layered: built-in defaults, then an optional config file
//! (`config/default` or the path in `CLINIBOOK_CONFIG`), then environment
//! variables prefixed with `CLINIBOOK_` (double underscore as the section
//! separator, e.g. `CLINIBOOK_SERVER__PORT=8086`).

use config::{Config, ConfigError, Environment, File};

pub mod models;
pub use models::*;

use std::sync::Once;

static DOTENV_INIT: Once = Once::new();

/// Load `.env` once per process so repeated config loads stay cheap.
pub fn ensure_dotenv_loaded() {
    DOTENV_INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Load the application configuration.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_path =
        std::env::var("CLINIBOOK_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    let config = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8086)?
        .add_source(File::with_name(&config_path).required(false))
        .add_source(Environment::with_prefix("CLINIBOOK").separator("__"))
        .build()?;

    config.try_deserialize()
}
