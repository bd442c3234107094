//! Logging utilities for the Clinibook application.
//!
//! This module provides a standardized approach to logging across all crates
//! in the Clinibook application. It wraps the tracing subscriber setup so that
//! binaries and tests initialize logging the same way.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default log level (INFO).
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Respects `RUST_LOG` when set; otherwise filters the `clinibook` crates at
/// the given level. Uses `try_init` so repeated calls (e.g. from tests) are
/// harmless.
pub fn init_with_level(level: Level) {
    let filter = match format!("clinibook={level}").parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
