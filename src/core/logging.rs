//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::settings::Settings;

/// Installs the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let filter =
		EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.log_level))?;

	let registry = tracing_subscriber::registry().with(filter);
	if settings.log_json {
		registry.with(fmt::layer().json()).try_init()?;
	} else {
		registry.with(fmt::layer()).try_init()?;
	}

	Ok(())
}
