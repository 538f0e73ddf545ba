//! Layered settings.
//!
//! Sources are merged in priority order (environment variables > profile file
//! > base file > defaults). Every source produces a flat key/value map; the
//! merged map is then deserialized into [`Settings`].

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of the environment variables read by [`EnvSource`].
pub const ENV_PREFIX: &str = "PROFILES_";

/// Environment variable naming the settings profile.
pub const PROFILE_VAR: &str = "PROFILES_ENV";

/// Error type for configuration sources
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error reading {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("TOML error in {path}: {source}")]
	Toml {
		path: PathBuf,
		source: toml::de::Error,
	},

	#[error("{path} must contain a table of settings")]
	NotATable { path: PathBuf },

	#[error("invalid settings: {0}")]
	Invalid(#[from] serde_json::Error),
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub debug: bool,
	pub host: String,
	pub port: u16,
	/// `tracing` filter directive used when `RUST_LOG` is unset.
	pub log_level: String,
	/// Emit JSON log lines instead of human-readable text.
	pub log_json: bool,
	/// Seconds open connections may keep running after shutdown starts.
	pub shutdown_timeout: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: true,
			host: "127.0.0.1".to_string(),
			port: 8000,
			log_level: "info".to_string(),
			log_json: false,
			shutdown_timeout: 30,
		}
	}
}

impl Settings {
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	fn load(&self) -> Result<Map<String, Value>, SettingsError>;

	/// Higher priorities override lower ones.
	fn priority(&self) -> u8;

	fn description(&self) -> String;
}

/// Built-in defaults.
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<Map<String, Value>, SettingsError> {
		match serde_json::to_value(Settings::default())? {
			Value::Object(map) => Ok(map),
			_ => Ok(Map::new()),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Defaults".to_string()
	}
}

/// TOML file configuration source; a missing file contributes nothing.
pub struct TomlFileSource {
	path: PathBuf,
	priority: u8,
}

impl TomlFileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			priority: 50,
		}
	}

	pub fn with_priority(mut self, priority: u8) -> Self {
		self.priority = priority;
		self
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<Map<String, Value>, SettingsError> {
		if !self.path.exists() {
			return Ok(Map::new());
		}

		let content = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
			path: self.path.clone(),
			source,
		})?;
		let table: toml::Table = toml::from_str(&content).map_err(|source| SettingsError::Toml {
			path: self.path.clone(),
			source,
		})?;

		match serde_json::to_value(table)? {
			Value::Object(map) => Ok(map),
			_ => Err(SettingsError::NotATable {
				path: self.path.clone(),
			}),
		}
	}

	fn priority(&self) -> u8 {
		self.priority
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source
///
/// `PROFILES_PORT=9000` becomes `port = 9000`.
pub struct EnvSource {
	prefix: String,
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	pub fn new() -> Self {
		Self {
			prefix: ENV_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Reads from `vars` instead of the process environment.
	pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.vars = Some(
			vars.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		);
		self
	}

	fn parse_value(value: String) -> Value {
		match value.trim().to_lowercase().as_str() {
			"true" | "yes" | "on" => return Value::Bool(true),
			"false" | "no" | "off" => return Value::Bool(false),
			_ => {}
		}
		if let Ok(num) = value.parse::<i64>() {
			Value::Number(num.into())
		} else {
			Value::String(value)
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<Map<String, Value>, SettingsError> {
		let vars: Vec<(String, String)> = match &self.vars {
			Some(vars) => vars.clone().into_iter().collect(),
			None => env::vars().collect(),
		};

		Ok(vars
			.into_iter()
			.filter_map(|(key, value)| {
				let key = key.strip_prefix(&self.prefix)?.to_lowercase();
				Some((key, Self::parse_value(value)))
			})
			.collect())
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// Merges configuration sources into [`Settings`].
///
/// # Examples
///
/// ```
/// use profiles_rest_api::config::settings::{DefaultSource, EnvSource, SettingsBuilder};
///
/// let settings = SettingsBuilder::new()
///     .add_source(DefaultSource)
///     .add_source(EnvSource::new().with_vars([("PROFILES_PORT", "9000")]))
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.port, 9000);
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	pub fn build(mut self) -> Result<Settings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = Map::new();
		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(source = %source.description(), keys = values.len(), "loaded settings source");
			merged.extend(values);
		}

		Ok(serde_json::from_value(Value::Object(merged))?)
	}
}

/// Loads settings for the profile named by `PROFILES_ENV` (default `local`)
/// from `<settings_dir>/base.toml`, `<settings_dir>/<profile>.toml` and the
/// environment.
pub fn get_settings(settings_dir: &Path) -> Result<Settings, SettingsError> {
	let profile = env::var(PROFILE_VAR).unwrap_or_else(|_| "local".to_string());

	SettingsBuilder::new()
		.add_source(DefaultSource)
		.add_source(TomlFileSource::new(settings_dir.join("base.toml")).with_priority(50))
		.add_source(
			TomlFileSource::new(settings_dir.join(format!("{profile}.toml"))).with_priority(60),
		)
		.add_source(EnvSource::new())
		.build()
}
