mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_LANGUAGE, DEFAULT_PER_PAGE, DEFAULT_SOURCE_FIELD, ImageCategory,
	ImagePosition,
};

use std::{fs, io::ErrorKind, path::Path};

use serde_json::{Map, Value};

/// Upper bound the search API accepts for `per_page`.
pub const MAX_PER_PAGE: u32 = 200;
/// Lower bound the search API accepts for `per_page`.
pub const MIN_PER_PAGE: u32 = 3;

/// Loads the config at `path`, filling missing keys with defaults.
///
/// A missing file is not an error; it yields the default config.
pub fn load(path: &Path) -> Result<Config> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
		Err(err) => return Err(Error::ReadConfig { path: path.to_path_buf(), source: err }),
	};
	let mut cfg: Config = serde_json::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Writes `cfg` to `path` with read-merge-write semantics.
///
/// Keys already on disk that `cfg` does not carry are kept; keys `cfg` carries win.
pub fn save(path: &Path, cfg: &Config) -> Result<()> {
	validate(cfg)?;

	let mut merged = read_document(path)?;
	let Value::Object(current) = serde_json::to_value(cfg)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?
	else {
		return Err(Error::Validation { message: "Config must serialize to an object.".to_string() });
	};

	for (key, value) in current {
		merged.insert(key, value);
	}

	let rendered = serde_json::to_string_pretty(&Value::Object(merged))
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent)
			.map_err(|err| Error::WriteConfig { path: path.to_path_buf(), source: err })?;
	}

	fs::write(path, format!("{rendered}\n"))
		.map_err(|err| Error::WriteConfig { path: path.to_path_buf(), source: err })
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.source_field.trim().is_empty() {
		return Err(Error::Validation { message: "source_field must be non-empty.".to_string() });
	}
	if let Some(target) = cfg.target_field.as_deref()
		&& target.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "target_field must be non-empty when set.".to_string(),
		});
	}
	if cfg.language.trim().is_empty() {
		return Err(Error::Validation { message: "language must be non-empty.".to_string() });
	}
	if !(MIN_PER_PAGE..=MAX_PER_PAGE).contains(&cfg.per_page) {
		return Err(Error::Validation {
			message: format!("per_page must be in the range {MIN_PER_PAGE}-{MAX_PER_PAGE}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.pixabay_api_key = cfg.pixabay_api_key.trim().to_string();

	if cfg.target_field.as_deref().map(|field| field.trim().is_empty()).unwrap_or(false) {
		cfg.target_field = None;
	}
}

fn read_document(path: &Path) -> Result<Map<String, Value>> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
		Err(err) => return Err(Error::ReadConfig { path: path.to_path_buf(), source: err }),
	};

	match serde_json::from_str::<Value>(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?
	{
		Value::Object(map) => Ok(map),
		_ => Err(Error::Validation {
			message: format!("Config file at {path:?} must contain a JSON object."),
		}),
	}
}
