use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {path:?}.")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Failed to write {path:?}.")]
	Write { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse note database at {path:?}.")]
	Parse { path: PathBuf, source: serde_json::Error },
	#[error("{message}")]
	Validation { message: String },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
