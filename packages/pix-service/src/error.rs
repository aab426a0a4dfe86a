use pix_domain::NoteId;

use crate::SkipReason;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Image search API key is not configured.")]
	MissingApiKey,
	#[error("Note {note_id} was skipped: {reason}.")]
	NotEligible { note_id: NoteId, reason: SkipReason },
	#[error("Selected result index {index} is out of range; {available} candidates exist.")]
	NoSuchCandidate { index: usize, available: usize },
	#[error("{message}")]
	Host { message: String },
	#[error(transparent)]
	Provider(pix_providers::Error),
	#[error(transparent)]
	Config(#[from] pix_config::Error),
}
impl Error {
	pub fn host(message: impl Into<String>) -> Self {
		Self::Host { message: message.into() }
	}
}
impl From<pix_providers::Error> for Error {
	fn from(err: pix_providers::Error) -> Self {
		match err {
			pix_providers::Error::MissingApiKey => Self::MissingApiKey,
			other => Self::Provider(other),
		}
	}
}
