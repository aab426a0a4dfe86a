pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Image search API key is not configured.")]
	MissingApiKey,
	#[error(transparent)]
	Reqwest(reqwest::Error),
	#[error("Image {operation} request failed with status {status}.")]
	Status { operation: &'static str, status: reqwest::StatusCode },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// HTTP status behind the failure, when the server answered at all.
	pub fn status(&self) -> Option<reqwest::StatusCode> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Reqwest(err) => err.status(),
			_ => None,
		}
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Reqwest(err) if err.is_timeout())
	}
}
impl From<reqwest::Error> for Error {
	// Request URLs carry the API key as a query parameter.
	fn from(err: reqwest::Error) -> Self {
		Self::Reqwest(err.without_url())
	}
}
