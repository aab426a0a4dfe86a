pub mod batch;
pub mod picker;

mod error;
mod pipeline;

pub use batch::{
	BatchPlan, BatchProgress, BatchReport, BatchRunner, BatchSettings, BatchSummary, ItemOutcome,
	ItemStage, SkipReason,
};
pub use error::{Error, Result};
pub use picker::ImagePicker;

use std::{
	future::Future,
	pin::Pin,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use pix_config::{Config, ImageCategory};
use pix_domain::{Note, NoteId};
use pix_providers::{DownloadedAsset, ImageDownloader, PixabayClient, SearchResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Host-side note storage.
pub trait NoteStore {
	fn note(&self, id: NoteId) -> Result<Note>;

	/// Persists every field of `note` back to the host.
	fn update_note(&mut self, note: &Note) -> Result<()>;
}

/// Host-managed media folder.
pub trait MediaStore {
	/// Stores `bytes` and returns the filename actually used, which may differ from
	/// `proposed_name`.
	fn write_media(&mut self, proposed_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Progress display and cancellation affordance polled by the batch runner.
pub trait Progress {
	fn report(&mut self, progress: &BatchProgress<'_>);

	fn is_cancelled(&self) -> bool;
}

pub trait ImageSearch
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		keyword: &'a str,
		category: ImageCategory,
		count: u32,
	) -> BoxFuture<'a, pix_providers::Result<Vec<SearchResult>>>;
}

pub trait ImageFetch
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		url: &'a str,
		keyword: &'a str,
	) -> BoxFuture<'a, pix_providers::Result<DownloadedAsset>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn ImageSearch>,
	pub fetch: Arc<dyn ImageFetch>,
}
impl Providers {
	pub fn new(search: Arc<dyn ImageSearch>, fetch: Arc<dyn ImageFetch>) -> Self {
		Self { search, fetch }
	}

	/// Builds the HTTP-backed providers, failing fast when no API key is configured.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let search = PixabayClient::from_config(cfg)?;
		let fetch = ImageDownloader::new()?;

		Ok(Self::new(Arc::new(search), Arc::new(fetch)))
	}
}

/// Shared cancellation switch, safe to flip from a signal handler task.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);
impl CancelFlag {
	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}
impl Progress for CancelFlag {
	fn report(&mut self, progress: &BatchProgress<'_>) {
		tracing::debug!(
			note_id = %progress.note_id,
			position = progress.index + 1,
			total = progress.total,
			"Processing note."
		);
	}

	fn is_cancelled(&self) -> bool {
		CancelFlag::is_cancelled(self)
	}
}

impl ImageSearch for PixabayClient {
	fn search<'a>(
		&'a self,
		keyword: &'a str,
		category: ImageCategory,
		count: u32,
	) -> BoxFuture<'a, pix_providers::Result<Vec<SearchResult>>> {
		Box::pin(PixabayClient::search(self, keyword, category, count))
	}
}

impl ImageFetch for ImageDownloader {
	fn fetch<'a>(
		&'a self,
		url: &'a str,
		keyword: &'a str,
	) -> BoxFuture<'a, pix_providers::Result<DownloadedAsset>> {
		Box::pin(self.download(url, keyword))
	}
}
