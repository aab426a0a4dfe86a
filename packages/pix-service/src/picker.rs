use pix_domain::NoteId;
use pix_providers::SearchResult;

use crate::{
	BatchSettings, Error, ItemOutcome, MediaStore, NoteStore, Providers, Result,
	pipeline::{self, QueuedNote},
};

pub const DEFAULT_CANDIDATES: u32 = 8;

/// Multi-result mode: list several candidates for one note, then apply the chosen one.
pub struct ImagePicker {
	settings: BatchSettings,
	providers: Providers,
}
impl ImagePicker {
	pub fn new(settings: BatchSettings, providers: Providers) -> Self {
		Self { settings, providers }
	}

	/// Returns up to `count` ranked candidates for the note's keyword.
	///
	/// Unlike the batch path, search failures are returned to the caller instead of being
	/// folded into an outcome, since a person is waiting on the answer.
	pub async fn candidates<H>(
		&self,
		host: &H,
		note_id: NoteId,
		count: u32,
	) -> Result<Vec<SearchResult>>
	where
		H: NoteStore,
	{
		let item = self.queue(host, note_id)?;
		let results =
			self.providers.search.search(&item.keyword, self.settings.category, count).await?;

		tracing::info!(
			note_id = %note_id,
			keyword = %item.keyword,
			candidates = results.len(),
			"Collected image candidates."
		);

		Ok(results)
	}

	/// Downloads `choice` and splices it into the note, re-checking eligibility first.
	pub async fn apply<H>(
		&self,
		host: &mut H,
		note_id: NoteId,
		choice: &SearchResult,
	) -> Result<ItemOutcome>
	where
		H: NoteStore + MediaStore,
	{
		let item = self.queue(&*host, note_id)?;
		let outcome =
			pipeline::attach_image(&self.providers, self.settings.position, host, item, choice)
				.await;

		Ok(outcome)
	}

	fn queue<H>(&self, host: &H, note_id: NoteId) -> Result<QueuedNote>
	where
		H: NoteStore,
	{
		pipeline::queue_note(host, note_id, &self.settings)
			.map_err(|reason| Error::NotEligible { note_id, reason })
	}
}

/// Picks the candidate at `index`, reporting how many exist when it is out of range.
pub fn choose(candidates: &[SearchResult], index: usize) -> Result<&SearchResult> {
	candidates
		.get(index)
		.ok_or(Error::NoSuchCandidate { index, available: candidates.len() })
}
