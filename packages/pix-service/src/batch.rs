use std::fmt;

use serde::Serialize;

use crate::{
	MediaStore, NoteStore, Progress, Providers,
	pipeline::{self, QueuedNote},
};
use pix_config::{Config, ImageCategory, ImagePosition};
use pix_domain::{NoteId, field::Ineligible};

/// Per-run settings resolved from the config once, before the batch starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSettings {
	pub source_field: String,
	pub target_field: String,
	pub category: ImageCategory,
	pub position: ImagePosition,
}
impl BatchSettings {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			source_field: cfg.source_field.clone(),
			target_field: cfg.target_field().to_string(),
			category: cfg.image_type,
			position: cfg.image_position,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
	Searching,
	Downloading,
	Mutating,
}
impl fmt::Display for ItemStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Searching => "searching",
			Self::Downloading => "downloading",
			Self::Mutating => "mutating",
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
	NoteMissing,
	Ineligible(Ineligible),
}
impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::NoteMissing => "note not found",
			Self::Ineligible(Ineligible::SourceFieldMissing) => "source field missing",
			Self::Ineligible(Ineligible::TargetFieldMissing) => "target field missing",
			Self::Ineligible(Ineligible::EmptyKeyword) => "empty keyword",
			Self::Ineligible(Ineligible::HasImage) => "already has an image",
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
	Processed { filename: String },
	Failed(ItemStage),
	/// The note was mutated but the host refused to persist it.
	Unsaved { filename: String },
}

/// Reported once per item, before the item is worked on.
#[derive(Clone, Copy, Debug)]
pub struct BatchProgress<'a> {
	pub index: usize,
	pub total: usize,
	pub note_id: NoteId,
	pub keyword: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
	pub processed: Vec<NoteId>,
	pub failed: Vec<(NoteId, ItemStage)>,
	pub skipped: Vec<(NoteId, SkipReason)>,
	pub unsaved: Vec<NoteId>,
	pub cancelled: bool,
}
impl BatchReport {
	pub fn summary(&self) -> BatchSummary {
		BatchSummary {
			processed: self.processed.len(),
			failed: self.failed.len(),
			skipped: self.skipped.len(),
			unsaved: self.unsaved.len(),
			cancelled: self.cancelled,
		}
	}

	fn record(&mut self, note_id: NoteId, outcome: ItemOutcome) {
		match outcome {
			ItemOutcome::Processed { .. } => self.processed.push(note_id),
			ItemOutcome::Failed(stage) => self.failed.push((note_id, stage)),
			ItemOutcome::Unsaved { .. } => self.unsaved.push(note_id),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
	pub processed: usize,
	pub failed: usize,
	pub skipped: usize,
	pub unsaved: usize,
	pub cancelled: bool,
}
impl fmt::Display for BatchSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"processed={} failed={} skipped={} unsaved={}",
			self.processed, self.failed, self.skipped, self.unsaved
		)?;

		if self.cancelled {
			f.write_str(" (cancelled)")?;
		}

		Ok(())
	}
}

/// The eligible queue plus everything filtered out while building it.
#[derive(Debug, Default)]
pub struct BatchPlan {
	queue: Vec<QueuedNote>,
	pub skipped: Vec<(NoteId, SkipReason)>,
}
impl BatchPlan {
	pub fn queued(&self) -> impl Iterator<Item = NoteId> + '_ {
		self.queue.iter().map(|item| item.note.id)
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}

/// Runs search, download and mutation over the selected notes, strictly one at a time.
pub struct BatchRunner {
	settings: BatchSettings,
	providers: Providers,
}
impl BatchRunner {
	pub fn new(settings: BatchSettings, providers: Providers) -> Self {
		Self { settings, providers }
	}

	pub fn settings(&self) -> &BatchSettings {
		&self.settings
	}

	/// Evaluates eligibility once per note. Items are not re-checked while the batch runs.
	pub fn plan<H>(&self, host: &H, note_ids: &[NoteId]) -> BatchPlan
	where
		H: NoteStore,
	{
		let mut plan = BatchPlan::default();

		for &note_id in note_ids {
			match pipeline::queue_note(host, note_id, &self.settings) {
				Ok(item) => plan.queue.push(item),
				Err(reason) => {
					tracing::debug!(note_id = %note_id, reason = %reason, "Skipping note.");

					plan.skipped.push((note_id, reason));
				},
			}
		}

		plan
	}

	pub async fn run<H, P>(
		&self,
		host: &mut H,
		note_ids: &[NoteId],
		progress: &mut P,
	) -> BatchReport
	where
		H: NoteStore + MediaStore,
		P: Progress,
	{
		let plan = self.plan(&*host, note_ids);

		self.run_plan(host, plan, progress).await
	}

	pub async fn run_plan<H, P>(
		&self,
		host: &mut H,
		plan: BatchPlan,
		progress: &mut P,
	) -> BatchReport
	where
		H: NoteStore + MediaStore,
		P: Progress,
	{
		let BatchPlan { queue, skipped } = plan;
		let total = queue.len();
		let mut report = BatchReport { skipped, ..BatchReport::default() };

		tracing::info!(queued = total, skipped = report.skipped.len(), "Starting batch.");

		for (index, item) in queue.into_iter().enumerate() {
			if progress.is_cancelled() {
				tracing::info!(remaining = total - index, "Batch cancelled.");

				report.cancelled = true;

				break;
			}

			let note_id = item.note.id;

			progress.report(&BatchProgress { index, total, note_id, keyword: &item.keyword });

			let outcome = self.process(host, item).await;

			report.record(note_id, outcome);

			// Hand control back to the executor between items.
			tokio::task::yield_now().await;
		}

		tracing::info!(summary = %report.summary(), "Batch finished.");

		report
	}

	async fn process<H>(&self, host: &mut H, item: QueuedNote) -> ItemOutcome
	where
		H: NoteStore + MediaStore,
	{
		let note_id = item.note.id;
		let searched =
			self.providers.search.search(&item.keyword, self.settings.category, 1).await;
		let hit = match searched {
			Ok(results) => match results.into_iter().next() {
				Some(hit) => hit,
				None => {
					tracing::info!(note_id = %note_id, keyword = %item.keyword, "No image found.");

					return ItemOutcome::Failed(ItemStage::Searching);
				},
			},
			Err(err) => {
				pipeline::log_provider_error(note_id, ItemStage::Searching, &err);

				return ItemOutcome::Failed(ItemStage::Searching);
			},
		};

		pipeline::attach_image(&self.providers, self.settings.position, host, item, &hit).await
	}
}
