use pix_config::ImagePosition;
use pix_domain::{Note, NoteId, field};
use pix_providers::SearchResult;

use crate::{BatchSettings, ItemOutcome, ItemStage, MediaStore, NoteStore, Providers, SkipReason};

/// A note that passed eligibility, with the keyword derived from it.
#[derive(Clone, Debug)]
pub(crate) struct QueuedNote {
	pub(crate) note: Note,
	pub(crate) keyword: String,
	pub(crate) target_index: usize,
}

pub(crate) fn queue_note<H>(
	host: &H,
	note_id: NoteId,
	settings: &BatchSettings,
) -> Result<QueuedNote, SkipReason>
where
	H: NoteStore,
{
	let note = match host.note(note_id) {
		Ok(note) => note,
		Err(err) => {
			tracing::warn!(note_id = %note_id, error = %err, "Failed to load note.");

			return Err(SkipReason::NoteMissing);
		},
	};
	let eligible = field::check_eligibility(&note, &settings.source_field, &settings.target_field)
		.map_err(SkipReason::Ineligible)?;

	Ok(QueuedNote { note, keyword: eligible.keyword, target_index: eligible.target_index })
}

/// Downloads `hit`, stores it in the host media folder and splices it into the note.
pub(crate) async fn attach_image<H>(
	providers: &Providers,
	position: ImagePosition,
	host: &mut H,
	item: QueuedNote,
	hit: &SearchResult,
) -> ItemOutcome
where
	H: NoteStore + MediaStore,
{
	let QueuedNote { mut note, keyword, target_index } = item;
	let asset = match providers.fetch.fetch(&hit.url, &keyword).await {
		Ok(asset) => asset,
		Err(err) => {
			log_provider_error(note.id, ItemStage::Downloading, &err);

			return ItemOutcome::Failed(ItemStage::Downloading);
		},
	};
	let stored = match host.write_media(&asset.filename, &asset.bytes) {
		Ok(stored) => stored,
		Err(err) => {
			tracing::warn!(
				note_id = %note.id,
				filename = %asset.filename,
				error = %err,
				"Failed to write image into media store."
			);

			return ItemOutcome::Failed(ItemStage::Downloading);
		},
	};

	if stored != asset.filename {
		tracing::debug!(proposed = %asset.filename, stored = %stored, "Media store renamed image.");
	}

	let original = note.field_value(target_index).unwrap_or_default().to_string();

	if !note.set_field_value(target_index, field::place_image(&original, &stored, position)) {
		tracing::error!(note_id = %note.id, target_index, "Target field vanished from note.");

		return ItemOutcome::Failed(ItemStage::Mutating);
	}

	match host.update_note(&note) {
		Ok(()) => {
			tracing::info!(
				note_id = %note.id,
				keyword = %keyword,
				filename = %stored,
				"Note updated."
			);

			ItemOutcome::Processed { filename: stored }
		},
		Err(err) => {
			tracing::error!(
				note_id = %note.id,
				filename = %stored,
				error = %err,
				"Failed to save note. Stored image is unreferenced."
			);

			ItemOutcome::Unsaved { filename: stored }
		},
	}
}

pub(crate) fn log_provider_error(note_id: NoteId, stage: ItemStage, err: &pix_providers::Error) {
	tracing::warn!(
		note_id = %note_id,
		stage = %stage,
		status = ?err.status().map(|status| status.as_u16()),
		timeout = err.is_timeout(),
		error = %err,
		"Image provider request failed."
	);
}
