use pix_domain::{Note, NoteId};
use pix_service::{MediaStore, NoteStore};

use crate::{media::MediaDir, notes::NoteDb};

/// File-backed host: notes from the JSON database, images into a media folder.
///
/// Note updates only touch the in-memory database; call [`NoteDb::save`] to persist them.
#[derive(Debug)]
pub struct EngineHost {
	db: NoteDb,
	media: MediaDir,
}
impl EngineHost {
	pub fn new(db: NoteDb, media: MediaDir) -> Self {
		Self { db, media }
	}

	pub fn db(&self) -> &NoteDb {
		&self.db
	}

	pub fn media(&self) -> &MediaDir {
		&self.media
	}
}
impl NoteStore for EngineHost {
	fn note(&self, id: NoteId) -> pix_service::Result<Note> {
		self.db
			.get(id)
			.cloned()
			.ok_or_else(|| pix_service::Error::host(format!("Note {id} is not in the database.")))
	}

	fn update_note(&mut self, note: &Note) -> pix_service::Result<()> {
		if self.db.replace(note) {
			Ok(())
		} else {
			Err(pix_service::Error::host(format!("Note {} is not in the database.", note.id)))
		}
	}
}
impl MediaStore for EngineHost {
	fn write_media(&mut self, proposed_name: &str, bytes: &[u8]) -> pix_service::Result<String> {
		self.media.store(proposed_name, bytes).map_err(|err| {
			let message = match std::error::Error::source(&err) {
				Some(source) => format!("{err} {source}"),
				None => err.to_string(),
			};

			pix_service::Error::host(message)
		})
	}
}
