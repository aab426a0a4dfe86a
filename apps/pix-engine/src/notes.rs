use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{Error, Result};
use pix_domain::{Note, NoteId};

const NOTES_KEY: &str = "notes";
const ID_KEY: &str = "id";

/// Note database kept in one JSON document: `{"notes": [{"id": 1, "Source": "..."}]}`.
///
/// Every key of a note other than `id` is a field, in document order. Saving writes the
/// loaded document back and only rewrites the fields that changed in replaced notes.
#[derive(Debug)]
pub struct NoteDb {
	path: PathBuf,
	doc: Value,
	notes: Vec<Note>,
	changed: HashSet<NoteId>,
}
impl NoteDb {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;
		let doc: Value = serde_json::from_str(&raw)
			.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;
		let notes = parse_notes(&doc).map_err(|message| Error::Validation {
			message: format!("Invalid note database at {}: {message}", path.display()),
		})?;

		tracing::info!(path = %path.display(), notes = notes.len(), "Loaded note database.");

		Ok(Self { path: path.to_path_buf(), doc, notes, changed: HashSet::new() })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn notes(&self) -> &[Note] {
		&self.notes
	}

	pub fn ids(&self) -> Vec<NoteId> {
		self.notes.iter().map(|note| note.id).collect()
	}

	pub fn get(&self, id: NoteId) -> Option<&Note> {
		self.notes.iter().find(|note| note.id == id)
	}

	/// Overwrites the stored note with the same id. Returns `false` when no such note exists.
	pub fn replace(&mut self, note: &Note) -> bool {
		match self.notes.iter_mut().find(|stored| stored.id == note.id) {
			Some(stored) => {
				*stored = note.clone();

				self.changed.insert(note.id);

				true
			},
			None => false,
		}
	}

	pub fn save(&self) -> Result<()> {
		let mut doc = self.doc.clone();

		if let Some(entries) = doc.get_mut(NOTES_KEY).and_then(Value::as_array_mut) {
			for entry in entries {
				self.patch_entry(entry);
			}
		}

		let rendered = serde_json::to_string_pretty(&doc)?;

		fs::write(&self.path, format!("{rendered}\n"))
			.map_err(|err| Error::Write { path: self.path.clone(), source: err })?;

		tracing::info!(
			path = %self.path.display(),
			changed = self.changed.len(),
			"Saved note database."
		);

		Ok(())
	}

	/// Overwrites the fields of a replaced note whose text differs from the document.
	fn patch_entry(&self, entry: &mut Value) {
		let Some(map) = entry.as_object_mut() else {
			return;
		};
		let Some(note_id) = map.get(ID_KEY).and_then(Value::as_i64).map(NoteId) else {
			return;
		};

		if !self.changed.contains(&note_id) {
			return;
		}

		let Some(note) = self.get(note_id) else {
			return;
		};

		for (name, value) in note.fields() {
			if map.get(name).is_none_or(|current| field_text(current) != *value) {
				map.insert(name.clone(), Value::String(value.clone()));
			}
		}
	}
}

fn parse_notes(doc: &Value) -> Result<Vec<Note>, String> {
	let entries = doc
		.get(NOTES_KEY)
		.and_then(Value::as_array)
		.ok_or_else(|| format!("expected a top-level `{NOTES_KEY}` array."))?;
	let mut seen = HashSet::new();
	let mut notes = Vec::with_capacity(entries.len());

	for entry in entries {
		let note = note_from_value(entry)?;

		if !seen.insert(note.id) {
			return Err(format!("note id {} appears more than once.", note.id));
		}

		notes.push(note);
	}

	Ok(notes)
}

fn note_from_value(entry: &Value) -> Result<Note, String> {
	let Value::Object(map) = entry else {
		return Err("every note must be an object.".to_string());
	};
	let id = map
		.get(ID_KEY)
		.and_then(Value::as_i64)
		.ok_or_else(|| "every note needs an integer `id`.".to_string())?;
	let fields = map
		.iter()
		.filter(|(name, _)| name.as_str() != ID_KEY)
		.map(|(name, value)| (name.clone(), field_text(value)))
		.collect();

	Ok(Note::new(NoteId(id), fields))
}

fn field_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
