use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);
impl fmt::Display for NoteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A host note seen as an ordered list of named fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
	pub id: NoteId,
	fields: Vec<(String, String)>,
}
impl Note {
	pub fn new(id: NoteId, fields: Vec<(String, String)>) -> Self {
		Self { id, fields }
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|(name, _)| name.as_str())
	}

	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|(field, _)| field == name)
	}

	pub fn field_value(&self, index: usize) -> Option<&str> {
		self.fields.get(index).map(|(_, value)| value.as_str())
	}

	/// Returns `false` when `index` is outside the field layout.
	pub fn set_field_value(&mut self, index: usize, value: String) -> bool {
		match self.fields.get_mut(index) {
			Some((_, slot)) => {
				*slot = value;

				true
			},
			None => false,
		}
	}

	pub fn fields(&self) -> &[(String, String)] {
		&self.fields
	}
}
