#![allow(dead_code)]

use std::{
	collections::{BTreeMap, HashSet},
	sync::{Arc, Mutex},
};

use pix_config::ImageCategory;
use pix_domain::{Note, NoteId, media};
use pix_providers::{DownloadedAsset, SearchResult};
use pix_service::{
	BatchProgress, BoxFuture, Error, ImageFetch, ImageSearch, MediaStore, NoteStore, Progress,
	Providers, Result,
};

#[derive(Default)]
pub struct MemoryHost {
	pub notes: BTreeMap<NoteId, Note>,
	pub media: BTreeMap<String, Vec<u8>>,
	pub failing_updates: HashSet<NoteId>,
	pub failing_media: bool,
	pub rename_media: bool,
	pub updates: usize,
}
impl MemoryHost {
	pub fn with_note(mut self, id: i64, fields: &[(&str, &str)]) -> Self {
		let fields =
			fields.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect();

		self.notes.insert(NoteId(id), Note::new(NoteId(id), fields));

		self
	}

	pub fn field(&self, id: i64, name: &str) -> String {
		let note = self.notes.get(&NoteId(id)).expect("Unknown note.");
		let index = note.field_index(name).expect("Unknown field.");

		note.field_value(index).unwrap_or_default().to_string()
	}
}
impl NoteStore for MemoryHost {
	fn note(&self, id: NoteId) -> Result<Note> {
		self.notes.get(&id).cloned().ok_or_else(|| Error::host(format!("Note {id} not found.")))
	}

	fn update_note(&mut self, note: &Note) -> Result<()> {
		if self.failing_updates.contains(&note.id) {
			return Err(Error::host("Collection is locked."));
		}

		self.updates += 1;
		self.notes.insert(note.id, note.clone());

		Ok(())
	}
}
impl MediaStore for MemoryHost {
	fn write_media(&mut self, proposed_name: &str, bytes: &[u8]) -> Result<String> {
		if self.failing_media {
			return Err(Error::host("Media folder is read-only."));
		}

		let name = if self.rename_media {
			format!("renamed_{proposed_name}")
		} else {
			proposed_name.to_string()
		};

		self.media.insert(name.clone(), bytes.to_vec());

		Ok(name)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCall {
	pub keyword: String,
	pub category: ImageCategory,
	pub count: u32,
}

/// Answers every keyword with `hits` results unless scripted otherwise.
#[derive(Default)]
pub struct FakeSearch {
	pub hits: u32,
	pub empty_keywords: HashSet<String>,
	pub failing_keywords: HashSet<String>,
	pub calls: Mutex<Vec<SearchCall>>,
}
impl FakeSearch {
	pub fn with_hits(hits: u32) -> Self {
		Self { hits, ..Self::default() }
	}

	pub fn calls(&self) -> Vec<SearchCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl ImageSearch for FakeSearch {
	fn search<'a>(
		&'a self,
		keyword: &'a str,
		category: ImageCategory,
		count: u32,
	) -> BoxFuture<'a, pix_providers::Result<Vec<SearchResult>>> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(SearchCall {
			keyword: keyword.to_string(),
			category,
			count,
		});

		let result = if self.failing_keywords.contains(keyword) {
			Err(pix_providers::Error::InvalidResponse { message: "Scripted failure.".to_string() })
		} else if self.empty_keywords.contains(keyword) {
			Ok(Vec::new())
		} else {
			Ok((0..self.hits.min(count))
				.map(|index| SearchResult {
					url: format!("https://img.test/{keyword}/{index}.jpg"),
					preview_url: format!("https://img.test/{keyword}/{index}_preview.jpg"),
					tags: format!("{keyword}, {index}"),
				})
				.collect())
		};

		Box::pin(async move { result })
	}
}

/// Returns the URL itself as the image bytes so tests can tell images apart.
#[derive(Default)]
pub struct FakeFetch {
	pub failing_urls: HashSet<String>,
	pub fetched: Mutex<Vec<String>>,
}
impl FakeFetch {
	pub fn fetched(&self) -> Vec<String> {
		self.fetched.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl ImageFetch for FakeFetch {
	fn fetch<'a>(
		&'a self,
		url: &'a str,
		keyword: &'a str,
	) -> BoxFuture<'a, pix_providers::Result<DownloadedAsset>> {
		self.fetched.lock().unwrap_or_else(|err| err.into_inner()).push(url.to_string());

		let result = if self.failing_urls.contains(url) {
			Err(pix_providers::Error::InvalidResponse { message: "Scripted failure.".to_string() })
		} else {
			Ok(DownloadedAsset {
				bytes: url.as_bytes().to_vec(),
				filename: media::media_filename(keyword, ".jpg"),
			})
		};

		Box::pin(async move { result })
	}
}

pub fn providers(search: &Arc<FakeSearch>, fetch: &Arc<FakeFetch>) -> Providers {
	Providers::new(search.clone(), fetch.clone())
}

/// Records reports and asks for cancellation once `limit` items were reported.
pub struct CancelAfter {
	pub limit: usize,
	pub reports: Vec<(usize, usize, NoteId, String)>,
}
impl CancelAfter {
	pub fn new(limit: usize) -> Self {
		Self { limit, reports: Vec::new() }
	}

	pub fn never() -> Self {
		Self::new(usize::MAX)
	}
}
impl Progress for CancelAfter {
	fn report(&mut self, progress: &BatchProgress<'_>) {
		self.reports.push((
			progress.index,
			progress.total,
			progress.note_id,
			progress.keyword.to_string(),
		));
	}

	fn is_cancelled(&self) -> bool {
		self.reports.len() >= self.limit
	}
}
