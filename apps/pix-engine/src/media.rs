use std::{
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Hex digits of the content hash appended to a renamed file.
const HASH_SUFFIX_LEN: usize = 8;

/// Flat media folder standing in for the host's collection media directory.
#[derive(Clone, Debug)]
pub struct MediaDir {
	root: PathBuf,
}
impl MediaDir {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Writes `bytes` under `proposed_name` and returns the name actually used.
	///
	/// An existing file with identical content is reused as is. A file with different content
	/// keeps its name and the new bytes go to `<stem>-<hash><ext>` instead.
	pub fn store(&self, proposed_name: &str, bytes: &[u8]) -> Result<String> {
		check_name(proposed_name)?;

		fs::create_dir_all(&self.root)
			.map_err(|err| Error::Write { path: self.root.clone(), source: err })?;

		let proposed_path = self.root.join(proposed_name);
		let name = match fs::read(&proposed_path) {
			Ok(existing) if existing == bytes => return Ok(proposed_name.to_string()),
			Ok(_) => hashed_name(proposed_name, bytes),
			Err(err) if err.kind() == ErrorKind::NotFound => proposed_name.to_string(),
			Err(err) => return Err(Error::Read { path: proposed_path, source: err }),
		};
		let path = self.root.join(&name);

		fs::write(&path, bytes).map_err(|err| Error::Write { path, source: err })?;

		Ok(name)
	}
}

/// `photo.png` becomes `photo-<first 8 hex of blake3(bytes)>.png`.
pub fn hashed_name(name: &str, bytes: &[u8]) -> String {
	let hash = blake3::hash(bytes).to_hex();
	let suffix = &hash.as_str()[..HASH_SUFFIX_LEN];

	match name.rsplit_once('.') {
		Some((stem, extension)) if !stem.is_empty() => format!("{stem}-{suffix}.{extension}"),
		_ => format!("{name}-{suffix}"),
	}
}

fn check_name(name: &str) -> Result<()> {
	if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
		return Err(Error::Validation { message: format!("Refusing media file name {name:?}.") });
	}

	Ok(())
}
