use std::path::Path;

use uuid::Uuid;

pub const DEFAULT_EXTENSION: &str = ".jpg";
const RANDOM_ID_LEN: usize = 8;
const MAX_URL_EXTENSION_LEN: usize = 5;

/// Replaces every non-alphanumeric character with an underscore.
pub fn sanitize_keyword(keyword: &str) -> String {
	keyword.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect()
}

pub fn random_id() -> String {
	Uuid::new_v4().simple().to_string()[..RANDOM_ID_LEN].to_string()
}

/// Proposes `<sanitized-keyword>_<8 hex><ext>` for a downloaded image.
pub fn media_filename(keyword: &str, extension: &str) -> String {
	format!("{}_{}{}", sanitize_keyword(keyword), random_id(), extension)
}

/// Picks a file extension from the declared content type, then the URL path.
pub fn infer_extension(content_type: Option<&str>, url: &str) -> String {
	if let Some(ext) = content_type.and_then(extension_from_content_type) {
		return ext.to_string();
	}

	extension_from_url(url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
	let lowered = content_type.to_ascii_lowercase();

	if lowered.contains("png") {
		Some(".png")
	} else if lowered.contains("gif") {
		Some(".gif")
	} else if lowered.contains("jpeg") || lowered.contains("jpg") {
		Some(".jpg")
	} else {
		None
	}
}

fn extension_from_url(url: &str) -> Option<String> {
	let without_query = url.split(['?', '#']).next().unwrap_or_default();
	let path = match without_query.split_once("://") {
		Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or_default(),
		None => without_query,
	};
	let last_segment = path.rsplit('/').next().unwrap_or_default();
	let ext = Path::new(last_segment).extension()?.to_str()?;

	if ext.is_empty()
		|| ext.len() > MAX_URL_EXTENSION_LEN
		|| !ext.chars().all(|c| c.is_ascii_alphanumeric())
	{
		return None;
	}

	Some(format!(".{}", ext.to_ascii_lowercase()))
}
