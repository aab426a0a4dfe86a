use pix_config::ImagePosition;

use crate::{keyword, note::Note};

/// Case-insensitive opening marker of an embedded image.
pub const IMAGE_MARKER: &str = "<img";
pub const LINE_BREAK: &str = "<br>";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ineligible {
	SourceFieldMissing,
	TargetFieldMissing,
	EmptyKeyword,
	HasImage,
}

/// Where a note's keyword comes from and where its image goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eligible {
	pub keyword: String,
	pub target_index: usize,
}

pub fn has_image(content: &str) -> bool {
	content.to_lowercase().contains(IMAGE_MARKER)
}

pub fn image_tag(filename: &str) -> String {
	format!("<img src=\"{filename}\">")
}

pub fn check_eligibility(
	note: &Note,
	source_field: &str,
	target_field: &str,
) -> Result<Eligible, Ineligible> {
	let source_index = note.field_index(source_field).ok_or(Ineligible::SourceFieldMissing)?;
	let target_index = note.field_index(target_field).ok_or(Ineligible::TargetFieldMissing)?;
	let keyword = keyword::extract_keyword(note.field_value(source_index).unwrap_or_default());

	if keyword.is_empty() {
		return Err(Ineligible::EmptyKeyword);
	}
	if has_image(note.field_value(target_index).unwrap_or_default()) {
		return Err(Ineligible::HasImage);
	}

	Ok(Eligible { keyword, target_index })
}

/// Splices an image reference into `original` at `position`.
pub fn place_image(original: &str, filename: &str, position: ImagePosition) -> String {
	let tag = image_tag(filename);

	match position {
		ImagePosition::After => format!("{original}{LINE_BREAK}{tag}"),
		ImagePosition::Before => format!("{tag}{LINE_BREAK}{original}"),
		ImagePosition::Replace => tag,
	}
}
