use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SOURCE_FIELD: &str = "Front";
pub const DEFAULT_LANGUAGE: &str = "fr";
pub const DEFAULT_PER_PAGE: u32 = 3;

/// Add-on settings persisted as a flat JSON document.
///
/// Keys this version does not know about are kept in `extra` so that a file written by an
/// older or newer release survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub pixabay_api_key: String,
	#[serde(default = "default_source_field")]
	pub source_field: String,
	/// Field that receives the image. `None` means the keyword field itself.
	#[serde(default)]
	pub target_field: Option<String>,
	#[serde(default)]
	pub image_type: ImageCategory,
	#[serde(default)]
	pub image_position: ImagePosition,
	#[serde(default = "default_language")]
	pub language: String,
	#[serde(default = "default_per_page")]
	pub per_page: u32,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Config {
	pub fn target_field(&self) -> &str {
		self.target_field.as_deref().unwrap_or(&self.source_field)
	}
}
impl Default for Config {
	fn default() -> Self {
		Self {
			pixabay_api_key: String::new(),
			source_field: default_source_field(),
			target_field: None,
			image_type: ImageCategory::default(),
			image_position: ImagePosition::default(),
			language: default_language(),
			per_page: default_per_page(),
			extra: Map::new(),
		}
	}
}

/// Image-type filter sent to the search API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
	#[default]
	Illustration,
	Photo,
	Vector,
	All,
}
impl ImageCategory {
	pub const ALL: [Self; 4] = [Self::Illustration, Self::Photo, Self::Vector, Self::All];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Illustration => "illustration",
			Self::Photo => "photo",
			Self::Vector => "vector",
			Self::All => "all",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|category| category.as_str().eq_ignore_ascii_case(raw.trim()))
	}
}
impl fmt::Display for ImageCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where the image tag lands relative to the existing field content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePosition {
	#[default]
	After,
	Before,
	Replace,
}
impl ImagePosition {
	pub const ALL: [Self; 3] = [Self::After, Self::Before, Self::Replace];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::After => "after",
			Self::Before => "before",
			Self::Replace => "replace",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|position| position.as_str().eq_ignore_ascii_case(raw.trim()))
	}
}
impl fmt::Display for ImagePosition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn default_source_field() -> String {
	DEFAULT_SOURCE_FIELD.to_string()
}

fn default_language() -> String {
	DEFAULT_LANGUAGE.to_string()
}

fn default_per_page() -> u32 {
	DEFAULT_PER_PAGE
}
