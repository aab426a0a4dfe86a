use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use pix_config::{
	Config, DEFAULT_LANGUAGE, DEFAULT_PER_PAGE, ImageCategory, MAX_PER_PAGE, MIN_PER_PAGE,
};

pub const DEFAULT_API_BASE: &str = "https://pixabay.com/api/";
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One ranked hit, in API response order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
	/// Medium-resolution image, the one embedded in notes.
	pub url: String,
	pub preview_url: String,
	pub tags: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
	#[serde(rename = "totalHits", default)]
	total_hits: u64,
	#[serde(default)]
	hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
	#[serde(rename = "webformatURL")]
	webformat_url: String,
	#[serde(rename = "previewURL", default)]
	preview_url: String,
	#[serde(default)]
	tags: String,
}

#[derive(Clone, Debug)]
pub struct PixabayClient {
	client: Client,
	api_base: String,
	api_key: String,
	language: String,
	per_page: u32,
}
impl PixabayClient {
	/// Fails with [`Error::MissingApiKey`] before any request is made when `api_key` is blank.
	pub fn new(api_key: &str) -> Result<Self> {
		let api_key = api_key.trim();

		if api_key.is_empty() {
			return Err(Error::MissingApiKey);
		}

		let client = Client::builder().timeout(SEARCH_TIMEOUT).build()?;

		Ok(Self {
			client,
			api_base: DEFAULT_API_BASE.to_string(),
			api_key: api_key.to_string(),
			language: DEFAULT_LANGUAGE.to_string(),
			per_page: DEFAULT_PER_PAGE,
		})
	}

	pub fn from_config(cfg: &Config) -> Result<Self> {
		Ok(Self::new(&cfg.pixabay_api_key)?
			.with_language(&cfg.language)
			.with_per_page(cfg.per_page))
	}

	pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
		self.api_base = api_base.into();

		self
	}

	pub fn with_language(mut self, language: &str) -> Self {
		self.language = language.to_string();

		self
	}

	pub fn with_per_page(mut self, per_page: u32) -> Self {
		self.per_page = per_page;

		self
	}

	/// Searches `category`, retrying once under the fallback category when nothing matches.
	///
	/// Returns at most `count` results. An empty vector means no image was found.
	pub async fn search(
		&self,
		keyword: &str,
		category: ImageCategory,
		count: u32,
	) -> Result<Vec<SearchResult>> {
		let per_page = self.per_page.max(count).clamp(MIN_PER_PAGE, MAX_PER_PAGE);
		let mut results = self.search_category(keyword, category, per_page).await?;

		if results.is_empty()
			&& let Some(fallback) = fallback_category(category)
		{
			tracing::info!(
				keyword,
				%category,
				%fallback,
				"No images found. Retrying with fallback category."
			);

			results = self.search_category(keyword, fallback, per_page).await?;
		}

		results.truncate(count.max(1) as usize);

		Ok(results)
	}

	/// Issues a single search request without any fallback.
	pub async fn search_category(
		&self,
		keyword: &str,
		category: ImageCategory,
		per_page: u32,
	) -> Result<Vec<SearchResult>> {
		let per_page = per_page.to_string();
		let res = self
			.client
			.get(&self.api_base)
			.query(&[
				("key", self.api_key.as_str()),
				("q", keyword),
				("image_type", category.as_str()),
				("lang", self.language.as_str()),
				("safesearch", "true"),
				("per_page", per_page.as_str()),
			])
			.send()
			.await?;
		let status = res.status();

		if !status.is_success() {
			return Err(Error::Status { operation: "search", status });
		}

		let body = res.text().await?;

		parse_search_response(&body)
	}
}

/// The only fallback is illustration to photo; every other category stands alone.
pub fn fallback_category(category: ImageCategory) -> Option<ImageCategory> {
	match category {
		ImageCategory::Illustration => Some(ImageCategory::Photo),
		ImageCategory::Photo | ImageCategory::Vector | ImageCategory::All => None,
	}
}

fn parse_search_response(body: &str) -> Result<Vec<SearchResult>> {
	let response: SearchResponse = serde_json::from_str(body).map_err(|err| {
		Error::InvalidResponse { message: format!("Search response is not valid JSON: {err}.") }
	})?;

	if response.total_hits == 0 {
		return Ok(Vec::new());
	}

	Ok(response
		.hits
		.into_iter()
		.filter(|hit| !hit.webformat_url.trim().is_empty())
		.map(|hit| SearchResult {
			url: hit.webformat_url,
			preview_url: hit.preview_url,
			tags: hit.tags,
		})
		.collect())
}
