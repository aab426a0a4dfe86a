use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};

use crate::{Error, Result};
use pix_domain::media;

/// Image payloads are larger than search responses, so the budget is longer.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetched image bytes plus the proposed media filename.
///
/// The host media store may store the bytes under a different name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedAsset {
	pub bytes: Vec<u8>,
	pub filename: String,
}

#[derive(Clone, Debug)]
pub struct ImageDownloader {
	client: Client,
}
impl ImageDownloader {
	pub fn new() -> Result<Self> {
		let client = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;

		Ok(Self { client })
	}

	pub async fn download(&self, url: &str, keyword: &str) -> Result<DownloadedAsset> {
		let res = self.client.get(url).send().await?;
		let status = res.status();

		if !status.is_success() {
			return Err(Error::Status { operation: "download", status });
		}

		let content_type = res
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(str::to_string);
		let bytes = res.bytes().await?;

		if bytes.is_empty() {
			return Err(Error::InvalidResponse {
				message: "Image response body is empty.".to_string(),
			});
		}

		let extension = media::infer_extension(content_type.as_deref(), url);

		Ok(DownloadedAsset {
			bytes: bytes.to_vec(),
			filename: media::media_filename(keyword, &extension),
		})
	}
}
