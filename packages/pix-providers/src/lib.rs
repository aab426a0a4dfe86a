pub mod download;
pub mod pixabay;

mod error;

pub use download::{DownloadedAsset, ImageDownloader};
pub use error::{Error, Result};
pub use pixabay::{PixabayClient, SearchResult};
