mod error;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, HashSet},
	env, fs,
	future::IntoFuture,
	path::PathBuf,
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, AtomicUsize, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::oneshot};

pub const SEARCH_PATH: &str = "/api/";
pub const TEST_API_KEY: &str = "test-key";
/// PNG signature followed by a few payload bytes.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];

const CATEGORIES: [&str; 4] = ["illustration", "photo", "vector", "all"];

/// One search request as the stub received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCall {
	pub key: String,
	pub keyword: String,
	pub image_type: String,
	pub lang: String,
	pub safesearch: String,
	pub per_page: String,
}

/// Scripted behaviour of [`StubImageApi`].
#[derive(Clone, Debug)]
pub struct StubOptions {
	hits_per_category: HashMap<String, usize>,
	keywords_without_hits: HashSet<String>,
	failing_images: HashSet<String>,
	search_status: Option<u16>,
	malformed_search: bool,
	image_status: Option<u16>,
	image_content_type: Option<String>,
	image_bytes: Vec<u8>,
}
impl StubOptions {
	pub fn with_hits(mut self, category: &str, hits: usize) -> Self {
		self.hits_per_category.insert(category.to_string(), hits);

		self
	}

	pub fn without_hits_for(mut self, keyword: &str) -> Self {
		self.keywords_without_hits.insert(keyword.to_string());

		self
	}

	pub fn failing_image_for(mut self, keyword: &str) -> Self {
		self.failing_images.insert(slug(keyword));

		self
	}

	pub fn with_search_status(mut self, status: u16) -> Self {
		self.search_status = Some(status);

		self
	}

	pub fn with_malformed_search(mut self) -> Self {
		self.malformed_search = true;

		self
	}

	pub fn with_image_status(mut self, status: u16) -> Self {
		self.image_status = Some(status);

		self
	}

	/// `None` makes the stub answer with a generic binary content type.
	pub fn with_image_content_type(mut self, content_type: Option<&str>) -> Self {
		self.image_content_type = content_type.map(str::to_string);

		self
	}
}
impl Default for StubOptions {
	fn default() -> Self {
		Self {
			hits_per_category: CATEGORIES.iter().map(|category| (category.to_string(), 3)).collect(),
			keywords_without_hits: HashSet::new(),
			failing_images: HashSet::new(),
			search_status: None,
			malformed_search: false,
			image_status: None,
			image_content_type: Some("image/png".to_string()),
			image_bytes: PNG_BYTES.to_vec(),
		}
	}
}

struct StubState {
	base_url: String,
	options: StubOptions,
	search_calls: Mutex<Vec<SearchCall>>,
	image_requests: AtomicUsize,
}

/// Local stand-in for the image-search API and its image CDN.
pub struct StubImageApi {
	base_url: String,
	state: Arc<StubState>,
	shutdown: Option<oneshot::Sender<()>>,
}
impl StubImageApi {
	pub async fn start(options: StubOptions) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let base_url = format!("http://{addr}");
		let state = Arc::new(StubState {
			base_url: base_url.clone(),
			options,
			search_calls: Mutex::new(Vec::new()),
			image_requests: AtomicUsize::new(0),
		});
		let app = Router::new()
			.route(SEARCH_PATH, routing::get(search_handler))
			.route("/images/{slug}/{category}/{index}", routing::get(image_handler))
			.with_state(state.clone());
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { base_url, state, shutdown: Some(tx) })
	}

	pub fn api_base(&self) -> String {
		format!("{}{SEARCH_PATH}", self.base_url)
	}

	pub fn image_url(&self, keyword: &str, category: &str, index: usize) -> String {
		image_url(&self.base_url, keyword, category, index)
	}

	pub fn search_calls(&self) -> Vec<SearchCall> {
		self.state.search_calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn image_requests(&self) -> usize {
		self.state.image_requests.load(Ordering::SeqCst)
	}
}
impl Drop for StubImageApi {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

/// Creates a fresh, empty directory under the system temp dir.
pub fn temp_dir(prefix: &str) -> Result<PathBuf> {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_err(|err| Error::Message(format!("System time is before the epoch: {err}.")))?
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("{prefix}_{nanos}_{pid}_{ordinal}"));

	fs::create_dir_all(&path)?;

	Ok(path)
}

async fn search_handler(
	State(state): State<Arc<StubState>>,
	Query(params): Query<HashMap<String, String>>,
) -> Response {
	let param = |name: &str| params.get(name).cloned().unwrap_or_default();
	let call = SearchCall {
		key: param("key"),
		keyword: param("q"),
		image_type: param("image_type"),
		lang: param("lang"),
		safesearch: param("safesearch"),
		per_page: param("per_page"),
	};

	state.search_calls.lock().unwrap_or_else(|err| err.into_inner()).push(call.clone());

	if let Some(status) = state.options.search_status {
		return StatusCode::from_u16(status)
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			.into_response();
	}
	if state.options.malformed_search {
		return (StatusCode::OK, "<html>Too many requests</html>").into_response();
	}

	let total = if state.options.keywords_without_hits.contains(&call.keyword) {
		0
	} else {
		state.options.hits_per_category.get(&call.image_type).copied().unwrap_or(0)
	};
	let per_page = call.per_page.parse::<usize>().unwrap_or(20);
	let hits: Vec<Value> = (0..total.min(per_page))
		.map(|index| {
			serde_json::json!({
				"webformatURL": image_url(&state.base_url, &call.keyword, &call.image_type, index),
				"previewURL": format!(
					"{}/previews/{}/{}/{index}",
					state.base_url,
					slug(&call.keyword),
					call.image_type
				),
				"tags": format!("{}, {}, {index}", call.keyword, call.image_type),
			})
		})
		.collect();

	Json(serde_json::json!({ "total": total, "totalHits": total, "hits": hits })).into_response()
}

async fn image_handler(
	State(state): State<Arc<StubState>>,
	Path((slug, _category, _index)): Path<(String, String, usize)>,
) -> Response {
	state.image_requests.fetch_add(1, Ordering::SeqCst);

	if state.options.failing_images.contains(&slug) {
		return StatusCode::NOT_FOUND.into_response();
	}
	if let Some(status) = state.options.image_status {
		return StatusCode::from_u16(status)
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			.into_response();
	}

	let bytes = state.options.image_bytes.clone();

	match state.options.image_content_type.clone() {
		Some(content_type) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
		None => bytes.into_response(),
	}
}

fn image_url(base_url: &str, keyword: &str, category: &str, index: usize) -> String {
	format!("{base_url}/images/{}/{category}/{index}", slug(keyword))
}

fn slug(keyword: &str) -> String {
	keyword.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}
