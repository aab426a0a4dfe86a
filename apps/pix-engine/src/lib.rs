pub mod host;
pub mod media;
pub mod notes;

mod error;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::{host::EngineHost, media::MediaDir, notes::NoteDb};
use pix_config::{Config, ImageCategory, ImagePosition};
use pix_domain::{NoteId, field};
use pix_service::{
	BatchProgress, BatchReport, BatchRunner, BatchSettings, CancelFlag, ImagePicker, ItemOutcome,
	Progress, Providers, SkipReason,
	picker::{self, DEFAULT_CANDIDATES},
};

/// Field values longer than this are cut in `inspect` output.
const PREVIEW_CHARS: usize = 100;
const REDACTED: &str = "<redacted>";

#[derive(Debug, Parser)]
#[command(
	version = pix_cli::VERSION,
	rename_all = "kebab",
	styles = pix_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", default_value = "config.json")]
	pub config: PathBuf,
	#[arg(long, value_name = "FILE", default_value = "mock_db.json")]
	pub db: PathBuf,
	#[arg(long, value_name = "DIR", default_value = "test_media")]
	pub media_dir: PathBuf,
	#[arg(long, value_name = "FILTER", default_value = "info")]
	pub log_level: String,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Fetch an image for every eligible note and save the database.
	Run {
		/// Restrict the batch to these notes. Defaults to every note.
		#[arg(long = "note", value_name = "ID")]
		notes: Vec<i64>,
	},
	/// Show field names, truncated values and eligibility of notes.
	Inspect {
		#[arg(long = "note", value_name = "ID")]
		notes: Vec<i64>,
	},
	/// List image candidates for one note and optionally apply one of them.
	Pick {
		#[arg(long, value_name = "ID")]
		note: i64,
		#[arg(long, value_name = "N", default_value_t = DEFAULT_CANDIDATES)]
		count: u32,
		/// Zero-based index of the candidate to apply.
		#[arg(long, value_name = "INDEX")]
		choose: Option<usize>,
	},
	/// Print the effective config, saving it first when a setter is given.
	Config(ConfigUpdate),
}

#[derive(Debug, Default, clap::Args)]
pub struct ConfigUpdate {
	#[arg(long, value_name = "FIELD")]
	pub source_field: Option<String>,
	/// An empty value writes images into the source field.
	#[arg(long, value_name = "FIELD")]
	pub target_field: Option<String>,
	#[arg(long, value_name = "TYPE", value_parser = parse_category)]
	pub image_type: Option<ImageCategory>,
	#[arg(long, value_name = "POSITION", value_parser = parse_position)]
	pub position: Option<ImagePosition>,
}
impl ConfigUpdate {
	pub fn is_empty(&self) -> bool {
		self.source_field.is_none()
			&& self.target_field.is_none()
			&& self.image_type.is_none()
			&& self.position.is_none()
	}

	pub fn apply(self, cfg: &mut Config) {
		if let Some(source_field) = self.source_field {
			cfg.source_field = source_field;
		}
		if let Some(target_field) = self.target_field {
			cfg.target_field = Some(target_field).filter(|field| !field.trim().is_empty());
		}
		if let Some(image_type) = self.image_type {
			cfg.image_type = image_type;
		}
		if let Some(position) = self.position {
			cfg.image_position = position;
		}
	}
}

/// Prints one line per note and forwards the interrupt flag to the runner.
pub struct ConsoleProgress {
	cancel: CancelFlag,
}
impl ConsoleProgress {
	pub fn new(cancel: CancelFlag) -> Self {
		Self { cancel }
	}
}
impl Progress for ConsoleProgress {
	fn report(&mut self, progress: &BatchProgress<'_>) {
		println!(
			"[{}/{}] note {}: {}",
			progress.index + 1,
			progress.total,
			progress.note_id,
			progress.keyword
		);
	}

	fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	init_tracing(&args.log_level);

	let cfg = load_config(&args.config)?;

	match args.command {
		Command::Run { notes } => {
			let providers = resolve_providers(&cfg, pix_cli::api_key_from_env())?;
			let cancel = CancelFlag::default();
			let watcher = tokio::spawn(watch_interrupt(cancel.clone()));
			let mut progress = ConsoleProgress::new(cancel);
			let report =
				process(&cfg, providers, &args.db, &args.media_dir, &notes, &mut progress).await;

			watcher.abort();

			println!("{}", report?.summary());
		},
		Command::Inspect { notes } => inspect(&cfg, &args.db, &notes)?,
		Command::Pick { note, count, choose } => {
			let providers = resolve_providers(&cfg, pix_cli::api_key_from_env())?;

			pick(&cfg, providers, &args.db, &args.media_dir, NoteId(note), count, choose).await?;
		},
		Command::Config(update) => configure(&args.config, cfg, update)?,
	}

	Ok(())
}

/// Config used until a config file exists, matching the sample database layout.
pub fn engine_defaults() -> Config {
	Config {
		source_field: "Source".to_string(),
		target_field: Some("Image".to_string()),
		image_position: ImagePosition::Replace,
		..Config::default()
	}
}

pub fn load_config(path: &Path) -> pix_config::Result<Config> {
	if path.exists() {
		pix_config::load(path)
	} else {
		Ok(engine_defaults())
	}
}

/// Runs one batch over the database at `db_path`, saving it only when a note changed.
pub async fn process<P>(
	cfg: &Config,
	providers: Providers,
	db_path: &Path,
	media_dir: &Path,
	note_ids: &[i64],
	progress: &mut P,
) -> Result<BatchReport>
where
	P: Progress,
{
	let db = NoteDb::load(db_path)?;
	let selected = select(&db, note_ids);
	let mut host = EngineHost::new(db, MediaDir::new(media_dir));
	let runner = BatchRunner::new(BatchSettings::from_config(cfg), providers);
	let report = runner.run(&mut host, &selected, progress).await;

	if report.summary().processed > 0 {
		if let Err(err) = host.db().save() {
			tracing::error!(
				path = %db_path.display(),
				summary = %report.summary(),
				error = %err,
				"Failed to save note database. Stored images are unreferenced."
			);

			return Err(err);
		}
	} else {
		tracing::info!(path = %db_path.display(), "No note changed. Database left untouched.");
	}

	Ok(report)
}

pub fn render_config(cfg: &Config) -> Result<String> {
	let mut doc = serde_json::to_value(cfg)?;

	if let Some(key) = doc.get_mut("pixabay_api_key")
		&& key.as_str().is_some_and(|key| !key.is_empty())
	{
		*key = Value::String(REDACTED.to_string());
	}

	Ok(serde_json::to_string_pretty(&doc)?)
}

fn init_tracing(filter: &str) {
	let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Applies an API key taken from the environment, which wins over the config file.
pub fn with_env_api_key(cfg: &Config, env_key: Option<String>) -> Config {
	let mut cfg = cfg.clone();

	if let Some(api_key) = env_key.filter(|key| !key.trim().is_empty()) {
		cfg.pixabay_api_key = api_key.trim().to_string();
	}

	cfg
}

/// Builds the search providers, failing when neither the environment nor the config file
/// carries an API key.
pub fn resolve_providers(cfg: &Config, env_key: Option<String>) -> color_eyre::Result<Providers> {
	let cfg = with_env_api_key(cfg, env_key);

	match Providers::from_config(&cfg) {
		Ok(providers) => Ok(providers),
		Err(pix_service::Error::MissingApiKey) => {
			tracing::error!(env = pix_cli::API_KEY_ENV, "Image search API key is not configured.");

			Err(eyre::eyre!(
				"Set {} or pixabay_api_key in the config file.",
				pix_cli::API_KEY_ENV
			))
		},
		Err(err) => Err(err.into()),
	}
}

async fn watch_interrupt(cancel: CancelFlag) {
	match tokio::signal::ctrl_c().await {
		Ok(()) => {
			tracing::warn!("Interrupt received. Stopping after the current note.");

			cancel.cancel();
		},
		Err(err) => tracing::warn!(error = %err, "Failed to listen for interrupts."),
	}
}

fn inspect(cfg: &Config, db_path: &Path, note_ids: &[i64]) -> Result<()> {
	let db = NoteDb::load(db_path)?;
	let settings = BatchSettings::from_config(cfg);

	for note_id in select(&db, note_ids) {
		let Some(note) = db.get(note_id) else {
			println!("Note {note_id}: {}.", SkipReason::NoteMissing);

			continue;
		};
		let status =
			match field::check_eligibility(note, &settings.source_field, &settings.target_field) {
				Ok(eligible) => format!("eligible, keyword {:?}", eligible.keyword),
				Err(reason) => format!("skipped, {}", SkipReason::Ineligible(reason)),
			};

		println!("Note {note_id} ({status})");

		for (name, value) in note.fields() {
			println!("  {name}: {}", preview(value));
		}
	}

	Ok(())
}

async fn pick(
	cfg: &Config,
	providers: Providers,
	db_path: &Path,
	media_dir: &Path,
	note_id: NoteId,
	count: u32,
	choose: Option<usize>,
) -> color_eyre::Result<()> {
	let mut host = EngineHost::new(NoteDb::load(db_path)?, MediaDir::new(media_dir));
	let image_picker = ImagePicker::new(BatchSettings::from_config(cfg), providers);
	let candidates = image_picker.candidates(&host, note_id, count).await?;

	if candidates.is_empty() {
		println!("No images found for note {note_id}.");

		return Ok(());
	}

	for (index, candidate) in candidates.iter().enumerate() {
		println!("{index}: {} ({})", candidate.url, candidate.tags);
	}

	let Some(index) = choose else {
		return Ok(());
	};
	let choice = picker::choose(&candidates, index)?;

	match image_picker.apply(&mut host, note_id, choice).await? {
		ItemOutcome::Processed { filename } => {
			host.db().save()?;

			println!("Note {note_id} now shows {filename}.");

			Ok(())
		},
		ItemOutcome::Failed(stage) => Err(eyre::eyre!("Note {note_id} failed while {stage}.")),
		ItemOutcome::Unsaved { filename } => {
			Err(eyre::eyre!("Note {note_id} was not saved and {filename} is unreferenced."))
		},
	}
}

fn configure(path: &Path, mut cfg: Config, update: ConfigUpdate) -> color_eyre::Result<()> {
	if !update.is_empty() {
		update.apply(&mut cfg);

		pix_config::save(path, &cfg)?;

		tracing::info!(path = %path.display(), "Saved config.");
	}

	println!("{}", render_config(&cfg)?);

	Ok(())
}

fn select(db: &NoteDb, note_ids: &[i64]) -> Vec<NoteId> {
	if note_ids.is_empty() {
		db.ids()
	} else {
		note_ids.iter().copied().map(NoteId).collect()
	}
}

fn preview(value: &str) -> String {
	match value.char_indices().nth(PREVIEW_CHARS) {
		Some((cut, _)) => format!("{}...", &value[..cut]),
		None => value.to_string(),
	}
}

fn parse_category(raw: &str) -> std::result::Result<ImageCategory, String> {
	ImageCategory::parse(raw).ok_or_else(|| {
		let accepted: Vec<&str> =
			ImageCategory::ALL.iter().map(|category| category.as_str()).collect();

		format!("expected one of {}", accepted.join(", "))
	})
}

fn parse_position(raw: &str) -> std::result::Result<ImagePosition, String> {
	ImagePosition::parse(raw).ok_or_else(|| {
		let accepted: Vec<&str> =
			ImagePosition::ALL.iter().map(|position| position.as_str()).collect();

		format!("expected one of {}", accepted.join(", "))
	})
}
