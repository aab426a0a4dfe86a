use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

/// Environment variable holding the image-search API key.
pub const API_KEY_ENV: &str = "PIXABAY_API_KEY";

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Reads the API key from the environment, treating blank values as absent.
pub fn api_key_from_env() -> Option<String> {
	std::env::var(API_KEY_ENV).ok().map(|key| key.trim().to_string()).filter(|key| !key.is_empty())
}
