use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = pix_engine::Args::parse();
	pix_engine::run(args).await
}
