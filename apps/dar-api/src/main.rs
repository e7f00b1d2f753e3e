use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = dar_api::Args::parse();

	dar_api::run(args).await
}
