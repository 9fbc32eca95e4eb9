use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = orkg_api::Args::parse();

	orkg_api::run(args).await
}
