use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = orkg_search::Args::parse();

	orkg_search::run(args).await
}
