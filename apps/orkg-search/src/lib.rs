use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use orkg_domain::{PaperFilters, ResourceType};
use orkg_service::{Providers, Session, SessionOptions, Snapshot};

/// Runs one search session against the backend proxy and prints the final state as JSON.
#[derive(Debug, Parser)]
#[command(
	version = orkg_cli::VERSION,
	rename_all = "kebab",
	styles = orkg_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: String,
	/// Comma separated resource types. An empty list selects nothing.
	#[arg(long, value_name = "LIST")]
	pub types: Option<String>,
	#[arg(long, value_name = "TEXT")]
	pub author: Option<String>,
	#[arg(long, value_name = "YEAR")]
	pub year_from: Option<i32>,
	#[arg(long, value_name = "YEAR")]
	pub year_to: Option<i32>,
	#[arg(long, default_value_t = 0)]
	pub page: u32,
	#[arg(long, value_name = "N")]
	pub size: Option<u32>,
	#[arg(long, value_name = "ID")]
	pub template: Option<String>,
	#[arg(long, value_name = "PREDICATE", requires_all = ["template", "value"])]
	pub field: Option<String>,
	#[arg(long, value_name = "TEXT", requires = "field")]
	pub value: Option<String>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = orkg_config::load(&args.config)?;

	init_tracing(&config);

	let session =
		Session::spawn(Providers::http(&config), SessionOptions::from_config(&config.search)?);
	let snapshot = drive(&session, &args).await;

	session.close().await;

	println!("{}", serde_json::to_string_pretty(&snapshot?)?);

	Ok(())
}

async fn drive(session: &Session, args: &Args) -> color_eyre::Result<Snapshot> {
	if let Some(types) = &args.types {
		session.set_types(ResourceType::parse_list(types)?)?;
	}

	let filters = PaperFilters {
		author_contains: args.author.clone().unwrap_or_default(),
		year_from: args.year_from,
		year_to: args.year_to,
	};

	if !filters.is_empty() {
		session.set_paper_filters(filters)?;
	}
	if let Some(size) = args.size {
		session.set_page_size(size)?;
	}

	let typed = keystrokes(&args.query);

	if typed.is_empty() {
		session.commit_term("")?;
	}
	for prefix in typed {
		session.input(prefix)?;
	}

	let mut snapshot = session.settled().await?;

	if args.page > 0 {
		session.set_page(args.page)?;

		snapshot = session.settled().await?;
	}
	if let Some(template) = &args.template {
		session.set_template(template.as_str())?;

		snapshot = session.settled().await?;

		tracing::info!(template = %template, fields = snapshot.template.fields.len(), "Template resolved.");

		if let (Some(field), Some(value)) = (&args.field, &args.value) {
			session.apply_field_filter(field.as_str(), value.as_str())?;

			snapshot = session.settled().await?;
		}
	}

	Ok(snapshot)
}

/// Every prefix of `query`, as a user typing it would produce.
fn keystrokes(query: &str) -> Vec<String> {
	query.char_indices().map(|(index, ch)| query[..index + ch.len_utf8()].to_string()).collect()
}

fn init_tracing(config: &orkg_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
