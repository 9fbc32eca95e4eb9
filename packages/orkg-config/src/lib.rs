mod error;
mod types;

pub use error::{Error, Result};
pub use types::{ALLOWED_PAGE_SIZES, Backend, Config, Graph, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Path::new("<inline>").to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	for (label, value) in
		[("backend.api_base", &cfg.backend.api_base), ("graph.api_base", &cfg.graph.api_base)]
	{
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
		if !(value.starts_with("http://") || value.starts_with("https://")) {
			return Err(Error::Validation {
				message: format!("{label} must be an http or https URL."),
			});
		}
	}
	for (label, value) in
		[("backend.timeout_ms", cfg.backend.timeout_ms), ("graph.timeout_ms", cfg.graph.timeout_ms)]
	{
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.graph.paper_accept.trim().is_empty() {
		return Err(Error::Validation {
			message: "graph.paper_accept must be non-empty.".to_string(),
		});
	}
	if cfg.search.debounce_ms == 0 {
		return Err(Error::Validation {
			message: "search.debounce_ms must be greater than zero.".to_string(),
		});
	}
	if !ALLOWED_PAGE_SIZES.contains(&cfg.search.default_page_size) {
		return Err(Error::Validation {
			message: "search.default_page_size must be one of 10, 25, 50, or 100.".to_string(),
		});
	}
	if cfg.search.max_page_size < 100 {
		return Err(Error::Validation {
			message: "search.max_page_size must be at least 100.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for base in [&mut cfg.backend.api_base, &mut cfg.graph.api_base] {
		let trimmed = base.trim().trim_end_matches('/').to_string();

		*base = trimmed;
	}

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
