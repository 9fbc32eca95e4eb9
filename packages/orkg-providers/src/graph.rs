//! Read-only client for the knowledge-graph REST API.
//!
//! Payloads are treated as untrusted: every nested access tolerates missing structure, and
//! entries that cannot be converted into the strict domain model are skipped.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use orkg_domain::{ResultPage, TemplateFieldSpec, paper_filter::PaperRecord};

use crate::{Error, Result};

pub const UNNAMED_FIELD: &str = "Unnamed field";

/// A page of papers before any local filtering.
#[derive(Debug, Clone, Default)]
pub struct PaperPage {
	pub total: u64,
	pub papers: Vec<PaperRecord>,
}

pub async fn template_fields(
	cfg: &orkg_config::Graph,
	template_id: &str,
	cancel: &CancellationToken,
) -> Result<Vec<TemplateFieldSpec>> {
	let template_id = path_segment(template_id)?;
	let client = crate::http_client(cfg.timeout_ms, HeaderMap::new())?;
	let url = format!("{}/templates/{template_id}", cfg.api_base);
	let json = crate::get_json_cancellable(client.get(url), cancel).await?;

	Ok(parse_template_fields(&json))
}

/// Subject ids of statements whose `predicate` object contains `value`, case-insensitively.
pub async fn subject_ids(
	cfg: &orkg_config::Graph,
	predicate: &str,
	value: &str,
	cancel: &CancellationToken,
) -> Result<Vec<String>> {
	let client = crate::http_client(cfg.timeout_ms, HeaderMap::new())?;
	let url = format!("{}/statements/", cfg.api_base);
	let request = client.get(url).query(&[("predicate", predicate), ("object__icontains", value)]);
	let json = crate::get_json_cancellable(request, cancel).await?;

	Ok(parse_subject_ids(&json))
}

pub async fn search_resources(
	cfg: &orkg_config::Graph,
	q: &str,
	page: u32,
	size: u32,
	classes: Option<&str>,
) -> Result<ResultPage> {
	let client = crate::http_client(cfg.timeout_ms, HeaderMap::new())?;
	let url = format!("{}/resources/", cfg.api_base);
	let mut params = vec![("q", q.to_string()), ("page", page.to_string()), ("size", size.to_string())];

	if let Some(classes) = classes.filter(|c| !c.is_empty()) {
		params.push(("classes", classes.to_string()));
	}

	let json = crate::get_json(client.get(url).query(&params)).await?;

	Ok(parse_resources(&json, page, size))
}

/// Title search on the papers endpoint. Author and year narrowing is applied by the caller.
pub async fn search_papers(
	cfg: &orkg_config::Graph,
	title: &str,
	page: u32,
	size: u32,
) -> Result<PaperPage> {
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_str(&cfg.paper_accept)?);

	let client = crate::http_client(cfg.timeout_ms, headers)?;
	let url = format!("{}/papers/", cfg.api_base);
	let params = [
		("title", title.to_string()),
		("exact", "false".to_string()),
		("page", page.to_string()),
		("size", size.to_string()),
	];
	let json = crate::get_json(client.get(url).query(&params)).await?;

	Ok(parse_papers(&json))
}

/// Maps `properties` to field specs. Label falls back from `path.label` to `label` to
/// [`UNNAMED_FIELD`]; predicate falls back from `path.id` to `id`, and entries without one are
/// dropped.
pub fn parse_template_fields(json: &Value) -> Vec<TemplateFieldSpec> {
	let Some(properties) = json.get("properties").and_then(Value::as_array) else {
		return Vec::new();
	};

	properties
		.iter()
		.filter_map(|entry| {
			let path = entry.get("path");
			let predicate = crate::non_empty_str(path.and_then(|p| p.get("id")))
				.or_else(|| crate::non_empty_str(entry.get("id")))?;
			let label = crate::non_empty_str(path.and_then(|p| p.get("label")))
				.or_else(|| crate::non_empty_str(entry.get("label")))
				.unwrap_or(UNNAMED_FIELD);

			Some(TemplateFieldSpec { label: label.to_string(), predicate: predicate.to_string() })
		})
		.collect()
}

pub fn parse_subject_ids(json: &Value) -> Vec<String> {
	json.get("content")
		.and_then(Value::as_array)
		.map(|content| {
			content
				.iter()
				.filter_map(|statement| {
					crate::non_empty_str(statement.get("subject").and_then(|s| s.get("id")))
				})
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default()
}

pub fn parse_resources(json: &Value, page: u32, size: u32) -> ResultPage {
	let items: Vec<_> = json
		.get("content")
		.and_then(Value::as_array)
		.map(|content| content.iter().filter_map(crate::backend::parse_item).collect())
		.unwrap_or_default();
	let total = crate::non_negative_number(json.get("totalElements")).unwrap_or(items.len() as u64);

	ResultPage::new(total, page, size, items)
}

pub fn parse_papers(json: &Value) -> PaperPage {
	let papers: Vec<_> = json
		.get("content")
		.and_then(Value::as_array)
		.map(|content| content.iter().filter_map(parse_paper).collect())
		.unwrap_or_default();
	let total = crate::non_negative_number(json.get("totalElements")).unwrap_or(papers.len() as u64);

	PaperPage { total, papers }
}

fn parse_paper(value: &Value) -> Option<PaperRecord> {
	let id = crate::non_empty_str(value.get("id"))?;
	let title = crate::non_empty_str(value.get("title"))
		.or_else(|| crate::non_empty_str(value.get("label")))
		.unwrap_or_default();
	let year = value.get("year").and_then(|year| match year {
		Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	});
	let authors = value
		.get("authors")
		.and_then(Value::as_array)
		.map(|authors| {
			authors
				.iter()
				.filter_map(|author| author.get("name").and_then(Value::as_str))
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default();

	Some(PaperRecord { id: id.to_string(), title: title.to_string(), year, authors })
}

fn path_segment(raw: &str) -> Result<&str> {
	let segment = raw.trim();

	if segment.is_empty() || segment.chars().any(|c| c.is_whitespace() || "/?#%".contains(c)) {
		return Err(Error::InvalidRequest { message: format!("Invalid template id {raw:?}.") });
	}

	Ok(segment)
}
