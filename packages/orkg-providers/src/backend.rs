use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use orkg_domain::{ResultItem, ResultPage, SearchRequest};

use crate::Result;

/// Calls `GET /api/search` on the backend proxy.
pub async fn search(
	cfg: &orkg_config::Backend,
	request: &SearchRequest,
	cancel: &CancellationToken,
) -> Result<ResultPage> {
	let client = crate::http_client(cfg.timeout_ms, HeaderMap::new())?;
	let url = format!("{}/api/search", cfg.api_base);

	tracing::debug!(%url, term = request.term(), page = request.page(), "Issuing backend search.");

	let json = crate::get_json_cancellable(client.get(url).query(&request.query_pairs()), cancel)
		.await?;

	Ok(parse_search_page(&json, request.page(), request.size()))
}

/// Normalizes a `{total, page, size, items}` payload. Shape problems never fail: missing or
/// non-array `items` become an empty list, and `total` falls back from `total` to
/// `totalElements` to the item count (or zero without items).
pub fn parse_search_page(json: &Value, page: u32, size: u32) -> ResultPage {
	let raw_items = json.get("items").and_then(Value::as_array);
	let items: Vec<ResultItem> =
		raw_items.map(|items| items.iter().filter_map(parse_item).collect()).unwrap_or_default();
	let total = crate::non_negative_number(json.get("total"))
		.or_else(|| crate::non_negative_number(json.get("totalElements")))
		.unwrap_or_else(|| if raw_items.is_some() { items.len() as u64 } else { 0 });

	if raw_items.is_none() {
		tracing::warn!("Search response is missing an items array; using an empty page.");
	}

	ResultPage::new(total, page, size, items)
}

pub(crate) fn parse_item(value: &Value) -> Option<ResultItem> {
	let id = crate::non_empty_str(value.get("id"))?;
	let label = value.get("label").and_then(Value::as_str).unwrap_or_default();
	let classes = value
		.get("classes")
		.and_then(Value::as_array)
		.map(|classes| classes.iter().filter_map(Value::as_str).map(str::to_string).collect())
		.unwrap_or_default();

	Some(ResultItem { id: id.to_string(), label: label.to_string(), classes })
}
