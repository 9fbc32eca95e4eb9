use axum::{
	Json, Router,
	extract::{Query, State, rejection::QueryRejection},
	http::{HeaderName, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use orkg_domain::{PaperFilters, ResourceType, ResultPage, paper_filter};
use orkg_providers::graph;

use crate::state::AppState;

const X_SOURCE: HeaderName = HeaderName::from_static("x-source");
const DEFAULT_PAGE_SIZE: u32 = 25;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/health", get(health))
		.route("/api/search", get(search))
		.layer(CorsLayer::permissive())
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
	q: Option<String>,
	page: Option<i64>,
	size: Option<i64>,
	/// Comma separated class names, e.g. `Paper,Software`.
	classes: Option<String>,
	author: Option<String>,
	year_from: Option<i32>,
	year_to: Option<i32>,
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "ok": true }))
}

async fn search(
	State(state): State<AppState>,
	params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
	let Query(params) = params.map_err(|err| {
		json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", err.body_text(), None)
	})?;
	let q = params.q.as_deref().map(str::trim).unwrap_or_default();

	if q.is_empty() {
		return Err(json_error(
			StatusCode::UNPROCESSABLE_ENTITY,
			"invalid_request",
			"q must be non-empty.",
			Some(vec!["q".to_string()]),
		));
	}

	let page = match params.page {
		None => 0,
		Some(page) => u32::try_from(page).map_err(|_| {
			json_error(
				StatusCode::UNPROCESSABLE_ENTITY,
				"invalid_request",
				"page must be zero or greater.",
				Some(vec!["page".to_string()]),
			)
		})?,
	};
	let size = match params.size {
		None => DEFAULT_PAGE_SIZE,
		Some(size) => u32::try_from(size)
			.ok()
			.filter(|size| (1..=state.max_page_size).contains(size))
			.ok_or_else(|| {
				json_error(
					StatusCode::UNPROCESSABLE_ENTITY,
					"invalid_request",
					format!("size must be between 1 and {}.", state.max_page_size),
					Some(vec!["size".to_string()]),
				)
			})?,
	};
	let classes: Vec<&str> = params
		.classes
		.as_deref()
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|class| !class.is_empty())
		.collect();
	let paper_only =
		matches!(classes.as_slice(), [class] if class.eq_ignore_ascii_case(ResourceType::Paper.as_str()));

	if paper_only {
		let filters = PaperFilters {
			author_contains: params.author.unwrap_or_default(),
			year_from: params.year_from,
			year_to: params.year_to,
		};
		let fetched = graph::search_papers(&state.graph, q, page, size).await.map_err(upstream)?;
		let items = paper_filter::filter_papers(fetched.papers, &filters);
		let body = ResultPage::new(items.len() as u64, page, size, items);

		tracing::debug!(q, page, size, kept = body.items.len(), "Served filtered paper search.");

		return Ok(with_source("papers_filtered", body));
	}

	let joined = classes.join(",");
	let body = graph::search_resources(&state.graph, q, page, size, Some(joined.as_str()))
		.await
		.map_err(upstream)?;

	tracing::debug!(q, page, size, classes = %joined, "Served resource search.");

	Ok(with_source("resources", body))
}

fn with_source(source: &'static str, body: ResultPage) -> Response {
	let mut response = Json(body).into_response();

	response.headers_mut().insert(X_SOURCE, HeaderValue::from_static(source));

	response
}

fn upstream(err: orkg_providers::Error) -> ApiError {
	tracing::warn!(error = %err, "Upstream knowledge-graph request failed.");

	json_error(StatusCode::BAD_GATEWAY, "upstream_error", format!("Upstream ORKG error: {err}"), None)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
