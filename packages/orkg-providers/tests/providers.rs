use std::{collections::HashMap, time::Duration};

use axum::{
	Json, Router,
	extract::{Path, Query},
	http::StatusCode,
	response::IntoResponse,
	routing,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use orkg_domain::{PaperFilters, SearchRequest, TemplateFieldSpec};
use orkg_providers::{Error, backend, graph};
use orkg_testkit::MockServer;

fn graph_config(api_base: String) -> orkg_config::Graph {
	orkg_config::Graph {
		api_base,
		timeout_ms: 2_000,
		paper_accept: "application/vnd.orkg.paper.v2+json".to_string(),
	}
}

fn backend_config(api_base: String) -> orkg_config::Backend {
	orkg_config::Backend { api_base, timeout_ms: 2_000 }
}

async fn template_handler(Path(id): Path<String>) -> impl IntoResponse {
	if id != "R108555" {
		return (StatusCode::NOT_FOUND, "Template not found").into_response();
	}

	Json(serde_json::json!({
		"properties": [
			{ "path": { "id": "P1", "label": "Model" } },
			{ "id": "P2", "label": "Dataset" },
			{ "path": { "id": "" }, "label": "Broken" },
			{ "path": { "id": "P3" } },
			"garbage"
		]
	}))
	.into_response()
}

async fn statements_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
	let matches = params.get("predicate").map(String::as_str) == Some("P1")
		&& params.get("object__icontains").map(String::as_str) == Some("BERT");

	if !matches {
		return Json(serde_json::json!({ "content": [] }));
	}

	Json(serde_json::json!({
		"content": [
			{ "subject": { "id": "R1" } },
			{ "subject": { "id": "R2" } },
			{ "subject": {} },
			{ "object": { "id": "R9" } }
		]
	}))
}

async fn search_handler(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
	if params.get("q").map(String::as_str) == Some("boom") {
		return (StatusCode::BAD_GATEWAY, "Upstream ORKG error: timeout").into_response();
	}
	if params.get("q").map(String::as_str) == Some("slow") {
		tokio::time::sleep(Duration::from_secs(5)).await;
	}

	Json(serde_json::json!({
		"total": 1,
		"page": 0,
		"size": 25,
		"items": [{ "id": "R1", "label": format!("{params:?}"), "classes": ["Paper"] }]
	}))
	.into_response()
}

async fn start_graph() -> MockServer {
	let app = Router::new()
		.route("/templates/{id}", routing::get(template_handler))
		.route("/statements/", routing::get(statements_handler));

	MockServer::start(app).await.expect("Failed to start graph server.")
}

async fn start_backend() -> MockServer {
	let app = Router::new().route("/api/search", routing::get(search_handler));

	MockServer::start(app).await.expect("Failed to start backend server.")
}

#[tokio::test]
async fn template_fields_follow_fallback_chain() {
	let server = start_graph().await;
	let cfg = graph_config(server.base_url());
	let fields = graph::template_fields(&cfg, "R108555", &CancellationToken::new())
		.await
		.expect("Template lookup failed.");

	assert_eq!(
		fields,
		vec![
			TemplateFieldSpec { label: "Model".to_string(), predicate: "P1".to_string() },
			TemplateFieldSpec { label: "Dataset".to_string(), predicate: "P2".to_string() },
			TemplateFieldSpec { label: "Unnamed field".to_string(), predicate: "P3".to_string() },
		]
	);
	assert!(fields.iter().all(|field| !field.predicate.is_empty()));
}

#[tokio::test]
async fn missing_template_reports_status() {
	let server = start_graph().await;
	let cfg = graph_config(server.base_url());
	let err = graph::template_fields(&cfg, "R0", &CancellationToken::new())
		.await
		.expect_err("Expected missing template to fail.");

	assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn subject_ids_skip_malformed_statements() {
	let server = start_graph().await;
	let cfg = graph_config(server.base_url());
	let ids = graph::subject_ids(&cfg, "P1", "BERT", &CancellationToken::new())
		.await
		.expect("Statement lookup failed.");

	assert_eq!(ids, vec!["R1".to_string(), "R2".to_string()]);
}

#[tokio::test]
async fn backend_error_carries_status_and_body() {
	let server = start_backend().await;
	let cfg = backend_config(server.base_url());
	let request = SearchRequest::Generic {
		term: "boom".to_string(),
		page: 0,
		size: 25,
		types: Default::default(),
	};
	let err = backend::search(&cfg, &request, &CancellationToken::new())
		.await
		.expect_err("Expected backend failure.");

	match err {
		Error::Status { status, body } => {
			assert_eq!(status, 502);
			assert_eq!(body, "Upstream ORKG error: timeout");
		},
		other => panic!("Expected status error, got {other:?}."),
	}
}

#[tokio::test]
async fn paper_request_forwards_filters() {
	let server = start_backend().await;
	let cfg = backend_config(server.base_url());
	let request = SearchRequest::Paper {
		term: "bert".to_string(),
		page: 0,
		size: 25,
		filters: PaperFilters {
			author_contains: "Devlin".to_string(),
			year_from: Some(2018),
			year_to: None,
		},
	};
	let page = backend::search(&cfg, &request, &CancellationToken::new())
		.await
		.expect("Backend search failed.");
	let echoed = &page.items[0].label;

	assert!(echoed.contains("\"author\": \"Devlin\""), "{echoed}");
	assert!(echoed.contains("\"year_from\": \"2018\""), "{echoed}");
	assert!(echoed.contains("\"classes\": \"Paper\""), "{echoed}");
	assert!(!echoed.contains("year_to"), "{echoed}");
}

#[tokio::test]
async fn cancelled_request_resolves_promptly() {
	let server = start_backend().await;
	let cfg = backend_config(server.base_url());
	let request = SearchRequest::Generic {
		term: "slow".to_string(),
		page: 0,
		size: 25,
		types: Default::default(),
	};
	let cancel = CancellationToken::new();
	let trigger = cancel.clone();

	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(50)).await;
		trigger.cancel();
	});

	let err = tokio::time::timeout(Duration::from_secs(2), backend::search(&cfg, &request, &cancel))
		.await
		.expect("Cancellation did not interrupt the request.")
		.expect_err("Expected cancellation.");

	assert!(err.is_cancelled());
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
	let cfg = backend_config(orkg_testkit::unreachable_base_url());
	let request = SearchRequest::Generic {
		term: "bert".to_string(),
		page: 0,
		size: 25,
		types: Default::default(),
	};
	let err = backend::search(&cfg, &request, &CancellationToken::new())
		.await
		.expect_err("Expected connection failure.");

	assert!(matches!(err, Error::Reqwest(_)), "unexpected error: {err:?}");
}
