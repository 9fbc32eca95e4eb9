use std::{
	collections::{BTreeSet, HashMap},
	sync::{Arc, Mutex},
	time::Duration,
};

use axum::{
	Json, Router,
	extract::{Path, Query},
	http::StatusCode,
	response::IntoResponse,
	routing,
};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use orkg_domain::{ResultItem, ResultPage, SearchRequest, TemplateFieldSpec};
use orkg_service::{
	BoxFuture, GraphApi, Providers, SearchBackend, Session, SessionOptions, TemplateStatus,
};
use orkg_testkit::MockServer;

type Gate<T> = oneshot::Sender<orkg_providers::Result<T>>;

fn page(ids: &[&str]) -> ResultPage {
	let items = ids
		.iter()
		.map(|id| ResultItem { id: id.to_string(), label: String::new(), classes: Vec::new() })
		.collect();

	ResultPage::new(ids.len() as u64, 0, 25, items)
}

fn ids(page: &ResultPage) -> Vec<&str> {
	page.items.iter().map(|item| item.id.as_str()).collect()
}

/// Answers immediately with a single item echoing the term, and records every request.
#[derive(Default)]
struct EchoBackend {
	requests: Mutex<Vec<SearchRequest>>,
}
impl EchoBackend {
	fn requests(&self) -> Vec<SearchRequest> {
		self.requests.lock().expect("Backend lock poisoned.").clone()
	}
}
impl SearchBackend for EchoBackend {
	fn search<'a>(
		&'a self,
		request: &'a SearchRequest,
		_cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<ResultPage>> {
		Box::pin(async move {
			self.requests.lock().expect("Backend lock poisoned.").push(request.clone());

			Ok(page(&[request.term()]))
		})
	}
}

/// Holds every request open until the test releases it. Ignores cancellation so late
/// responses can be simulated.
#[derive(Default)]
struct GatedBackend {
	calls: Mutex<Vec<(SearchRequest, Option<Gate<ResultPage>>)>>,
}
impl GatedBackend {
	fn call_count(&self) -> usize {
		self.calls.lock().expect("Backend lock poisoned.").len()
	}

	fn release(&self, term: &str, outcome: orkg_providers::Result<ResultPage>) {
		let gate = self
			.calls
			.lock()
			.expect("Backend lock poisoned.")
			.iter_mut()
			.find(|(request, _)| request.term() == term)
			.and_then(|(_, gate)| gate.take())
			.expect("No open request for term.");
		let _ = gate.send(outcome);
	}
}
impl SearchBackend for GatedBackend {
	fn search<'a>(
		&'a self,
		request: &'a SearchRequest,
		_cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<ResultPage>> {
		Box::pin(async move {
			let (tx, rx) = oneshot::channel();

			self.calls.lock().expect("Backend lock poisoned.").push((request.clone(), Some(tx)));

			rx.await.unwrap_or(Err(orkg_providers::Error::Cancelled))
		})
	}
}

#[derive(Default)]
struct GatedGraph {
	lookups: Mutex<Vec<(String, Option<Gate<Vec<TemplateFieldSpec>>>)>>,
}
impl GatedGraph {
	fn lookup_count(&self) -> usize {
		self.lookups.lock().expect("Graph lock poisoned.").len()
	}

	fn release(&self, index: usize, outcome: orkg_providers::Result<Vec<TemplateFieldSpec>>) {
		let gate = self.lookups.lock().expect("Graph lock poisoned.")[index]
			.1
			.take()
			.expect("Lookup already released.");
		let _ = gate.send(outcome);
	}
}
impl GraphApi for GatedGraph {
	fn template_fields<'a>(
		&'a self,
		template_id: &'a str,
		_cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<Vec<TemplateFieldSpec>>> {
		Box::pin(async move {
			let (tx, rx) = oneshot::channel();

			self.lookups
				.lock()
				.expect("Graph lock poisoned.")
				.push((template_id.to_string(), Some(tx)));

			rx.await.unwrap_or(Err(orkg_providers::Error::Cancelled))
		})
	}

	fn subject_ids<'a>(
		&'a self,
		_predicate: &'a str,
		_value: &'a str,
		_cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<Vec<String>>> {
		Box::pin(async { Ok(Vec::new()) })
	}
}

async fn wait_for_calls(check: impl FnMut() -> bool) {
	orkg_testkit::wait_until(Duration::from_secs(2), check)
		.await
		.expect("Expected requests were never issued.");
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_commit_one_term() {
	let backend = Arc::new(EchoBackend::default());
	let session = Session::spawn(
		Providers::new(backend.clone(), Arc::new(GatedGraph::default())),
		SessionOptions::default(),
	);

	session.set_page(4).expect("Session closed.");

	for partial in ["b", "be", "ber", "bert"] {
		session.input(partial).expect("Session closed.");
		tokio::time::advance(Duration::from_millis(150)).await;
	}

	let snapshot = session.settled().await.expect("Session closed.");
	let requests = backend.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].term(), "bert");
	assert_eq!(requests[0].page(), 0);
	assert_eq!(snapshot.criteria.term, "bert");
	assert_eq!(snapshot.criteria.page, 0);
	assert_eq!(ids(&snapshot.results), vec!["bert"]);

	session.close().await;
}

#[tokio::test(start_paused = true)]
async fn explicit_commit_discards_pending_keystrokes() {
	let backend = Arc::new(EchoBackend::default());
	let session = Session::spawn(
		Providers::new(backend.clone(), Arc::new(GatedGraph::default())),
		SessionOptions::default(),
	);

	session.input("be").expect("Session closed.");
	session.commit_term("bert").expect("Session closed.");

	let settled = session.settled().await.expect("Session closed.");

	assert!(!settled.debouncing);

	tokio::time::advance(Duration::from_secs(1)).await;

	let snapshot = session.snapshot();
	let requests = backend.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].term(), "bert");
	assert_eq!(snapshot.criteria.term, "bert");

	session.close().await;
}

#[tokio::test]
async fn empty_type_selection_makes_no_network_call() {
	let backend = Arc::new(EchoBackend::default());
	let session = Session::spawn(
		Providers::new(backend.clone(), Arc::new(GatedGraph::default())),
		SessionOptions::default(),
	);

	session.set_types(BTreeSet::new()).expect("Session closed.");
	session.commit_term("bert").expect("Session closed.");

	let snapshot = session.settled().await.expect("Session closed.");

	assert!(backend.requests().is_empty());
	assert_eq!(snapshot.results.total, 0);
	assert!(snapshot.results.items.is_empty());

	session.close().await;
}

#[tokio::test]
async fn older_response_arriving_last_is_ignored() {
	let backend = Arc::new(GatedBackend::default());
	let session = Session::spawn(
		Providers::new(backend.clone(), Arc::new(GatedGraph::default())),
		SessionOptions::default(),
	);

	session.commit_term("a").expect("Session closed.");
	session.commit_term("b").expect("Session closed.");
	wait_for_calls(|| backend.call_count() == 2).await;

	backend.release("b", Ok(page(&["B1"])));

	let settled = session.settled().await.expect("Session closed.");

	assert_eq!(ids(&settled.results), vec!["B1"]);

	backend.release("a", Ok(page(&["A1"])));

	let after = session.changed_since(settled.revision).await.expect("Session closed.");

	assert_eq!(ids(&after.results), vec!["B1"]);
	assert!(!after.loading);
	assert_eq!(after.error, None);

	session.close().await;
}

#[tokio::test]
async fn stale_failure_keeps_newer_request_loading() {
	let backend = Arc::new(GatedBackend::default());
	let session = Session::spawn(
		Providers::new(backend.clone(), Arc::new(GatedGraph::default())),
		SessionOptions::default(),
	);

	session.commit_term("a").expect("Session closed.");
	session.commit_term("b").expect("Session closed.");
	wait_for_calls(|| backend.call_count() == 2).await;

	let before = session.snapshot().revision;

	backend.release("a", Err(orkg_providers::Error::Status { status: 500, body: "late".to_string() }));

	let after = session.changed_since(before).await.expect("Session closed.");

	assert!(after.loading);
	assert_eq!(after.error, None);

	backend.release("b", Ok(page(&["B1"])));

	let settled = session.settled().await.expect("Session closed.");

	assert_eq!(ids(&settled.results), vec!["B1"]);

	session.close().await;
}

#[tokio::test]
async fn cleared_template_is_not_repopulated_by_late_lookup() {
	let graph = Arc::new(GatedGraph::default());
	let session = Session::spawn(
		Providers::new(Arc::new(EchoBackend::default()), graph.clone()),
		SessionOptions::default(),
	);

	session.set_template("R108555").expect("Session closed.");
	wait_for_calls(|| graph.lookup_count() == 1).await;
	session.set_template("").expect("Session closed.");

	let cleared = session.settled().await.expect("Session closed.");

	assert_eq!(cleared.template.status, TemplateStatus::Idle);

	graph.release(
		0,
		Ok(vec![TemplateFieldSpec { label: "Model".to_string(), predicate: "P1".to_string() }]),
	);

	let after = session.changed_since(cleared.revision).await.expect("Session closed.");

	assert!(after.template.fields.is_empty());
	assert_eq!(after.template.status, TemplateStatus::Idle);

	session.close().await;
}

async fn search_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
	let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);

	Json(serde_json::json!({
		"total": 2,
		"page": page,
		"size": 25,
		"items": [
			{ "id": "R1", "label": "BERT", "classes": ["Paper"] },
			{ "id": "R3", "label": "ELMo", "classes": ["Paper"] }
		]
	}))
}

async fn template_handler(Path(id): Path<String>) -> impl IntoResponse {
	if id != "R108555" {
		return StatusCode::NOT_FOUND.into_response();
	}

	Json(serde_json::json!({ "properties": [{ "path": { "id": "P1", "label": "Model" } }] }))
		.into_response()
}

async fn statements_handler() -> Json<Value> {
	Json(serde_json::json!({
		"content": [{ "subject": { "id": "R1" } }, { "subject": { "id": "R2" } }]
	}))
}

#[tokio::test]
async fn template_filter_intersects_results_over_http() {
	let backend_server = MockServer::start(
		Router::new().route("/api/search", routing::get(search_handler)),
	)
	.await
	.expect("Failed to start backend.");
	let graph_server = MockServer::start(
		Router::new()
			.route("/templates/{id}", routing::get(template_handler))
			.route("/statements/", routing::get(statements_handler)),
	)
	.await
	.expect("Failed to start graph.");
	let providers = Providers::new(
		Arc::new(orkg_service::HttpBackend {
			cfg: orkg_config::Backend { api_base: backend_server.base_url(), timeout_ms: 2_000 },
		}),
		Arc::new(orkg_service::HttpGraph {
			cfg: orkg_config::Graph {
				api_base: graph_server.base_url(),
				timeout_ms: 2_000,
				paper_accept: "application/vnd.orkg.paper.v2+json".to_string(),
			},
		}),
	);
	let session = Session::spawn(providers, SessionOptions::default());

	session.commit_term("BERT").expect("Session closed.");

	let searched = session.settled().await.expect("Session closed.");

	assert_eq!(ids(&searched.results), vec!["R1", "R3"]);

	session.set_template("R108555").expect("Session closed.");

	let resolved = session.settled().await.expect("Session closed.");

	assert_eq!(
		resolved.template.fields,
		vec![TemplateFieldSpec { label: "Model".to_string(), predicate: "P1".to_string() }]
	);

	session.apply_field_filter("P1", "BERT").expect("Session closed.");

	let filtered = session.settled().await.expect("Session closed.");

	assert_eq!(ids(&filtered.results), vec!["R1"]);
	assert_eq!(filtered.results.total, 1);
	assert!(filtered.filter.applied);

	session.set_template("R404").expect("Session closed.");

	let missing = session.settled().await.expect("Session closed.");

	assert_eq!(
		missing.template.status,
		TemplateStatus::Failed("Template R404 was not found.".to_string())
	);
	assert_eq!(ids(&missing.results), vec!["R1"]);

	session.close().await;
}
