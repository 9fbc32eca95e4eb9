pub mod debounce;
pub mod session;
pub mod state;

mod error;

pub use error::{Error, Result};
pub use session::{Command, Session, SessionOptions};
pub use state::{
	FilterSnapshot, PendingFilter, PendingLookup, PendingRequest, Resolution, SearchState,
	Snapshot, TemplateSnapshot, TemplateStatus,
};

use std::{future::Future, pin::Pin, sync::Arc};

use tokio_util::sync::CancellationToken;

use orkg_domain::{ResultPage, SearchRequest, TemplateFieldSpec};
use orkg_providers::{backend, graph};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		request: &'a SearchRequest,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<ResultPage>>;
}

pub trait GraphApi
where
	Self: Send + Sync,
{
	fn template_fields<'a>(
		&'a self,
		template_id: &'a str,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<Vec<TemplateFieldSpec>>>;

	fn subject_ids<'a>(
		&'a self,
		predicate: &'a str,
		value: &'a str,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<Vec<String>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub backend: Arc<dyn SearchBackend>,
	pub graph: Arc<dyn GraphApi>,
}
impl Providers {
	pub fn new(backend: Arc<dyn SearchBackend>, graph: Arc<dyn GraphApi>) -> Self {
		Self { backend, graph }
	}

	pub fn http(cfg: &orkg_config::Config) -> Self {
		Self::new(
			Arc::new(HttpBackend { cfg: cfg.backend.clone() }),
			Arc::new(HttpGraph { cfg: cfg.graph.clone() }),
		)
	}
}

pub struct HttpBackend {
	pub cfg: orkg_config::Backend,
}
impl SearchBackend for HttpBackend {
	fn search<'a>(
		&'a self,
		request: &'a SearchRequest,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<ResultPage>> {
		Box::pin(backend::search(&self.cfg, request, cancel))
	}
}

pub struct HttpGraph {
	pub cfg: orkg_config::Graph,
}
impl GraphApi for HttpGraph {
	fn template_fields<'a>(
		&'a self,
		template_id: &'a str,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<Vec<TemplateFieldSpec>>> {
		Box::pin(graph::template_fields(&self.cfg, template_id, cancel))
	}

	fn subject_ids<'a>(
		&'a self,
		predicate: &'a str,
		value: &'a str,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, orkg_providers::Result<Vec<String>>> {
		Box::pin(graph::subject_ids(&self.cfg, predicate, value, cancel))
	}
}
