use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
	pub graph: Arc<orkg_config::Graph>,
	pub max_page_size: u32,
}
impl AppState {
	pub fn new(config: &orkg_config::Config) -> Self {
		Self { graph: Arc::new(config.graph.clone()), max_page_size: config.search.max_page_size }
	}
}
