use serde::Deserialize;

pub const ALLOWED_PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub graph: Graph,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// The backend proxy that the search session talks to for keyword searches.
#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub api_base: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

/// The upstream knowledge-graph REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct Graph {
	pub api_base: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Accept header required by the papers endpoint to return the v2 representation.
	#[serde(default = "default_paper_accept")]
	pub paper_accept: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
	#[serde(default = "default_page_size")]
	pub default_page_size: u32,
	/// Upper bound accepted by the proxy for the `size` query parameter.
	#[serde(default = "default_max_page_size")]
	pub max_page_size: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			debounce_ms: default_debounce_ms(),
			default_page_size: default_page_size(),
			max_page_size: default_max_page_size(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_timeout_ms() -> u64 {
	30_000
}

fn default_paper_accept() -> String {
	"application/vnd.orkg.paper.v2+json".to_string()
}

fn default_debounce_ms() -> u64 {
	400
}

fn default_page_size() -> u32 {
	25
}

fn default_max_page_size() -> u32 {
	500
}
