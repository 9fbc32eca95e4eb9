pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Unknown resource type {0:?}.")]
	UnknownResourceType(String),
	#[error("Unsupported page size {0}; expected one of 10, 25, 50, or 100.")]
	UnsupportedPageSize(u32),
}
