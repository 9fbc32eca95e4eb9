pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Search session is closed.")]
	SessionClosed,
	#[error(transparent)]
	Domain(#[from] orkg_domain::Error),
}
