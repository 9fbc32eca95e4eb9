pub mod backend;
pub mod graph;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{Client, RequestBuilder, header::HeaderMap};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub fn http_client(timeout_ms: u64, default_headers: HeaderMap) -> Result<Client> {
	Ok(Client::builder()
		.timeout(Duration::from_millis(timeout_ms))
		.default_headers(default_headers)
		.build()?)
}

/// Sends `request` and decodes a JSON body, turning non-2xx responses into
/// [`Error::Status`] with the response text as detail.
pub async fn get_json(request: RequestBuilder) -> Result<Value> {
	let res = request.send().await?;
	let status = res.status();

	if !status.is_success() {
		let body = res.text().await.unwrap_or_default();

		return Err(Error::Status { status: status.as_u16(), body });
	}

	let bytes = res.bytes().await?;

	Ok(serde_json::from_slice(&bytes)?)
}

/// Like [`get_json`], but resolves to [`Error::Cancelled`] as soon as `cancel` fires. The
/// in-flight request is dropped, which aborts the underlying connection.
pub async fn get_json_cancellable(
	request: RequestBuilder,
	cancel: &CancellationToken,
) -> Result<Value> {
	if cancel.is_cancelled() {
		return Err(Error::Cancelled);
	}

	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(Error::Cancelled),
		result = get_json(request) => result,
	}
}

pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
	value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

pub(crate) fn non_negative_number(value: Option<&Value>) -> Option<u64> {
	let value = value?;

	value.as_u64().or_else(|| value.as_f64().filter(|n| n.is_finite() && *n >= 0.0).map(|n| n as u64))
}
