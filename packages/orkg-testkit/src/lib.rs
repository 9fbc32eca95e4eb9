mod error;

pub use error::{Error, Result};

use std::{future::IntoFuture, net::SocketAddr, time::Duration};

use axum::Router;
use tokio::{
	net::TcpListener,
	sync::oneshot::{self, Sender},
	time,
};

/// An axum router served on an ephemeral loopback port for the lifetime of the value.
pub struct MockServer {
	addr: SocketAddr,
	shutdown: Option<Sender<()>>,
}
impl MockServer {
	pub async fn start(app: Router) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { addr, shutdown: Some(tx) })
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn shutdown(mut self) {
		self.stop();
	}

	fn stop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}
impl Drop for MockServer {
	fn drop(&mut self) {
		self.stop();
	}
}

/// Base URL of a loopback port with nothing listening, for connection failure tests.
pub fn unreachable_base_url() -> String {
	"http://127.0.0.1:1".to_string()
}

/// Polls `check` until it returns true or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> Result<()>
where
	F: FnMut() -> bool,
{
	let deadline = time::Instant::now() + timeout;

	loop {
		if check() {
			return Ok(());
		}
		if time::Instant::now() >= deadline {
			return Err(Error::Message(format!("Condition not met within {timeout:?}.")));
		}

		time::sleep(Duration::from_millis(10)).await;
	}
}
