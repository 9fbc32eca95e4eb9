use std::time::Duration;

use tokio::time::Instant;

/// Holds the latest raw input until it has been stable for the quiet interval.
#[derive(Debug)]
pub struct Debouncer {
	quiet: Duration,
	pending: Option<(String, Instant)>,
}
impl Debouncer {
	pub fn new(quiet: Duration) -> Self {
		Self { quiet, pending: None }
	}

	/// Replaces any pending value and restarts the interval.
	pub fn push(&mut self, value: String, now: Instant) {
		self.pending = Some((value, now + self.quiet));
	}

	/// Drops the pending value without emitting it.
	pub fn cancel(&mut self) {
		self.pending = None;
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.pending.as_ref().map(|(_, deadline)| *deadline)
	}

	pub fn is_armed(&self) -> bool {
		self.pending.is_some()
	}

	/// Returns the committed value once its deadline has passed.
	pub fn poll(&mut self, now: Instant) -> Option<String> {
		match &self.pending {
			Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(value, _)| value),
			_ => None,
		}
	}
}
