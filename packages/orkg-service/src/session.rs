use std::{
	collections::BTreeSet,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use tokio::{
	sync::{mpsc, watch},
	task::JoinHandle,
	time::{self, Instant},
};

use orkg_domain::{PageSize, PaperFilters, ResourceType, ResultPage, TemplateFieldSpec};

use crate::{
	Error, Providers, Result,
	debounce::Debouncer,
	state::{PendingFilter, PendingLookup, PendingRequest, SearchState, Snapshot},
};

#[derive(Clone, Debug)]
pub struct SessionOptions {
	pub debounce: Duration,
	pub page_size: PageSize,
}
impl SessionOptions {
	pub fn from_config(cfg: &orkg_config::Search) -> Result<Self> {
		Ok(Self {
			debounce: Duration::from_millis(cfg.debounce_ms),
			page_size: PageSize::try_from(cfg.default_page_size)?,
		})
	}
}
impl Default for SessionOptions {
	fn default() -> Self {
		Self { debounce: Duration::from_millis(400), page_size: PageSize::default() }
	}
}

#[derive(Clone, Debug)]
pub enum Command {
	/// Raw keystroke input; debounced before it becomes the search term.
	Input(String),
	/// Commits a term immediately, skipping the quiet interval.
	CommitTerm(String),
	SetTypes(BTreeSet<ResourceType>),
	SetPaperFilters(PaperFilters),
	SetPage(u32),
	SetPageSize(PageSize),
	SetTemplate(String),
	ApplyFieldFilter { predicate: String, value: String },
}

enum Completion {
	Search { generation: u64, outcome: orkg_providers::Result<ResultPage> },
	Template { generation: u64, outcome: orkg_providers::Result<Vec<TemplateFieldSpec>> },
	Filter { generation: u64, outcome: orkg_providers::Result<Vec<String>> },
}

/// Handle to a search session running on its own task.
///
/// The task is the only writer of [`SearchState`]; callers send commands and observe
/// [`Snapshot`]s.
pub struct Session {
	commands: mpsc::UnboundedSender<Command>,
	snapshots: watch::Receiver<Snapshot>,
	sent: Arc<AtomicU64>,
	task: JoinHandle<()>,
}
impl Session {
	pub fn spawn(providers: Providers, options: SessionOptions) -> Self {
		let state = SearchState::new(options.page_size);
		let (snapshot_tx, snapshots) = watch::channel(state.snapshot(false, 0, 0));
		let (commands, command_rx) = mpsc::unbounded_channel();
		let (completion_tx, completion_rx) = mpsc::unbounded_channel();
		let driver = Driver {
			state,
			debouncer: Debouncer::new(options.debounce),
			providers,
			completion_tx,
			snapshot_tx,
			commands_applied: 0,
			revision: 0,
		};
		let task = tokio::spawn(driver.run(command_rx, completion_rx));

		Self { commands, snapshots, sent: Arc::new(AtomicU64::new(0)), task }
	}

	pub fn send(&self, command: Command) -> Result<()> {
		self.commands.send(command).map_err(|_| Error::SessionClosed)?;
		self.sent.fetch_add(1, Ordering::SeqCst);

		Ok(())
	}

	pub fn input(&self, text: impl Into<String>) -> Result<()> {
		self.send(Command::Input(text.into()))
	}

	pub fn commit_term(&self, term: impl Into<String>) -> Result<()> {
		self.send(Command::CommitTerm(term.into()))
	}

	pub fn set_types(&self, types: BTreeSet<ResourceType>) -> Result<()> {
		self.send(Command::SetTypes(types))
	}

	pub fn set_paper_filters(&self, filters: PaperFilters) -> Result<()> {
		self.send(Command::SetPaperFilters(filters))
	}

	pub fn set_page(&self, page: u32) -> Result<()> {
		self.send(Command::SetPage(page))
	}

	pub fn set_page_size(&self, size: u32) -> Result<()> {
		self.send(Command::SetPageSize(PageSize::try_from(size)?))
	}

	pub fn set_template(&self, template_id: impl Into<String>) -> Result<()> {
		self.send(Command::SetTemplate(template_id.into()))
	}

	pub fn apply_field_filter(
		&self,
		predicate: impl Into<String>,
		value: impl Into<String>,
	) -> Result<()> {
		self.send(Command::ApplyFieldFilter { predicate: predicate.into(), value: value.into() })
	}

	pub fn snapshot(&self) -> Snapshot {
		self.snapshots.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
		self.snapshots.clone()
	}

	/// Waits until every command sent so far has been processed and nothing is pending.
	pub async fn settled(&self) -> Result<Snapshot> {
		let sent = self.sent.load(Ordering::SeqCst);
		let mut rx = self.snapshots.clone();
		let snapshot = rx
			.wait_for(|snapshot| snapshot.commands_applied >= sent && snapshot.is_idle())
			.await
			.map_err(|_| Error::SessionClosed)?;

		Ok(snapshot.clone())
	}

	/// Waits for the first snapshot whose revision is past `revision`.
	pub async fn changed_since(&self, revision: u64) -> Result<Snapshot> {
		let mut rx = self.snapshots.clone();
		let snapshot = rx
			.wait_for(|snapshot| snapshot.revision > revision)
			.await
			.map_err(|_| Error::SessionClosed)?;

		Ok(snapshot.clone())
	}

	/// Stops the session, cancelling any outstanding requests.
	pub async fn close(self) {
		let Self { commands, task, .. } = self;

		drop(commands);

		if let Err(err) = task.await {
			tracing::error!(error = %err, "Search session task failed.");
		}
	}
}

struct Driver {
	state: SearchState,
	debouncer: Debouncer,
	providers: Providers,
	completion_tx: mpsc::UnboundedSender<Completion>,
	snapshot_tx: watch::Sender<Snapshot>,
	commands_applied: u64,
	revision: u64,
}
impl Driver {
	async fn run(
		mut self,
		mut commands: mpsc::UnboundedReceiver<Command>,
		mut completions: mpsc::UnboundedReceiver<Completion>,
	) {
		loop {
			let deadline = self.debouncer.deadline();

			tokio::select! {
				command = commands.recv() => {
					let Some(command) = command else {
						break;
					};

					self.handle(command);
					self.commands_applied += 1;
				},
				Some(completion) = completions.recv() => self.complete(completion),
				_ = wait_deadline(deadline) => {
					if let Some(term) = self.debouncer.poll(Instant::now()) {
						tracing::debug!(%term, "Search term committed.");

						let pending = self.state.commit_term(term);

						self.dispatch_search(pending);
					}
				},
			}

			self.publish();
		}

		self.state.shutdown();
	}

	fn handle(&mut self, command: Command) {
		match command {
			Command::Input(text) => self.debouncer.push(text, Instant::now()),
			Command::CommitTerm(term) => {
				self.debouncer.cancel();

				let pending = self.state.commit_term(term);

				self.dispatch_search(pending);
			},
			Command::SetTypes(types) => {
				let pending = self.state.set_types(types);

				self.dispatch_search(pending);
			},
			Command::SetPaperFilters(filters) => {
				let pending = self.state.set_paper_filters(filters);

				self.dispatch_search(pending);
			},
			Command::SetPage(page) => {
				let pending = self.state.set_page(page);

				self.dispatch_search(pending);
			},
			Command::SetPageSize(size) => {
				let pending = self.state.set_page_size(size);

				self.dispatch_search(pending);
			},
			Command::SetTemplate(template_id) => {
				let pending = self.state.set_template_id(&template_id);

				self.dispatch_lookup(pending);
			},
			Command::ApplyFieldFilter { predicate, value } => {
				let pending = self.state.apply_field_filter(&predicate, &value);

				self.dispatch_filter(pending);
			},
		}
	}

	fn complete(&mut self, completion: Completion) {
		let resolution = match completion {
			Completion::Search { generation, outcome } =>
				self.state.resolve_search(generation, outcome),
			Completion::Template { generation, outcome } =>
				self.state.resolve_template(generation, outcome),
			Completion::Filter { generation, outcome } =>
				self.state.resolve_filter(generation, outcome),
		};

		tracing::trace!(?resolution, "Completion processed.");
	}

	fn dispatch_search(&self, pending: Option<PendingRequest>) {
		let Some(PendingRequest { generation, cancel, request }) = pending else {
			return;
		};
		let backend = self.providers.backend.clone();
		let tx = self.completion_tx.clone();

		tokio::spawn(async move {
			let outcome = backend.search(&request, &cancel).await;
			let _ = tx.send(Completion::Search { generation, outcome });
		});
	}

	fn dispatch_lookup(&self, pending: Option<PendingLookup>) {
		let Some(PendingLookup { generation, cancel, template_id }) = pending else {
			return;
		};
		let graph = self.providers.graph.clone();
		let tx = self.completion_tx.clone();

		tokio::spawn(async move {
			let outcome = graph.template_fields(&template_id, &cancel).await;
			let _ = tx.send(Completion::Template { generation, outcome });
		});
	}

	fn dispatch_filter(&self, pending: Option<PendingFilter>) {
		let Some(PendingFilter { generation, cancel, predicate, value }) = pending else {
			return;
		};
		let graph = self.providers.graph.clone();
		let tx = self.completion_tx.clone();

		tokio::spawn(async move {
			let outcome = graph.subject_ids(&predicate, &value, &cancel).await;
			let _ = tx.send(Completion::Filter { generation, outcome });
		});
	}

	fn publish(&mut self) {
		self.revision += 1;

		let snapshot =
			self.state.snapshot(self.debouncer.is_armed(), self.commands_applied, self.revision);

		self.snapshot_tx.send_replace(snapshot);
	}
}

async fn wait_deadline(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}
