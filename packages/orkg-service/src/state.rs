//! The single owner of search session state.
//!
//! Every user action and every network completion goes through one of the transition methods
//! below. Actions that need network work hand back a `Pending*` value carrying the generation
//! and cancellation token the caller must use; completions are only applied when their
//! generation is still the current one for that operation.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use orkg_domain::{
	PageSize, PaperFilters, ResourceType, ResultPage, SearchCriteria, SearchRequest,
	TemplateFieldSpec, intersect, route,
};

#[derive(Debug, Clone)]
pub struct PendingRequest {
	pub generation: u64,
	pub cancel: CancellationToken,
	pub request: SearchRequest,
}

#[derive(Debug, Clone)]
pub struct PendingLookup {
	pub generation: u64,
	pub cancel: CancellationToken,
	pub template_id: String,
}

#[derive(Debug, Clone)]
pub struct PendingFilter {
	pub generation: u64,
	pub cancel: CancellationToken,
	pub predicate: String,
	pub value: String,
}

/// What happened to a completion handed to a `resolve_*` method.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
	Applied,
	Failed,
	Stale,
	Cancelled,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum TemplateStatus {
	Idle,
	Loading,
	Failed(String),
	NoFields,
	Ready,
}

#[derive(Clone, Debug, Serialize)]
pub struct TemplateSnapshot {
	pub template_id: String,
	pub fields: Vec<TemplateFieldSpec>,
	pub status: TemplateStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct FilterSnapshot {
	pub predicate: Option<String>,
	pub value: String,
	pub loading: bool,
	pub applied: bool,
	pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
	pub criteria: SearchCriteria,
	pub results: ResultPage,
	pub loading: bool,
	pub error: Option<String>,
	pub template: TemplateSnapshot,
	pub filter: FilterSnapshot,
	pub debouncing: bool,
	/// Number of commands the session loop has processed.
	pub commands_applied: u64,
	/// Bumped on every processed command and completion.
	pub revision: u64,
}
impl Snapshot {
	pub fn is_idle(&self) -> bool {
		!self.loading
			&& !self.debouncing
			&& !self.filter.loading
			&& self.template.status != TemplateStatus::Loading
	}
}

/// Generation counter plus the token of the one request allowed to be outstanding.
#[derive(Debug, Default)]
struct Slot {
	generation: u64,
	cancel: Option<CancellationToken>,
}
impl Slot {
	fn issue(&mut self) -> (u64, CancellationToken) {
		self.invalidate();

		let token = CancellationToken::new();

		self.cancel = Some(token.clone());

		(self.generation, token)
	}

	fn invalidate(&mut self) {
		self.generation += 1;

		if let Some(token) = self.cancel.take() {
			token.cancel();
		}
	}

	fn is_pending(&self) -> bool {
		self.cancel.is_some()
	}

	/// Releases the slot if `generation` is the outstanding one.
	fn settle(&mut self, generation: u64) -> bool {
		if self.generation != generation || self.cancel.is_none() {
			return false;
		}

		self.cancel = None;

		true
	}
}

#[derive(Debug, Default)]
struct TemplateState {
	id: String,
	fields: Vec<TemplateFieldSpec>,
	error: Option<String>,
	slot: Slot,
}

#[derive(Debug, Default)]
struct FilterState {
	predicate: Option<String>,
	value: String,
	applied: bool,
	error: Option<String>,
	slot: Slot,
}

#[derive(Debug)]
pub struct SearchState {
	criteria: SearchCriteria,
	results: ResultPage,
	error: Option<String>,
	search: Slot,
	template: TemplateState,
	filter: FilterState,
}
impl SearchState {
	pub fn new(page_size: PageSize) -> Self {
		Self {
			criteria: SearchCriteria::new(page_size),
			results: ResultPage::empty(0, page_size.get()),
			error: None,
			search: Slot::default(),
			template: TemplateState::default(),
			filter: FilterState::default(),
		}
	}

	pub fn criteria(&self) -> &SearchCriteria {
		&self.criteria
	}

	pub fn results(&self) -> &ResultPage {
		&self.results
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn is_loading(&self) -> bool {
		self.search.is_pending()
	}

	pub fn fields(&self) -> &[TemplateFieldSpec] {
		&self.template.fields
	}

	pub fn template_status(&self) -> TemplateStatus {
		if self.template.id.is_empty() {
			TemplateStatus::Idle
		} else if self.template.slot.is_pending() {
			TemplateStatus::Loading
		} else if let Some(message) = &self.template.error {
			TemplateStatus::Failed(message.clone())
		} else if self.template.fields.is_empty() {
			TemplateStatus::NoFields
		} else {
			TemplateStatus::Ready
		}
	}

	pub fn snapshot(&self, debouncing: bool, commands_applied: u64, revision: u64) -> Snapshot {
		Snapshot {
			criteria: self.criteria.clone(),
			results: self.results.clone(),
			loading: self.is_loading(),
			error: self.error.clone(),
			template: TemplateSnapshot {
				template_id: self.template.id.clone(),
				fields: self.template.fields.clone(),
				status: self.template_status(),
			},
			filter: FilterSnapshot {
				predicate: self.filter.predicate.clone(),
				value: self.filter.value.clone(),
				loading: self.filter.slot.is_pending(),
				applied: self.filter.applied,
				error: self.filter.error.clone(),
			},
			debouncing,
			commands_applied,
			revision,
		}
	}

	/// A debounced term became stable. Always restarts from the first page.
	pub fn commit_term(&mut self, term: String) -> Option<PendingRequest> {
		self.criteria.term = term;
		self.criteria.page = 0;

		self.refresh()
	}

	pub fn set_types(&mut self, types: BTreeSet<ResourceType>) -> Option<PendingRequest> {
		self.criteria.selected_types = types;
		self.criteria.page = 0;

		self.refresh()
	}

	pub fn set_paper_filters(&mut self, filters: PaperFilters) -> Option<PendingRequest> {
		self.criteria.paper = filters;
		self.criteria.page = 0;

		self.refresh()
	}

	pub fn set_page(&mut self, page: u32) -> Option<PendingRequest> {
		self.criteria.page = page;

		self.refresh()
	}

	pub fn set_page_size(&mut self, size: PageSize) -> Option<PendingRequest> {
		self.criteria.page_size = size;
		self.criteria.page = 0;

		self.refresh()
	}

	/// Supersedes any outstanding search and decides what to fetch for the current criteria.
	///
	/// Blank terms and empty type selections resolve to an empty page on the spot.
	pub fn refresh(&mut self) -> Option<PendingRequest> {
		let request = route(&self.criteria);

		self.error = None;
		self.filter.applied = false;

		if request.is_local_empty() {
			self.search.invalidate();
			self.results = ResultPage::empty(request.page(), request.size());

			return None;
		}

		let (generation, cancel) = self.search.issue();

		tracing::debug!(generation, term = request.term(), "Search request issued.");

		Some(PendingRequest { generation, cancel, request })
	}

	pub fn resolve_search(
		&mut self,
		generation: u64,
		outcome: orkg_providers::Result<ResultPage>,
	) -> Resolution {
		if !self.search.settle(generation) {
			tracing::debug!(generation, "Dropping stale search completion.");

			return Resolution::Stale;
		}

		match outcome {
			Ok(page) => {
				self.results = page;
				self.error = None;
				self.filter.applied = false;

				Resolution::Applied
			},
			Err(err) if err.is_cancelled() => Resolution::Cancelled,
			Err(err) => {
				tracing::warn!(generation, error = %err, "Search request failed.");

				self.error = Some(err.to_string());

				Resolution::Failed
			},
		}
	}

	/// Switches templates. The field list and any predicate selection belong to the previous
	/// template and are cleared; outstanding lookups and predicate searches are cancelled.
	pub fn set_template_id(&mut self, template_id: &str) -> Option<PendingLookup> {
		let template_id = template_id.trim().to_string();

		self.template.fields.clear();
		self.template.error = None;
		self.template.id = template_id.clone();
		self.filter.predicate = None;
		self.filter.error = None;
		self.filter.slot.invalidate();

		if template_id.is_empty() {
			self.template.slot.invalidate();

			return None;
		}

		let (generation, cancel) = self.template.slot.issue();

		tracing::debug!(generation, %template_id, "Template lookup issued.");

		Some(PendingLookup { generation, cancel, template_id })
	}

	pub fn resolve_template(
		&mut self,
		generation: u64,
		outcome: orkg_providers::Result<Vec<TemplateFieldSpec>>,
	) -> Resolution {
		if !self.template.slot.settle(generation) {
			tracing::debug!(generation, "Dropping stale template lookup.");

			return Resolution::Stale;
		}

		match outcome {
			Ok(fields) => {
				self.template.fields =
					fields.into_iter().filter(|field| !field.predicate.trim().is_empty()).collect();

				Resolution::Applied
			},
			Err(err) if err.is_cancelled() => Resolution::Cancelled,
			Err(err) => {
				tracing::warn!(generation, error = %err, "Template lookup failed.");

				self.template.fields.clear();
				self.template.error = Some(if err.is_not_found() {
					format!("Template {} was not found.", self.template.id)
				} else {
					err.to_string()
				});

				Resolution::Failed
			},
		}
	}

	/// Starts a predicate search once both a field and a non-blank value are chosen.
	pub fn apply_field_filter(&mut self, predicate: &str, value: &str) -> Option<PendingFilter> {
		let predicate = predicate.trim();

		self.filter.predicate = (!predicate.is_empty()).then(|| predicate.to_string());
		self.filter.value = value.to_string();
		self.filter.error = None;

		if predicate.is_empty() || value.trim().is_empty() {
			self.filter.slot.invalidate();

			return None;
		}

		let (generation, cancel) = self.filter.slot.issue();

		tracing::debug!(generation, predicate, "Predicate search issued.");

		Some(PendingFilter {
			generation,
			cancel,
			predicate: predicate.to_string(),
			value: value.trim().to_string(),
		})
	}

	/// Narrows the page currently shown to the returned subjects.
	pub fn resolve_filter(
		&mut self,
		generation: u64,
		outcome: orkg_providers::Result<Vec<String>>,
	) -> Resolution {
		if !self.filter.slot.settle(generation) {
			tracing::debug!(generation, "Dropping stale predicate search.");

			return Resolution::Stale;
		}

		match outcome {
			Ok(subject_ids) => {
				let ids: HashSet<String> = subject_ids.into_iter().collect();

				self.results = intersect::intersect_page(&self.results, &ids);
				self.filter.applied = true;

				Resolution::Applied
			},
			Err(err) if err.is_cancelled() => Resolution::Cancelled,
			Err(err) => {
				tracing::warn!(generation, error = %err, "Predicate search failed.");

				self.filter.error = Some(err.to_string());

				Resolution::Failed
			},
		}
	}

	/// Cancels every outstanding operation.
	pub fn shutdown(&mut self) {
		self.search.invalidate();
		self.template.slot.invalidate();
		self.filter.slot.invalidate();
	}
}
impl Default for SearchState {
	fn default() -> Self {
		Self::new(PageSize::default())
	}
}
