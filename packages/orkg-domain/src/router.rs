//! Chooses the request shape for a set of search criteria.
//!
//! Author and year narrowing is only understood by the papers path, so it is honored only when
//! papers are the single active facet. Every other combination becomes a generic multi-type
//! search.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{PaperFilters, ResourceType, SearchCriteria};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SearchRequest {
	Generic { term: String, page: u32, size: u32, types: BTreeSet<ResourceType> },
	Paper { term: String, page: u32, size: u32, filters: PaperFilters },
}
impl SearchRequest {
	pub fn term(&self) -> &str {
		match self {
			Self::Generic { term, .. } | Self::Paper { term, .. } => term,
		}
	}

	pub fn page(&self) -> u32 {
		match self {
			Self::Generic { page, .. } | Self::Paper { page, .. } => *page,
		}
	}

	pub fn size(&self) -> u32 {
		match self {
			Self::Generic { size, .. } | Self::Paper { size, .. } => *size,
		}
	}

	/// True when the answer is known to be an empty page without asking the backend: a blank
	/// term, or a generic search over zero types.
	pub fn is_local_empty(&self) -> bool {
		if self.term().trim().is_empty() {
			return true;
		}

		matches!(self, Self::Generic { types, .. } if types.is_empty())
	}

	/// Query string pairs for `GET /api/search`.
	pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = vec![
			("q", self.term().trim().to_string()),
			("page", self.page().to_string()),
			("size", self.size().to_string()),
		];

		match self {
			Self::Generic { types, .. } => pairs.push(("classes", ResourceType::join(types))),
			Self::Paper { filters, .. } => {
				pairs.push(("classes", ResourceType::Paper.as_str().to_string()));

				if let Some(author) = filters.author() {
					pairs.push(("author", author.to_string()));
				}
				if let Some(year) = filters.year_from {
					pairs.push(("year_from", year.to_string()));
				}
				if let Some(year) = filters.year_to {
					pairs.push(("year_to", year.to_string()));
				}
			},
		}

		pairs
	}
}

pub fn route(criteria: &SearchCriteria) -> SearchRequest {
	let term = criteria.term.clone();
	let page = criteria.page;
	let size = criteria.page_size.get();

	match criteria.active_paper_filters() {
		Some(filters) => SearchRequest::Paper { term, page, size, filters: filters.clone() },
		None => SearchRequest::Generic { term, page, size, types: criteria.selected_types.clone() },
	}
}
