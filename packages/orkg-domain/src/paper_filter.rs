use serde::{Deserialize, Serialize};

use crate::{PaperFilters, ResourceType, ResultItem};

/// A paper as returned by the papers endpoint, reduced to what local filtering needs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PaperRecord {
	pub id: String,
	pub title: String,
	pub year: Option<i32>,
	pub authors: Vec<String>,
}
impl PaperRecord {
	pub fn into_item(self) -> ResultItem {
		ResultItem {
			id: self.id,
			label: self.title,
			classes: vec![ResourceType::Paper.as_str().to_string()],
		}
	}
}

/// Author match is a case-insensitive substring over any author name. Year bounds are
/// inclusive, and a paper without a year fails any bound.
pub fn matches(paper: &PaperRecord, filters: &PaperFilters) -> bool {
	if let Some(author) = filters.author() {
		let needle = author.to_lowercase();

		if !paper.authors.iter().any(|name| name.to_lowercase().contains(&needle)) {
			return false;
		}
	}
	if let Some(from) = filters.year_from
		&& paper.year.is_none_or(|year| year < from)
	{
		return false;
	}
	if let Some(to) = filters.year_to
		&& paper.year.is_none_or(|year| year > to)
	{
		return false;
	}

	true
}

pub fn filter_papers(papers: Vec<PaperRecord>, filters: &PaperFilters) -> Vec<ResultItem> {
	papers
		.into_iter()
		.filter(|paper| !paper.id.is_empty() && matches(paper, filters))
		.map(PaperRecord::into_item)
		.collect()
}
