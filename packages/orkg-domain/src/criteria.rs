use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Resource classes a search can be restricted to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ResourceType {
	Paper,
	Comparison,
	Visualization,
	SmartReview,
	LiteratureList,
	Problem,
	ResearchField,
	Contribution,
	Software,
	Dataset,
	Template,
}
impl ResourceType {
	pub const ALL: [Self; 11] = [
		Self::Paper,
		Self::Comparison,
		Self::Visualization,
		Self::SmartReview,
		Self::LiteratureList,
		Self::Problem,
		Self::ResearchField,
		Self::Contribution,
		Self::Software,
		Self::Dataset,
		Self::Template,
	];

	/// Class name as understood by the knowledge graph.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Paper => "Paper",
			Self::Comparison => "Comparison",
			Self::Visualization => "Visualization",
			Self::SmartReview => "SmartReview",
			Self::LiteratureList => "LiteratureList",
			Self::Problem => "Problem",
			Self::ResearchField => "ResearchField",
			Self::Contribution => "Contribution",
			Self::Software => "Software",
			Self::Dataset => "Dataset",
			Self::Template => "Template",
		}
	}

	/// Parses a comma separated list, ignoring blank entries.
	pub fn parse_list(raw: &str) -> Result<BTreeSet<Self>> {
		raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::parse).collect()
	}

	pub fn join(types: &BTreeSet<Self>) -> String {
		types.iter().map(|ty| ty.as_str()).collect::<Vec<_>>().join(",")
	}
}
impl FromStr for ResourceType {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		let needle = raw.trim();

		Self::ALL
			.into_iter()
			.find(|ty| ty.as_str().eq_ignore_ascii_case(needle))
			.ok_or_else(|| Error::UnknownResourceType(needle.to_string()))
	}
}
impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
	Ten,
	#[default]
	TwentyFive,
	Fifty,
	Hundred,
}
impl PageSize {
	pub fn get(self) -> u32 {
		match self {
			Self::Ten => 10,
			Self::TwentyFive => 25,
			Self::Fifty => 50,
			Self::Hundred => 100,
		}
	}
}
impl TryFrom<u32> for PageSize {
	type Error = Error;

	fn try_from(value: u32) -> Result<Self> {
		match value {
			10 => Ok(Self::Ten),
			25 => Ok(Self::TwentyFive),
			50 => Ok(Self::Fifty),
			100 => Ok(Self::Hundred),
			other => Err(Error::UnsupportedPageSize(other)),
		}
	}
}
impl From<PageSize> for u32 {
	fn from(size: PageSize) -> Self {
		size.get()
	}
}

/// Author and year narrowing that only applies when papers are the sole selected type.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PaperFilters {
	pub author_contains: String,
	pub year_from: Option<i32>,
	pub year_to: Option<i32>,
}
impl PaperFilters {
	pub fn is_empty(&self) -> bool {
		self.author().is_none() && self.year_from.is_none() && self.year_to.is_none()
	}

	pub fn author(&self) -> Option<&str> {
		let author = self.author_contains.trim();

		(!author.is_empty()).then_some(author)
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SearchCriteria {
	pub term: String,
	pub page: u32,
	pub page_size: PageSize,
	pub selected_types: BTreeSet<ResourceType>,
	pub paper: PaperFilters,
}
impl SearchCriteria {
	pub fn new(page_size: PageSize) -> Self {
		Self { page_size, ..Self::default() }
	}

	pub fn is_paper_only(&self) -> bool {
		self.selected_types.len() == 1 && self.selected_types.contains(&ResourceType::Paper)
	}

	/// Paper filters that take part in routing; `None` unless papers are the only facet.
	pub fn active_paper_filters(&self) -> Option<&PaperFilters> {
		(self.is_paper_only() && !self.paper.is_empty()).then_some(&self.paper)
	}
}
impl Default for SearchCriteria {
	fn default() -> Self {
		Self {
			term: String::new(),
			page: 0,
			page_size: PageSize::default(),
			selected_types: BTreeSet::from([ResourceType::Paper]),
			paper: PaperFilters::default(),
		}
	}
}
