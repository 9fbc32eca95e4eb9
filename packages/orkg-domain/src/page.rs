use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResultItem {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub classes: Vec<String>,
}

/// One page of search results. Holds at most `size` items.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResultPage {
	pub total: u64,
	pub page: u32,
	pub size: u32,
	pub items: Vec<ResultItem>,
}
impl ResultPage {
	pub fn new(total: u64, page: u32, size: u32, mut items: Vec<ResultItem>) -> Self {
		let size = size.max(1);

		items.truncate(size as usize);

		Self { total, page, size, items }
	}

	pub fn empty(page: u32, size: u32) -> Self {
		Self::new(0, page, size, Vec::new())
	}
}

/// A template property that can be used as a predicate filter.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TemplateFieldSpec {
	pub label: String,
	pub predicate: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item(id: &str) -> ResultItem {
		ResultItem { id: id.to_string(), label: String::new(), classes: Vec::new() }
	}

	#[test]
	fn truncates_items_to_size() {
		let page = ResultPage::new(3, 0, 2, vec![item("R1"), item("R2"), item("R3")]);

		assert_eq!(page.items.len(), 2);
		assert_eq!(page.total, 3);
	}

	#[test]
	fn zero_size_is_clamped() {
		assert_eq!(ResultPage::empty(0, 0).size, 1);
	}
}
