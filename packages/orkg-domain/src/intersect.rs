use std::collections::HashSet;

use crate::ResultPage;

/// Keeps only the items whose id is in `subject_ids` and recounts `total`.
///
/// Applied to whatever page is currently shown, so successive filters compose as a logical AND.
pub fn intersect_page(page: &ResultPage, subject_ids: &HashSet<String>) -> ResultPage {
	let items: Vec<_> =
		page.items.iter().filter(|item| subject_ids.contains(&item.id)).cloned().collect();

	ResultPage { total: items.len() as u64, page: page.page, size: page.size, items }
}
