pub mod criteria;
pub mod intersect;
pub mod page;
pub mod paper_filter;
pub mod router;

mod error;

pub use criteria::{PageSize, PaperFilters, ResourceType, SearchCriteria};
pub use error::{Error, Result};
pub use page::{ResultItem, ResultPage, TemplateFieldSpec};
pub use router::{SearchRequest, route};
