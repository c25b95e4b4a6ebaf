pub mod categorize;
pub mod consolidate;

pub use categorize::{categorize, categorize_issue, CATEGORY_RULES};
pub use consolidate::{consolidate, group_key};
