pub mod debounce;
pub mod filter;
pub mod list_query;
pub mod search;

pub use debounce::Debouncer;
pub use filter::{FilterMode, FilterSet, FilterSpec, FilterValue};
pub use list_query::ListQuery;
pub use search::{apply_search, SearchOptions};
