use serde::Serialize;

use super::filter::FilterSet;
use super::search::{apply_search, SearchOptions};

/// Combined filter-then-search pipeline over an in-memory collection, with
/// the derived "anything active?" flag list toolbars need.
#[derive(Clone)]
pub struct ListQuery<T> {
    pub filters: FilterSet<T>,
    search: SearchOptions,
    term: String,
}

impl<T> ListQuery<T> {
    pub fn new(filters: FilterSet<T>, search: SearchOptions) -> Self {
        Self {
            filters,
            search,
            term: String::new(),
        }
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.term = term.to_string();
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    /// Filters first, then text search over the filtered subset.
    pub fn apply(&self, items: &[T]) -> Vec<T>
    where
        T: Serialize + Clone,
    {
        let filtered = self.filters.apply(items);
        apply_search(&filtered, &self.term, &self.search)
    }

    pub fn has_active_search_or_filter(&self) -> bool {
        !self.term.trim().is_empty() || self.filters.has_active()
    }

    /// Resets search term and every filter value in one step.
    pub fn clear_all(&mut self) {
        self.term.clear();
        self.filters.clear();
    }
}
