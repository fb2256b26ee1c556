pub mod service;
pub mod store;

pub use service::{SearchEntity, SearchFilters, SearchHit, SearchService};
pub use store::SearchStore;
