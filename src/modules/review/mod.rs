pub mod entity;
pub mod service;
pub mod store;

pub use entity::{
    Review, ReviewDraft, ReviewPage, ReviewPageRequest, ReviewPatch, ReviewSort, ReviewStats,
};
pub use service::ReviewService;
pub use store::ReviewStore;
