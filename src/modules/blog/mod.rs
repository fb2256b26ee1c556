pub mod entity;
pub mod service;
pub mod store;

pub use entity::{derive_slug, BlogPost, BlogPostDraft, BlogPostPatch, PostStatus};
pub use service::BlogService;
pub use store::BlogStore;
