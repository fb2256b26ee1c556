pub mod entity;
pub mod service;
pub mod store;

pub use entity::{CareerDraft, CareerEntry, CareerPatch};
pub use service::CareerService;
pub use store::CareerStore;
