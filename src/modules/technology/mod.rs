pub mod entity;
pub mod service;
pub mod store;

pub use entity::{
    normalized_category, normalized_color, Technology, TechnologyDraft, TechnologyPatch,
};
pub use service::TechnologyService;
pub use store::TechnologyStore;
