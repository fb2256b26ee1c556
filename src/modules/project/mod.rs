pub mod entity;
pub mod service;
pub mod store;

pub use entity::{
    Project, ProjectDetail, ProjectDraft, ProjectPatch, ProjectStats, ProjectStatus,
    ProjectTemplate, ProjectWithTechnologies, TechnologySelection, TechnologyUsage,
};
pub use service::ProjectService;
pub use store::ProjectStore;
