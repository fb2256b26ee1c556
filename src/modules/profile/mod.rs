pub mod entity;
pub mod service;
pub mod session;
pub mod store;

pub use entity::{Certification, User, UserDraft, UserPatch};
pub use service::UserService;
pub use session::Session;
pub use store::ProfileStore;
