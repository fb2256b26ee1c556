pub mod config;
pub mod modules;
pub mod shared;
pub mod state;
pub mod telemetry;

pub use modules::blog;
pub use modules::cache;
pub use modules::calendar;
pub use modules::career;
pub use modules::listview;
pub use modules::profile;
pub use modules::project;
pub use modules::remote;
pub use modules::review;
pub use modules::search;
pub use modules::storage;
pub use modules::technology;

pub use config::AppConfig;
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support;
