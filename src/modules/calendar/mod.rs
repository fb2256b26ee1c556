pub mod entity;
pub mod service;
pub mod store;

pub use entity::{
    default_event_end, month_window, CalendarEvent, EventDraft, EventPatch, EventStatus,
};
pub use service::{CalendarService, EventStats};
pub use store::CalendarStore;
