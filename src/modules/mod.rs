pub mod blog;
pub mod cache;
pub mod calendar;
pub mod career;
pub mod listview;
pub mod profile;
pub mod project;
pub mod remote;
pub mod review;
pub mod search;
pub mod storage;
pub mod technology;
