pub mod export;
pub mod format;
pub mod import;
pub mod list;
pub mod remove;
pub mod repos;
pub mod show;
