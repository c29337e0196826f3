//! A personal, file-backed task tracker.
//!
//! [`TaskStore`] owns the tasks and keeps them in sync with a JSON file;
//! [`display`] turns its results into terminal output.

pub mod config;
pub mod display;
pub mod error;
pub mod store;
pub mod task;

pub use config::Config;
pub use error::StoreError;
pub use store::{LoadOutcome, TaskStore};
pub use task::{Status, Task};
