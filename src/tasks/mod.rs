//! Task record and storage.

pub mod models;
pub mod store;

pub use models::Task;
pub use store::{SqliteTaskStore, TaskStore};
