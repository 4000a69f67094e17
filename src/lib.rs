// TaskBoard - Personal task list persisted to a local key-value slot

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod models;
pub mod slot;
pub mod store;

// Re-export main types for convenience
pub use error::ValidationError;
pub use filter::Filter;
pub use format::{format_date, format_date_str};
pub use models::{NewTask, Priority, Task};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{Resolved, TaskStore, View, decode_tasks, encode_tasks, is_overdue, is_overdue_at};
