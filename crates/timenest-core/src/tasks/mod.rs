//! Tasks as served by the remote task store.

mod http;
mod model;
mod stats;
mod store;

pub use http::HttpTaskStore;
pub use model::{parse_due_date, parse_due_time, NewTask, Priority, Task, TaskUpdate};
pub use stats::{daily_tasks, is_overdue, TaskStats};
pub use store::TaskStore;
