pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskId, TaskPatch, TaskStatus, TITLE_MAX_CHARS};
pub use user::{Scope, UserId};
