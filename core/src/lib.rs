pub mod board;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod validation;

pub use board::{reduce, ApiCall, BoardRow, Mutation, Outcome, RowMode, TaskBoard};
pub use error::{TaskError, ValidationError};
pub use model::{NewTask, Scope, Task, TaskId, TaskPatch, TaskStatus, UserId};
pub use repository::{FileTaskRepository, InMemoryTaskRepository, TaskRepository};
pub use service::dto::{CreateTaskRequest, DeleteResponse, SetStatusRequest, UpdateTaskRequest};
pub use service::ordering::{compare_tasks, sort_tasks};
pub use service::task_service::TaskService;
