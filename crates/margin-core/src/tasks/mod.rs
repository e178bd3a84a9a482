//! Things 3 task store: read-only queries over the local database and
//! URL-scheme writes.

pub mod format;
pub mod models;
pub mod store;
pub mod url;

pub use format::{
    format_project_list, format_task, format_task_list, summarize_tasks, FormatOptions, GroupBy,
};
pub use models::{
    Area, ItemRef, ProjectOverview, StartBucket, TagRecord, Task, TaskKind, TaskStatus,
};
pub use store::{resolve_database_path, TaskSearch, TaskStore};
pub use url::{NewProject, NewTodo, SystemOpener, TaskUpdate, TaskWriter, UrlOpener};
