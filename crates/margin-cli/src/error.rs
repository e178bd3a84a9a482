use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] margin_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Task ID cannot be empty")]
    EmptyTaskId,
    #[error("No task found with UUID: {0}")]
    TaskNotFound(String),
    #[error("Nothing to update. Pass at least one field to change.")]
    EmptyUpdate,
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    /// Failure already written to the terminal in the command's own format
    #[error("command failed")]
    Reported,
}
