//! Task tracking for `Taskboard`.
//!
//! Provides the keyed in-memory [`TaskStore`] with create, assign,
//! status-update, filter and overdue operations. Every operation returns
//! owned snapshots and signals failures through [`TaskError`].

pub mod store;
pub mod validate;
pub mod workflow;

pub use store::TaskStore;
pub use validate::validate_new_task;
pub use workflow::Workflow;

use taskboard_proto::task::{TaskKind, TaskStatus};
use thiserror::Error;

/// Errors that can occur during task operations.
///
/// A failed operation never changes the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task with the given ID was not found.
    #[error("task not found: {0}")]
    NotFound(String),
    /// The task input was rejected before anything was stored.
    #[error("invalid task: {0}")]
    Validation(#[from] ValidationError),
    /// The configured workflow does not allow this status change.
    #[error("status change from {from} to {to} is not allowed")]
    InvalidTransition {
        /// Current status of the task.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },
}

/// Reasons a [`NewTask`](taskboard_proto::task::NewTask) is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty or only whitespace.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Configured maximum, in characters.
        max: usize,
    },
    /// A field the task kind requires is empty.
    #[error("{field} is required for {kind} tasks")]
    MissingField {
        /// Kind of the rejected task.
        kind: TaskKind,
        /// JSON name of the missing field.
        field: &'static str,
    },
    /// An entry in the documentation audience list is empty.
    #[error("target audience entry {index} is empty")]
    EmptyAudience {
        /// Zero-based position of the empty entry.
        index: usize,
    },
}
