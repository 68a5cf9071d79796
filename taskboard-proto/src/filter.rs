//! Equality-based task filtering.

use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task, TaskKind, TaskStatus};

/// A partial set of equality constraints over task fields.
///
/// Absent fields are wildcards, so the default filter matches every task.
/// `assignee` is compared case-sensitively and never matches an unassigned
/// task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    /// Required task kind.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TaskKind>,
    /// Required priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Required status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Required assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl TaskFilter {
    /// Creates an empty filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Returns `true` if no constraint is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
    }

    /// Returns `true` if every present constraint equals the task's field.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.kind.is_none_or(|kind| task.kind() == kind)
            && self.priority.is_none_or(|priority| task.priority == priority)
            && self.status.is_none_or(|status| task.status == status)
            && self
                .assignee
                .as_deref()
                .is_none_or(|assignee| task.assignee.as_deref() == Some(assignee))
    }
}
