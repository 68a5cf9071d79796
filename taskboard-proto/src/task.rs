//! Task model types for `Taskboard`.
//!
//! A [`Task`] is a common lifecycle envelope (title, priority, status,
//! deadline, timestamps) around a kind-specific payload, [`TaskDetails`].
//! The JSON form is a single flat object with camelCase keys and a `type`
//! tag naming the kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal urgency.
    Medium,
    /// Needs attention first.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Lifecycle status of a task, in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Work finished, waiting for review.
    UnderReview,
    /// Completed.
    Done,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::UnderReview, Self::Done];

    /// Zero-based position of this status in the workflow.
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::UnderReview => 2,
            Self::Done => 3,
        }
    }

    /// Returns `true` for [`TaskStatus::Done`].
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "inProgress"),
            Self::UnderReview => write!(f, "underReview"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Payload-free tag naming a task's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Code change against a repository.
    Development,
    /// Visual design work against an asset.
    Design,
    /// Writing against a document.
    Documentation,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Design => write!(f, "design"),
            Self::Documentation => write!(f, "documentation"),
        }
    }
}

/// Kind-specific fields of a task.
///
/// Serialized inline with the task envelope; the variant name becomes the
/// `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum TaskDetails {
    /// A development task.
    Development {
        /// Link to the repository the work lands in.
        repo_link: String,
        /// Branch the work happens on, if already known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
    /// A design task.
    Design {
        /// Location of the design asset.
        asset_url: String,
        /// Revision number of the asset.
        revision: u32,
    },
    /// A documentation task.
    Documentation {
        /// Reference to the document being written.
        document_ref: String,
        /// Intended readers, in priority order.
        #[serde(default)]
        target_audience: Vec<String>,
    },
}

impl TaskDetails {
    /// Returns the kind tag for this payload.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Development { .. } => TaskKind::Development,
            Self::Design { .. } => TaskKind::Design,
            Self::Documentation { .. } => TaskKind::Documentation,
        }
    }
}

/// A stored task.
///
/// Values handed out by the store are snapshots: later mutations in the
/// store are not reflected in a previously returned `Task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier, assigned by the store.
    pub id: TaskId,
    /// Short summary of the work.
    pub title: String,
    /// Longer free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Who the task is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Urgency.
    pub priority: Priority,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// When the task is due.
    pub deadline: DateTime<Utc>,
    /// When the task was created. Never changes.
    pub created_at: DateTime<Utc>,
    /// When the task was last changed.
    pub updated_at: DateTime<Utc>,
    /// Kind-specific fields, carrying the `type` tag.
    #[serde(flatten)]
    pub details: TaskDetails,
}

impl Task {
    /// Returns the kind tag of this task.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.details.kind()
    }

    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self.details, TaskDetails::Development { .. })
    }

    #[must_use]
    pub const fn is_design(&self) -> bool {
        matches!(self.details, TaskDetails::Design { .. })
    }

    #[must_use]
    pub const fn is_documentation(&self) -> bool {
        matches!(self.details, TaskDetails::Documentation { .. })
    }

    /// Returns `true` if the task is not done and its deadline is strictly
    /// before `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_done() && self.deadline < now
    }
}

/// Caller-supplied fields for creating a task.
///
/// Everything the store assigns itself (id, status, timestamps) is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Short summary of the work.
    pub title: String,
    /// Longer free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Urgency.
    pub priority: Priority,
    /// When the task is due.
    pub deadline: DateTime<Utc>,
    /// Kind-specific fields, carrying the `type` tag.
    #[serde(flatten)]
    pub details: TaskDetails,
}

impl NewTask {
    /// Creates a new task input with no description or assignee.
    pub fn new(
        title: impl Into<String>,
        priority: Priority,
        deadline: DateTime<Utc>,
        details: TaskDetails,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            assignee: None,
            priority,
            deadline,
            details,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the initial assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}
