//! Status transition policy.

use taskboard_proto::task::TaskStatus;

use super::TaskError;

/// Which status changes the store accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Any status may follow any other.
    #[default]
    Free,
    /// todo -> inProgress -> underReview -> done, one step at a time, with
    /// underReview -> inProgress allowed for rework.
    Sequential,
}

impl Workflow {
    /// Returns `true` if a task may move from `from` to `to`.
    ///
    /// Re-setting the current status is always permitted.
    #[must_use]
    pub const fn permits(self, from: TaskStatus, to: TaskStatus) -> bool {
        match self {
            Self::Free => true,
            Self::Sequential => {
                from.position() == to.position()
                    || matches!(
                        (from, to),
                        (TaskStatus::Todo, TaskStatus::InProgress)
                            | (TaskStatus::InProgress, TaskStatus::UnderReview)
                            | (TaskStatus::UnderReview, TaskStatus::Done | TaskStatus::InProgress)
                    )
            }
        }
    }

    /// Checks a status change against this policy.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] if the change is not permitted.
    pub fn check(self, from: TaskStatus, to: TaskStatus) -> Result<(), TaskError> {
        if self.permits(from, to) {
            Ok(())
        } else {
            Err(TaskError::InvalidTransition { from, to })
        }
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}
