//! Keyed in-memory task store.
//!
//! `TaskStore` owns the authoritative `TaskId -> Task` map. Callers only
//! ever receive cloned snapshots; mutations replace the stored entry with
//! an updated copy.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use taskboard_proto::filter::TaskFilter;
use taskboard_proto::task::{NewTask, Task, TaskId, TaskStatus};

use super::TaskError;
use super::validate::validate_new_task;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;

/// In-memory task store.
///
/// Thread-safe via a single [`RwLock`]: create, assign and status updates
/// are serialized against each other, and reads see either the whole of a
/// mutation or none of it.
#[derive(Debug)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store using the system clock and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given settings.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the settings this store was built with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates a new task from caller-supplied fields.
    ///
    /// The store assigns a fresh id, sets the status to
    /// [`TaskStatus::Todo`] and stamps `created_at`/`updated_at` with the
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] if the input is rejected; nothing is
    /// stored in that case.
    pub fn create_task(&self, input: NewTask) -> Result<Task, TaskError> {
        validate_new_task(&input, self.config.max_title_len)?;

        let now = self.clock.now();
        let mut tasks = self.tasks.write();

        let mut id = TaskId::new();
        while tasks.contains_key(&id) {
            id = TaskId::new();
        }

        let task = Task {
            id: id.clone(),
            title: input.title,
            description: input.description,
            assignee: input.assignee,
            priority: input.priority,
            status: TaskStatus::Todo,
            deadline: input.deadline,
            created_at: now,
            updated_at: now,
            details: input.details,
        };
        tasks.insert(id, task.clone());
        drop(tasks);

        Ok(task)
    }

    /// Assigns a task to `assignee`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has this id.
    pub fn assign_task(&self, id: &TaskId, assignee: impl Into<String>) -> Result<Task, TaskError> {
        let assignee = assignee.into();
        self.replace_with(id, |task| {
            task.assignee = Some(assignee);
            Ok(())
        })
    }

    /// Clears a task's assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has this id.
    pub fn unassign_task(&self, id: &TaskId) -> Result<Task, TaskError> {
        self.replace_with(id, |task| {
            task.assignee = None;
            Ok(())
        })
    }

    /// Updates the status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has this id, or
    /// [`TaskError::InvalidTransition`] if the configured workflow forbids
    /// the change.
    pub fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, TaskError> {
        let workflow = self.config.workflow;
        self.replace_with(id, |task| {
            workflow.check(task.status, status)?;
            task.status = status;
            Ok(())
        })
    }

    /// Returns a snapshot of one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has this id.
    pub fn get_task(&self, id: &TaskId) -> Result<Task, TaskError> {
        let tasks = self.tasks.read();
        lookup(&tasks, id).cloned()
    }

    /// Returns every task that is not done and whose deadline has passed,
    /// earliest deadline first.
    #[must_use]
    pub fn overdue_tasks(&self) -> Vec<Task> {
        let now = self.clock.now();
        let mut overdue: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| t.is_overdue(now))
            .cloned()
            .collect();
        overdue.sort_by(|a, b| {
            a.deadline
                .cmp(&b.deadline)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        overdue
    }

    /// Returns every task matching `filter`, oldest first.
    ///
    /// An empty filter returns the whole store.
    #[must_use]
    pub fn filter_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        if filter.is_empty() {
            return self.tasks();
        }
        let mut matched: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_by_creation(&mut matched);
        matched
    }

    /// Returns every task, oldest first.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        let mut all: Vec<Task> = self.tasks.read().values().cloned().collect();
        sort_by_creation(&mut all);
        all
    }

    /// Number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Returns `true` if no task has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Applies `apply` to a copy of the stored task and, if it succeeds,
    /// replaces the entry with the copy and a refreshed `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the clock does.
    fn replace_with<F>(&self, id: &TaskId, apply: F) -> Result<Task, TaskError>
    where
        F: FnOnce(&mut Task) -> Result<(), TaskError>,
    {
        let now = self.clock.now();
        let mut tasks = self.tasks.write();

        let mut next = lookup(&tasks, id)?.clone();
        apply(&mut next)?;
        next.updated_at = now.max(next.updated_at);

        tasks.insert(id.clone(), next.clone());
        drop(tasks);

        Ok(next)
    }
}

/// Resolves an id to its stored task, or an error if not found.
fn lookup<'a>(tasks: &'a HashMap<TaskId, Task>, id: &TaskId) -> Result<&'a Task, TaskError> {
    tasks
        .get(id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))
}

fn sort_by_creation(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
