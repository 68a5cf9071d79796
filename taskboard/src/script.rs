//! JSON-lines command scripts against a [`TaskStore`].
//!
//! Each non-blank line is one `op`-tagged command:
//!
//! ```text
//! {"op":"create","task":{"type":"development","title":"Auth","priority":"high","deadline":"2024-02-01T00:00:00Z","repoLink":"github.com/project/auth"}}
//! {"op":"assign","id":"$1","assignee":"john.doe"}
//! {"op":"set_status","id":"$1","status":"inProgress"}
//! {"op":"filter","criteria":{"priority":"high"}}
//! {"op":"overdue"}
//! ```
//!
//! Ids may be written as `$N` to mean the task made by the N-th `create`
//! command in the script. Failed creates still take a slot, and referring
//! to one reports the reference as not found. Lines starting with `#` are comments.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use taskboard_proto::codec::{self, CodecError};
use taskboard_proto::filter::TaskFilter;
use taskboard_proto::task::{NewTask, Task, TaskId, TaskStatus};

use crate::tasks::{TaskError, TaskStore};

/// One script command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Create a task.
    Create {
        /// Caller-supplied task fields.
        task: NewTask,
    },
    /// Assign a task.
    Assign {
        /// Task id or `$N` reference.
        id: String,
        /// New assignee.
        assignee: String,
    },
    /// Clear a task's assignee.
    Unassign {
        /// Task id or `$N` reference.
        id: String,
    },
    /// Change a task's status.
    SetStatus {
        /// Task id or `$N` reference.
        id: String,
        /// New status.
        status: TaskStatus,
    },
    /// Fetch one task.
    Get {
        /// Task id or `$N` reference.
        id: String,
    },
    /// List tasks matching the criteria.
    Filter {
        /// Equality constraints; absent means all tasks.
        #[serde(default)]
        criteria: TaskFilter,
    },
    /// List overdue tasks.
    Overdue,
    /// List every task.
    List,
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// A single task snapshot.
    Task(Task),
    /// A list of task snapshots.
    Tasks(Vec<Task>),
}

/// Errors from executing one script line.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The line is not a valid command.
    #[error("invalid command: {0}")]
    Parse(#[from] CodecError),
    /// The store rejected the command.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Counts reported after a script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands that produced output.
    pub succeeded: usize,
    /// Commands that failed to parse or execute.
    pub failed: usize,
}

/// Executes script commands against a store, remembering created ids.
#[derive(Debug)]
pub struct ScriptRunner {
    store: TaskStore,
    /// One slot per `create` command, `None` where it failed.
    created: Vec<Option<TaskId>>,
    pretty: bool,
}

impl ScriptRunner {
    /// Creates a runner over `store`.
    #[must_use]
    pub const fn new(store: TaskStore) -> Self {
        Self {
            store,
            created: Vec::new(),
            pretty: false,
        }
    }

    /// Emit indented JSON.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Parses and executes one line.
    ///
    /// Returns `Ok(None)` for blank and comment lines.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Parse`] for malformed lines and
    /// [`ScriptError::Task`] when the store rejects the command.
    pub fn execute_line(&mut self, line: &str) -> Result<Option<Outcome>, ScriptError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let command: Command = match codec::decode(line) {
            Ok(command) => command,
            Err(e) => {
                if is_create_line(line) {
                    self.created.push(None);
                }
                return Err(e.into());
            }
        };
        Ok(Some(self.execute(command)?))
    }

    /// Executes one parsed command.
    ///
    /// # Errors
    ///
    /// Returns the store's [`TaskError`] unchanged; an id that is neither a
    /// known `$N` reference nor a valid UUID is reported as
    /// [`TaskError::NotFound`].
    pub fn execute(&mut self, command: Command) -> Result<Outcome, TaskError> {
        match command {
            Command::Create { task } => {
                let result = self.store.create_task(task);
                self.created
                    .push(result.as_ref().ok().map(|task| task.id.clone()));
                result.map(Outcome::Task)
            }
            Command::Assign { id, assignee } => {
                let id = self.resolve_id(&id)?;
                self.store.assign_task(&id, assignee).map(Outcome::Task)
            }
            Command::Unassign { id } => {
                let id = self.resolve_id(&id)?;
                self.store.unassign_task(&id).map(Outcome::Task)
            }
            Command::SetStatus { id, status } => {
                let id = self.resolve_id(&id)?;
                self.store.update_status(&id, status).map(Outcome::Task)
            }
            Command::Get { id } => {
                let id = self.resolve_id(&id)?;
                self.store.get_task(&id).map(Outcome::Task)
            }
            Command::Filter { criteria } => Ok(Outcome::Tasks(self.store.filter_tasks(&criteria))),
            Command::Overdue => Ok(Outcome::Tasks(self.store.overdue_tasks())),
            Command::List => Ok(Outcome::Tasks(self.store.tasks())),
        }
    }

    /// Runs every line of `input`, writing outcomes to `out` and failures to
    /// `err`.
    ///
    /// A failing line does not stop the run.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading input or writing output fails.
    pub fn run<R, W, E>(&mut self, input: R, mut out: W, mut err: E) -> std::io::Result<RunSummary>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let mut summary = RunSummary::default();

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            match self.execute_line(&line) {
                Ok(Some(outcome)) => {
                    let text = if self.pretty {
                        codec::encode_pretty(&outcome)
                    } else {
                        codec::encode(&outcome)
                    }
                    .map_err(std::io::Error::other)?;
                    writeln!(out, "{text}")?;
                    summary.succeeded += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "task operation failed");
                    writeln!(err, "Task operation failed: {e}")?;
                    summary.failed += 1;
                }
            }
        }

        out.flush()?;
        tracing::debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            tasks = self.store.len(),
            "script finished"
        );
        Ok(summary)
    }

    /// Resolves `$N` references and literal UUIDs.
    fn resolve_id(&self, raw: &str) -> Result<TaskId, TaskError> {
        let not_found = || TaskError::NotFound(raw.to_string());
        if let Some(n) = raw.strip_prefix('$') {
            let n: usize = n.parse().map_err(|_| not_found())?;
            return n
                .checked_sub(1)
                .and_then(|i| self.created.get(i))
                .and_then(Option::as_ref)
                .cloned()
                .ok_or_else(not_found);
        }
        raw.parse().map_err(|_| not_found())
    }
}

/// The `op` tag alone, for lines that fail to decode as a full command.
#[derive(Deserialize)]
struct OpTag {
    op: String,
}

/// Returns `true` if `line` is tagged as a `create` command.
fn is_create_line(line: &str) -> bool {
    codec::decode::<OpTag>(line).is_ok_and(|tag| tag.op == "create")
}
