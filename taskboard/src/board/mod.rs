//! Board state: the task cache plus the rules for changing it.
//!
//! Moves are optimistic. [`Board::begin_move`] validates the drop, snapshots
//! the cache and applies the new value at once; [`Board::finish_move`]
//! either keeps it (replacing the card with the server's record) or rolls
//! back. Create, edit and delete only touch the cache after the server has
//! answered.
//!
//! Only one change per task may be outstanding. Starting a second one
//! while the first is unresolved fails with [`BoardError::MutationInFlight`].

pub mod cache;
pub mod filter;
pub mod notify;
pub mod stats;

use std::collections::HashMap;

use taskboard_proto::{NewTask, Task, TaskId, TaskPatch, TransitionError, check_transition};

use crate::api::{ApiError, TaskApi};
use cache::{CacheSnapshot, TaskCache};
use filter::ColumnKey;
use notify::Notifications;

/// Errors from board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The task is not in the cache.
    #[error("Task with ID {0} not found")]
    TaskNotFound(TaskId),

    /// The drop violates the transition table.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// Another change to the same task has not been answered yet.
    #[error("task {0} has a pending change")]
    MutationInFlight(TaskId),

    /// The server call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A move that has been applied locally and awaits the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub id: TaskId,
    pub target: ColumnKey,
    /// The update to send.
    pub patch: TaskPatch,
}

/// Result of [`Board::begin_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped on its own column; nothing to do.
    Unchanged,
    /// Applied locally; send `patch` and report back via [`Board::finish_move`].
    Pending(PendingMove),
}

/// What is outstanding for a task.
#[derive(Debug)]
enum InFlight {
    Move(MoveRecord),
    Edit,
    Delete,
}

/// What a rollback needs.
#[derive(Debug)]
struct MoveRecord {
    target: ColumnKey,
    previous: Task,
    snapshot: CacheSnapshot,
    applied_generation: u64,
}

/// Owns the cache and the notification queue.
#[derive(Debug, Default)]
pub struct Board {
    cache: TaskCache,
    notifications: Notifications,
    in_flight: HashMap<TaskId, InFlight>,
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty board with a custom notification queue.
    #[must_use]
    pub fn with_notifications(notifications: Notifications) -> Self {
        Self {
            notifications,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.cache.tasks()
    }

    #[must_use]
    pub const fn cache(&self) -> &TaskCache {
        &self.cache
    }

    #[must_use]
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub const fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// True while a change to `id` awaits the server.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Number of changes awaiting the server.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    fn reserve(&self, id: TaskId) -> Result<&Task, BoardError> {
        if self.in_flight.contains_key(&id) {
            return Err(BoardError::MutationInFlight(id));
        }
        self.cache.get(id).ok_or(BoardError::TaskNotFound(id))
    }

    fn report<T>(&mut self, result: Result<T, BoardError>) -> Result<T, BoardError> {
        if let Err(e) = &result {
            self.notifications.error(e.to_string());
        }
        result
    }

    // -- Optimistic moves --------------------------------------------------

    /// Validates a drop of `id` on `target` and applies it to the cache.
    ///
    /// A drop on the task's own column returns [`MoveOutcome::Unchanged`]
    /// without touching anything. In the status view the transition table
    /// decides; in the priority view any priority may be assigned.
    ///
    /// # Errors
    ///
    /// [`BoardError::TaskNotFound`], [`BoardError::MutationInFlight`] or
    /// [`BoardError::InvalidTransition`]; the cache is unchanged and an
    /// error notification is queued.
    pub fn begin_move(&mut self, id: TaskId, target: ColumnKey) -> Result<MoveOutcome, BoardError> {
        let result = self.try_begin_move(id, target);
        self.report(result)
    }

    fn try_begin_move(&mut self, id: TaskId, target: ColumnKey) -> Result<MoveOutcome, BoardError> {
        let current = self.cache.get(id).ok_or(BoardError::TaskNotFound(id))?;
        if target.contains(current) {
            return Ok(MoveOutcome::Unchanged);
        }
        let task = self.reserve(id)?;
        let patch = match target {
            ColumnKey::Status(to) => {
                check_transition(task.status, to)?;
                TaskPatch::status(to)
            }
            ColumnKey::Priority(to) => TaskPatch::priority(to),
        };

        let previous = task.clone();
        let snapshot = self.cache.snapshot();
        self.cache.replace(previous.patched(&patch));
        let record = MoveRecord {
            target,
            previous,
            snapshot,
            applied_generation: self.cache.generation(),
        };
        self.in_flight.insert(id, InFlight::Move(record));
        tracing::debug!(%id, %target, "move applied locally");

        Ok(MoveOutcome::Pending(PendingMove { id, target, patch }))
    }

    /// Applies the server's answer to a move started by [`begin_move`](Self::begin_move).
    ///
    /// On success the card is replaced with the server's record. On failure
    /// the cache is rolled back: to the full snapshot if nothing else changed
    /// it since, otherwise only the moved task is restored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] with the server error after rolling back.
    pub fn finish_move(&mut self, id: TaskId, result: Result<Task, ApiError>) -> Result<Task, BoardError> {
        let record = match self.in_flight.remove(&id) {
            Some(InFlight::Move(record)) => Some(record),
            Some(other) => {
                self.in_flight.insert(id, other);
                None
            }
            None => None,
        };

        match (result, record) {
            (Ok(task), record) => {
                self.cache.replace(task.clone());
                let what = match record.map(|r| r.target) {
                    Some(ColumnKey::Priority(p)) => format!("Task priority updated to {p}"),
                    Some(ColumnKey::Status(s)) => format!("Task status updated to {s}"),
                    None => "Task updated".to_string(),
                };
                self.notifications.success(what);
                Ok(task)
            }
            (Err(e), Some(record)) => {
                self.roll_back(id, record);
                self.notifications
                    .error(format!("Failed to update task: {e}"));
                Err(e.into())
            }
            (Err(e), None) => {
                tracing::warn!(%id, error = %e, "move result without a pending move");
                self.notifications
                    .error(format!("Failed to update task: {e}"));
                Err(e.into())
            }
        }
    }

    fn roll_back(&mut self, id: TaskId, record: MoveRecord) {
        if self.cache.generation() == record.applied_generation {
            tracing::debug!(%id, "rolling back to snapshot");
            self.cache.restore(record.snapshot);
        } else {
            tracing::debug!(%id, "cache changed since move; restoring moved task only");
            self.cache.replace(record.previous);
        }
    }

    // -- Confirmed mutations -----------------------------------------------

    /// Marks `id` as being edited.
    ///
    /// # Errors
    ///
    /// [`BoardError::TaskNotFound`] or [`BoardError::MutationInFlight`].
    pub fn begin_edit(&mut self, id: TaskId) -> Result<(), BoardError> {
        let result = self.reserve(id).map(|_| ());
        let result = self.report(result);
        if result.is_ok() {
            self.in_flight.insert(id, InFlight::Edit);
        }
        result
    }

    /// Applies the server's answer to an edit.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when the edit failed; the cache is unchanged.
    pub fn finish_edit(&mut self, id: TaskId, result: Result<Task, ApiError>) -> Result<Task, BoardError> {
        self.release(id, |f| matches!(f, InFlight::Edit));
        match result {
            Ok(task) => {
                if self.cache.replace(task.clone()).is_none() {
                    tracing::debug!(%id, "edited task no longer cached");
                }
                self.notifications.success("Task updated");
                Ok(task)
            }
            Err(e) => {
                self.notifications.error(format!("Failed to update task: {e}"));
                Err(e.into())
            }
        }
    }

    /// Marks `id` as being deleted.
    ///
    /// # Errors
    ///
    /// [`BoardError::TaskNotFound`] or [`BoardError::MutationInFlight`].
    pub fn begin_delete(&mut self, id: TaskId) -> Result<(), BoardError> {
        let result = self.reserve(id).map(|_| ());
        let result = self.report(result);
        if result.is_ok() {
            self.in_flight.insert(id, InFlight::Delete);
        }
        result
    }

    /// Applies the server's answer to a delete.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when the delete failed; the task stays.
    pub fn finish_delete(&mut self, id: TaskId, result: Result<(), ApiError>) -> Result<(), BoardError> {
        self.release(id, |f| matches!(f, InFlight::Delete));
        match result {
            Ok(()) => {
                self.cache.remove(id);
                self.notifications.success("Task deleted");
                Ok(())
            }
            Err(ApiError::NotFound(_)) => {
                // Already gone on the server; drop the stale card.
                self.cache.remove(id);
                self.notifications.info("Task was already deleted");
                Ok(())
            }
            Err(e) => {
                self.notifications.error(format!("Failed to delete task: {e}"));
                Err(e.into())
            }
        }
    }

    /// Adds a task the server has created.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when creation failed.
    pub fn finish_create(&mut self, result: Result<Task, ApiError>) -> Result<Task, BoardError> {
        match result {
            Ok(task) => {
                self.cache.add(task.clone());
                self.notifications.success("Task created");
                Ok(task)
            }
            Err(e) => {
                self.notifications.error(format!("Failed to create task: {e}"));
                Err(e.into())
            }
        }
    }

    /// Replaces the cache with a freshly fetched list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when the fetch failed; the cache is kept.
    pub fn finish_load(&mut self, result: Result<Vec<Task>, ApiError>) -> Result<usize, BoardError> {
        match result {
            Ok(tasks) => {
                let count = tasks.len();
                self.cache.replace_all(tasks);
                tracing::info!(count, "tasks loaded");
                self.notifications.success("Tasks fetched successfully");
                Ok(count)
            }
            Err(e) => {
                self.notifications.error(format!("Failed to load tasks: {e}"));
                Err(e.into())
            }
        }
    }

    fn release(&mut self, id: TaskId, expected: impl Fn(&InFlight) -> bool) {
        if self.in_flight.get(&id).is_some_and(expected) {
            self.in_flight.remove(&id);
        }
    }
}

/// Drives a [`Board`] against a [`TaskApi`] by awaiting each call inline.
///
/// The TUI splits the same steps across a background task instead; this
/// form suits scripts and tests.
#[derive(Debug)]
pub struct BoardController<A> {
    board: Board,
    api: A,
}

impl<A: TaskApi> BoardController<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            board: Board::new(),
            api,
        }
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Validates the session, then loads the task list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] if either call fails.
    pub async fn connect(&mut self) -> Result<usize, BoardError> {
        if let Err(e) = self.api.session().await {
            self.board
                .notifications
                .error(format!("Session check failed: {e}"));
            return Err(e.into());
        }
        self.load().await
    }

    /// Reloads the task list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] if the fetch fails.
    pub async fn load(&mut self) -> Result<usize, BoardError> {
        let result = self.api.list().await;
        self.board.finish_load(result)
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] if the server rejects it.
    pub async fn create(&mut self, task: NewTask) -> Result<Task, BoardError> {
        let result = self.api.create(task).await;
        self.board.finish_create(result)
    }

    /// Edits a task.
    ///
    /// # Errors
    ///
    /// See [`Board::begin_edit`] and [`Board::finish_edit`].
    pub async fn edit(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, BoardError> {
        self.board.begin_edit(id)?;
        let result = self.api.update(id, patch).await;
        self.board.finish_edit(id, result)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// See [`Board::begin_delete`] and [`Board::finish_delete`].
    pub async fn delete(&mut self, id: TaskId) -> Result<(), BoardError> {
        self.board.begin_delete(id)?;
        let result = self.api.delete(id).await;
        self.board.finish_delete(id, result)
    }

    /// Moves a task to another column. Returns `None` for a drop on its own
    /// column.
    ///
    /// # Errors
    ///
    /// See [`Board::begin_move`] and [`Board::finish_move`].
    pub async fn move_task(&mut self, id: TaskId, target: ColumnKey) -> Result<Option<Task>, BoardError> {
        match self.board.begin_move(id, target)? {
            MoveOutcome::Unchanged => Ok(None),
            MoveOutcome::Pending(pending) => {
                let result = self.api.update(pending.id, pending.patch).await;
                self.board.finish_move(pending.id, result).map(Some)
            }
        }
    }
}
