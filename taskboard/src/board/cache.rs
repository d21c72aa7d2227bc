//! Session-scoped working copy of the task list.
//!
//! The list is held behind an `Arc` and replaced copy-on-write, so a
//! snapshot is a pointer clone. Every mutation bumps a generation counter;
//! a rollback uses it to tell whether anything else changed the list since
//! the snapshot was taken.

use std::sync::Arc;

use taskboard_proto::{Task, TaskId};

/// A point-in-time copy of the cache.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    tasks: Arc<Vec<Task>>,
    generation: u64,
}

impl CacheSnapshot {
    /// The generation the cache had when the snapshot was taken.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The snapshotted tasks.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

/// Ordered-by-id task list with add / replace / remove / replace-all.
#[derive(Debug, Clone, Default)]
pub struct TaskCache {
    tasks: Arc<Vec<Task>>,
    generation: u64,
}

impl TaskCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All tasks, ordered by id.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.position(id).ok().map(|i| &self.tasks[i])
    }

    /// Number of cached tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the cache holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Incremented by every mutation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Inserts a task, or replaces the cached task with the same id.
    pub fn add(&mut self, task: Task) {
        let position = self.position(task.id);
        let tasks = Arc::make_mut(&mut self.tasks);
        match position {
            Ok(i) => tasks[i] = task,
            Err(i) => tasks.insert(i, task),
        }
        self.generation += 1;
    }

    /// Replaces the cached task with the same id and returns the old value.
    ///
    /// Returns `None` and leaves the cache untouched if the id is unknown.
    pub fn replace(&mut self, task: Task) -> Option<Task> {
        let i = self.position(task.id).ok()?;
        let old = std::mem::replace(&mut Arc::make_mut(&mut self.tasks)[i], task);
        self.generation += 1;
        Some(old)
    }

    /// Removes a task and returns it.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let i = self.position(id).ok()?;
        let old = Arc::make_mut(&mut self.tasks).remove(i);
        self.generation += 1;
        Some(old)
    }

    /// Replaces the whole list.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by_key(|t| t.id);
        tasks.dedup_by_key(|t| t.id);
        self.tasks = Arc::new(tasks);
        self.generation += 1;
    }

    /// Takes a snapshot for a later [`restore`](Self::restore).
    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            tasks: Arc::clone(&self.tasks),
            generation: self.generation,
        }
    }

    /// Puts the snapshotted list back.
    ///
    /// The generation still moves forward so later snapshots taken before
    /// the restore are recognised as stale.
    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        self.tasks = snapshot.tasks;
        self.generation += 1;
    }

    fn position(&self, id: TaskId) -> Result<usize, usize> {
        self.tasks.binary_search_by_key(&id, |t| t.id)
    }
}
