//! In-memory task store with an optional JSON snapshot file.
//!
//! [`TaskStore`] owns the durable task records. Ids are assigned
//! monotonically and never reused. When a snapshot path is configured every
//! successful mutation rewrites the file (temp file + rename); if the write
//! fails the in-memory change is rolled back so memory and disk agree.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taskboard_proto::{NewTask, Task, TaskId, TaskPatch};
use tokio::sync::RwLock;

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No task has the given id.
    #[error("Task with ID {0} not found")]
    NotFound(TaskId),

    /// A task with the given id already exists.
    #[error("A task with ID {0} already exists")]
    Conflict(TaskId),

    /// The snapshot file exists but could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    ReadSnapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The snapshot file is not valid JSON for a store.
    #[error("corrupt snapshot {path}: {source}")]
    CorruptSnapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Writing the snapshot failed; the mutation was not applied.
    #[error("failed to write snapshot {path}: {source}")]
    WriteSnapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// On-disk layout of the snapshot file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    next_id: i64,
    tasks: Vec<Task>,
}

#[derive(Debug)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Inner {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let tasks: BTreeMap<TaskId, Task> =
            snapshot.tasks.into_iter().map(|t| (t.id, t)).collect();
        let after_max = tasks.keys().next_back().map_or(1, |id| id.get() + 1);
        Self {
            tasks,
            next_id: snapshot.next_id.max(after_max),
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_id: self.next_id,
            tasks: self.tasks.values().cloned().collect(),
        }
    }
}

/// Task records keyed by id, safe to share across request handlers.
#[derive(Debug, Default)]
pub struct TaskStore {
    inner: RwLock<Inner>,
    snapshot_path: Option<PathBuf>,
}

impl TaskStore {
    /// Creates an empty, memory-only store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by a snapshot file.
    ///
    /// A missing file yields an empty store; the file is created on the first
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ReadSnapshot`] or [`StoreError::CorruptSnapshot`]
    /// if an existing file cannot be loaded.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let inner = match std::fs::read_to_string(path) {
            Ok(contents) => {
                let snapshot: Snapshot =
                    serde_json::from_str(&contents).map_err(|e| StoreError::CorruptSnapshot {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                Inner::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Inner::default(),
            Err(e) => {
                return Err(StoreError::ReadSnapshot {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        tracing::info!(
            path = %path.display(),
            tasks = inner.tasks.len(),
            "task store opened"
        );
        Ok(Self {
            inner: RwLock::new(inner),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Stores a new task under the next free id and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the next id is already taken, or
    /// [`StoreError::WriteSnapshot`] if persisting fails.
    pub async fn create(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let id = TaskId::new(inner.next_id);
        if inner.tasks.contains_key(&id) {
            tracing::warn!(%id, "next id already taken");
            return Err(StoreError::Conflict(id));
        }
        let task = new_task.into_task(id);
        inner.next_id += 1;
        inner.tasks.insert(id, task.clone());

        if let Err(e) = self.persist(&inner).await {
            inner.tasks.remove(&id);
            inner.next_id -= 1;
            return Err(e);
        }
        drop(inner);
        Ok(task)
    }

    /// Returns every task ordered by id.
    pub async fn list(&self) -> Vec<Task> {
        let inner = self.inner.read().await;
        inner.tasks.values().cloned().collect()
    }

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub async fn get(&self, id: TaskId) -> Result<Task, StoreError> {
        let inner = self.inner.read().await;
        inner.tasks.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    /// Applies a partial update and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::WriteSnapshot`] if persisting fails.
    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = inner.tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let previous = task.clone();
        task.apply(patch);
        let updated = task.clone();

        if let Err(e) = self.persist(&inner).await {
            inner.tasks.insert(id, previous);
            return Err(e);
        }
        drop(inner);
        Ok(updated)
    }

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::WriteSnapshot`] if persisting fails.
    pub async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let removed = inner.tasks.remove(&id).ok_or(StoreError::NotFound(id))?;

        if let Err(e) = self.persist(&inner).await {
            inner.tasks.insert(id, removed);
            return Err(e);
        }
        Ok(())
    }

    /// Returns the number of stored tasks.
    pub async fn len(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    /// Returns true when the store holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.tasks.is_empty()
    }

    /// Rewrites the snapshot file, if one is configured.
    async fn persist(&self, inner: &Inner) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let write_err = |source| StoreError::WriteSnapshot {
            path: path.clone(),
            source,
        };
        let data = serde_json::to_vec_pretty(&inner.to_snapshot())
            .map_err(|e| write_err(io::Error::other(e)))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(write_err)?;
        tracing::debug!(path = %path.display(), tasks = inner.tasks.len(), "snapshot written");
        Ok(())
    }
}
