//! In-process [`TaskApi`] for tests and offline runs.
//!
//! Applies the same validation and id rules as the server. Failures can be
//! injected per call so the optimistic-update paths can be exercised
//! without a network.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use taskboard_proto::{NewTask, SessionInfo, Task, TaskId, TaskPatch};

use super::{ApiError, TaskApi};

/// A call observed by [`InMemoryTaskApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Session,
    List,
    Get(TaskId),
    Create(NewTask),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
}

#[derive(Debug, Default)]
struct State {
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
    calls: Vec<ApiCall>,
    failures: VecDeque<ApiError>,
}

/// Shared, cloneable in-memory task collection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskApi {
    state: Arc<Mutex<State>>,
}

impl InMemoryTaskApi {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a collection seeded with `tasks`; new ids continue after the
    /// largest seeded id.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        let tasks = tasks.into_iter().map(|t| (t.id, t)).collect();
        Self {
            state: Arc::new(Mutex::new(State {
                tasks,
                next_id,
                calls: Vec::new(),
                failures: VecDeque::new(),
            })),
        }
    }

    /// Makes the next call fail with `error`. Queued failures are consumed
    /// in order, one per call.
    pub fn fail_next(&self, error: ApiError) {
        self.state.lock().failures.push_back(error);
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Number of mutating calls (create, update, delete) made so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    ApiCall::Create(_) | ApiCall::Update(..) | ApiCall::Delete(_)
                )
            })
            .count()
    }

    /// Current stored tasks, ordered by id.
    #[must_use]
    pub fn stored(&self) -> Vec<Task> {
        self.state.lock().tasks.values().cloned().collect()
    }

    /// Changes a stored task directly, as another session would.
    pub fn modify_stored(&self, id: TaskId, patch: &TaskPatch) {
        if let Some(task) = self.state.lock().tasks.get_mut(&id) {
            task.apply(patch);
        }
    }

    fn record(&self, call: ApiCall) -> Result<parking_lot::MutexGuard<'_, State>, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn not_found(id: TaskId) -> ApiError {
    ApiError::NotFound(format!("Task with ID {id} not found"))
}

impl TaskApi for InMemoryTaskApi {
    async fn session(&self) -> Result<SessionInfo, ApiError> {
        self.record(ApiCall::Session)?;
        Ok(SessionInfo {
            subject: "local".to_string(),
            expires_at: i64::MAX,
        })
    }

    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let state = self.record(ApiCall::List)?;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn get(&self, id: TaskId) -> Result<Task, ApiError> {
        let state = self.record(ApiCall::Get(id))?;
        state.tasks.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn create(&self, task: NewTask) -> Result<Task, ApiError> {
        let mut state = self.record(ApiCall::Create(task.clone()))?;
        task.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let id = TaskId::new(state.next_id);
        state.next_id += 1;
        let task = task.into_task(id);
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ApiError> {
        let mut state = self.record(ApiCall::Update(id, patch.clone()))?;
        patch
            .validate(id)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let task = state.tasks.get_mut(&id).ok_or_else(|| not_found(id))?;
        task.apply(&patch);
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let mut state = self.record(ApiCall::Delete(id))?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}
