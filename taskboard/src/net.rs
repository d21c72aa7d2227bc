//! Request dispatcher between the TUI loop and a [`TaskApi`].
//!
//! The UI thread never awaits a request. It sends a [`NetCommand`], keeps
//! drawing, and drains [`NetEvent`]s on each tick of its poll loop.
//!
//! ```text
//! TUI (main thread)  ←── NetEvent ───  tokio background tasks
//!                     ─── NetCommand →
//! ```
//!
//! Each command runs on its own spawned task, so a slow request does not
//! hold up the ones behind it.

use taskboard_proto::{NewTask, SessionInfo, Task, TaskId, TaskPatch};
use tokio::sync::mpsc;

use crate::api::{ApiError, TaskApi};

/// Requests from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetCommand {
    /// Validate the session, then load the task list.
    Connect,
    /// Reload the task list.
    Reload,
    /// Create a task.
    Create(NewTask),
    /// Send an optimistic move that is already applied locally.
    Move {
        /// Moved task.
        id: TaskId,
        /// The status or priority change.
        patch: TaskPatch,
    },
    /// Send an edit.
    Edit {
        /// Edited task.
        id: TaskId,
        /// Changed fields.
        patch: TaskPatch,
    },
    /// Delete a task.
    Delete(TaskId),
    /// Stop accepting commands.
    Shutdown,
}

/// Results for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    /// Outcome of the session check.
    Session(Result<SessionInfo, ApiError>),
    /// A task list fetch finished.
    Loaded(Result<Vec<Task>, ApiError>),
    /// A create finished.
    Created(Result<Task, ApiError>),
    /// A move finished.
    Moved {
        /// Moved task.
        id: TaskId,
        /// Server record or error.
        result: Result<Task, ApiError>,
    },
    /// An edit finished.
    Edited {
        /// Edited task.
        id: TaskId,
        /// Server record or error.
        result: Result<Task, ApiError>,
    },
    /// A delete finished.
    Deleted {
        /// Deleted task.
        id: TaskId,
        /// Success or error.
        result: Result<(), ApiError>,
    },
}

/// Spawns the dispatcher and returns its channel ends.
///
/// Must be called from within a tokio runtime.
pub fn spawn_net<A: TaskApi>(
    api: A,
    channel_capacity: usize,
) -> (mpsc::Sender<NetCommand>, mpsc::Receiver<NetEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel(channel_capacity);
    tokio::spawn(command_loop(api, cmd_rx, evt_tx));
    (cmd_tx, evt_rx)
}

async fn command_loop<A: TaskApi>(
    api: A,
    mut cmd_rx: mpsc::Receiver<NetCommand>,
    evt_tx: mpsc::Sender<NetEvent>,
) {
    while let Some(command) = cmd_rx.recv().await {
        if command == NetCommand::Shutdown {
            tracing::debug!("net dispatcher shutting down");
            break;
        }
        let api = api.clone();
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            for event in run(&api, command).await {
                if evt_tx.send(event).await.is_err() {
                    tracing::debug!("UI gone; dropping result");
                    return;
                }
            }
        });
    }
}

/// Executes one command and returns the events to deliver, in order.
async fn run<A: TaskApi>(api: &A, command: NetCommand) -> Vec<NetEvent> {
    match command {
        NetCommand::Connect => {
            let session = api.session().await;
            match &session {
                Ok(info) => tracing::info!(subject = %info.subject, "session valid"),
                Err(e) => tracing::warn!(error = %e, "session check failed"),
            }
            if session.is_err() {
                return vec![NetEvent::Session(session)];
            }
            vec![NetEvent::Session(session), NetEvent::Loaded(api.list().await)]
        }
        NetCommand::Reload => vec![NetEvent::Loaded(api.list().await)],
        NetCommand::Create(task) => vec![NetEvent::Created(api.create(task).await)],
        NetCommand::Move { id, patch } => {
            let result = api.update(id, patch).await;
            vec![NetEvent::Moved { id, result }]
        }
        NetCommand::Edit { id, patch } => {
            let result = api.update(id, patch).await;
            vec![NetEvent::Edited { id, result }]
        }
        NetCommand::Delete(id) => {
            let result = api.delete(id).await;
            vec![NetEvent::Deleted { id, result }]
        }
        NetCommand::Shutdown => Vec::new(),
    }
}
