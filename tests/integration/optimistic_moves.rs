//! Integration tests for optimistic moves and their rollback.
//!
//! Uses `InMemoryTaskApi` with failure injection, driven both inline through
//! `BoardController` and through the TUI's background dispatcher.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard::api::ApiError;
use taskboard::api::memory::{ApiCall, InMemoryTaskApi};
use taskboard::app::App;
use taskboard::board::filter::{ColumnKey, ViewMode};
use taskboard::board::notify::{Level, Notifications};
use taskboard::board::{BoardController, BoardError, MoveOutcome};
use taskboard::net::{NetCommand, NetEvent, spawn_net};
use taskboard_proto::{Category, Description, Priority, Status, Task, TaskId, TaskPatch};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn task(id: i64, status: Status, priority: Priority) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        category: Category::Development,
        priority,
        status,
        duedate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        description: Description::default(),
    }
}

async fn connected(tasks: Vec<Task>) -> (InMemoryTaskApi, BoardController<InMemoryTaskApi>) {
    let api = InMemoryTaskApi::with_tasks(tasks);
    let mut controller = BoardController::new(api.clone());
    controller.connect().await.unwrap();
    (api, controller)
}

fn status_of(controller: &BoardController<InMemoryTaskApi>, id: i64) -> Status {
    controller
        .board()
        .cache()
        .get(TaskId::new(id))
        .expect("task in cache")
        .status
}

// ---------------------------------------------------------------------------
// Inline controller
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirmed_move_updates_cache_and_server() {
    let (api, mut controller) = connected(vec![task(1, Status::InProgress, Priority::Low)]).await;

    let moved = controller
        .move_task(TaskId::new(1), ColumnKey::Status(Status::Completed))
        .await
        .unwrap()
        .expect("move sent");
    assert_eq!(moved.status, Status::Completed);
    assert_eq!(status_of(&controller, 1), Status::Completed);
    assert_eq!(api.stored()[0].status, Status::Completed);

    let note = controller.board().notifications().latest().unwrap();
    assert_eq!(note.level, Level::Success);
    assert_eq!(note.message, "Task status updated to Completed");
}

#[tokio::test]
async fn rejected_move_rolls_back() {
    let (api, mut controller) = connected(vec![
        task(1, Status::InProgress, Priority::Low),
        task(2, Status::OnHold, Priority::High),
    ])
    .await;
    let before = controller.board().tasks().to_vec();

    api.fail_next(ApiError::Server {
        status: 500,
        message: "database unavailable".into(),
    });
    let err = controller
        .move_task(TaskId::new(1), ColumnKey::Status(Status::InReview))
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::Api(ApiError::Server { status: 500, .. })));
    assert_eq!(controller.board().tasks(), before.as_slice());
    assert_eq!(api.stored()[0].status, Status::InProgress);
    let note = controller.board().notifications().latest().unwrap();
    assert_eq!(note.level, Level::Error);
    assert!(note.message.starts_with("Failed to update task"));
}

#[tokio::test]
async fn drop_on_own_column_makes_no_call() {
    let (api, mut controller) = connected(vec![task(1, Status::InReview, Priority::Low)]).await;
    let notes_before = controller.board().notifications().len();

    let result = controller
        .move_task(TaskId::new(1), ColumnKey::Status(Status::InReview))
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(api.mutation_count(), 0);
    assert_eq!(controller.board().notifications().len(), notes_before);
}

#[tokio::test]
async fn illegal_transition_makes_no_call() {
    let (api, mut controller) = connected(vec![task(1, Status::Completed, Priority::Low)]).await;

    let err = controller
        .move_task(TaskId::new(1), ColumnKey::Status(Status::OnHold))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::InvalidTransition(_)));
    assert_eq!(
        err.to_string(),
        "Invalid transition: Cannot move from Completed to On Hold"
    );
    assert_eq!(api.mutation_count(), 0);
    assert_eq!(status_of(&controller, 1), Status::Completed);
}

#[tokio::test]
async fn priority_moves_are_unconstrained() {
    let (api, mut controller) = connected(vec![task(1, Status::Completed, Priority::Low)]).await;

    for target in [Priority::High, Priority::Medium, Priority::Low] {
        let moved = controller
            .move_task(TaskId::new(1), ColumnKey::Priority(target))
            .await
            .unwrap()
            .expect("priority changed");
        assert_eq!(moved.priority, target);
    }
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::Update(TaskId::new(1), TaskPatch::priority(Priority::Low)))
    );
    assert_eq!(
        controller.board().notifications().latest().unwrap().message,
        "Task priority updated to Low"
    );
}

#[tokio::test]
async fn server_record_wins_after_confirmation() {
    // Another session renamed the task; the confirmed move brings that along.
    let (api, mut controller) = connected(vec![task(1, Status::OnHold, Priority::Low)]).await;
    api.modify_stored(
        TaskId::new(1),
        &TaskPatch {
            title: Some("renamed elsewhere".into()),
            ..TaskPatch::default()
        },
    );

    controller
        .move_task(TaskId::new(1), ColumnKey::Status(Status::InProgress))
        .await
        .unwrap();
    let cached = controller.board().cache().get(TaskId::new(1)).unwrap();
    assert_eq!(cached.title, "renamed elsewhere");
    assert_eq!(cached.status, Status::InProgress);
}

// ---------------------------------------------------------------------------
// Split begin/finish, as the TUI does it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_task_refuses_second_change() {
    let (_api, mut controller) = connected(vec![task(1, Status::InProgress, Priority::Low)]).await;
    let board = controller.board_mut();

    board
        .begin_move(TaskId::new(1), ColumnKey::Status(Status::InReview))
        .unwrap();
    assert_eq!(
        board.begin_move(TaskId::new(1), ColumnKey::Status(Status::OnHold)),
        Err(BoardError::MutationInFlight(TaskId::new(1)))
    );
    assert_eq!(
        board.begin_edit(TaskId::new(1)),
        Err(BoardError::MutationInFlight(TaskId::new(1)))
    );

    // Dropping the pending card back on its new column is still a no-op.
    let notes_before = board.notifications().len();
    assert_eq!(
        board.begin_move(TaskId::new(1), ColumnKey::Status(Status::InReview)),
        Ok(MoveOutcome::Unchanged)
    );
    assert_eq!(board.notifications().len(), notes_before);

    board
        .finish_move(TaskId::new(1), Ok(task(1, Status::InReview, Priority::Low)))
        .unwrap();
    assert!(!board.is_pending(TaskId::new(1)));
    assert!(
        board
            .begin_move(TaskId::new(1), ColumnKey::Status(Status::OnHold))
            .is_ok()
    );
}

#[tokio::test]
async fn rollback_keeps_changes_confirmed_in_between() {
    let (_api, mut controller) = connected(vec![
        task(1, Status::InProgress, Priority::Low),
        task(2, Status::InProgress, Priority::Low),
    ])
    .await;
    let board = controller.board_mut();

    board
        .begin_move(TaskId::new(1), ColumnKey::Status(Status::Completed))
        .unwrap();
    board
        .begin_move(TaskId::new(2), ColumnKey::Status(Status::OnHold))
        .unwrap();
    board
        .finish_move(TaskId::new(2), Ok(task(2, Status::OnHold, Priority::Low)))
        .unwrap();
    board
        .finish_move(TaskId::new(1), Err(ApiError::Network("timed out".into())))
        .unwrap_err();

    let cache = board.cache();
    assert_eq!(cache.get(TaskId::new(1)).unwrap().status, Status::InProgress);
    assert_eq!(cache.get(TaskId::new(2)).unwrap().status, Status::OnHold);
}

// ---------------------------------------------------------------------------
// TUI dispatcher
// ---------------------------------------------------------------------------

async fn next_event(rx: &mut tokio::sync::mpsc::Receiver<NetEvent>) -> NetEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event within timeout")
        .expect("channel open")
}

#[tokio::test]
async fn keyboard_move_round_trips_through_dispatcher() {
    let api = InMemoryTaskApi::with_tasks(vec![task(1, Status::InProgress, Priority::Low)]);
    let (tx, mut rx) = spawn_net(api.clone(), 8);
    let mut app = App::new(ViewMode::Status, Notifications::default());

    tx.send(NetCommand::Connect).await.unwrap();
    app.apply_net_event(next_event(&mut rx).await);
    app.apply_net_event(next_event(&mut rx).await);
    assert_eq!(app.session.as_deref(), Some("local"));
    assert_eq!(app.board.tasks().len(), 1);

    let command = app
        .handle_key_event(KeyEvent::new(KeyCode::Char('>'), KeyModifiers::NONE))
        .expect("move command");
    // Applied before the server has answered.
    assert_eq!(app.board.tasks()[0].status, Status::InReview);
    assert!(app.board.is_pending(TaskId::new(1)));

    api.fail_next(ApiError::Conflict("stale".into()));
    tx.send(command).await.unwrap();
    app.apply_net_event(next_event(&mut rx).await);

    assert_eq!(app.board.tasks()[0].status, Status::InProgress);
    assert!(!app.board.is_pending(TaskId::new(1)));
    assert_eq!(
        app.board.notifications().latest().unwrap().message,
        "Failed to update task: conflict: stale"
    );
}
