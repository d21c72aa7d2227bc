//! REST endpoints for tasks.
//!
//! | method | path          | body      | success          |
//! |--------|---------------|-----------|------------------|
//! | POST   | `/tasks`      | `NewTask` | 201 + `Task`     |
//! | GET    | `/tasks`      |           | 200 + `[Task]`   |
//! | GET    | `/tasks/{id}` |           | 200 + `Task`     |
//! | PATCH  | `/tasks/{id}` | `TaskPatch` | 200 + `Task`   |
//! | DELETE | `/tasks/{id}` |           | 204              |
//! | GET    | `/protected`  |           | 200 + `SessionInfo` |
//! | GET    | `/health`     |           | 200 `ok`         |
//!
//! Everything except `/health` sits behind [`auth::require_bearer`].

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::get;
use axum::{Extension, Json, Router};
use taskboard_proto::{NewTask, SessionInfo, Task, TaskId, TaskPatch};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AuthGate, Claims};
use crate::error::ApiErrorResponse;
use crate::store::TaskStore;

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    /// The task records.
    pub store: TaskStore,
    /// Token verification.
    pub auth: AuthGate,
}

impl AppState {
    /// Creates state from a store and an auth gate.
    #[must_use]
    pub const fn new(store: TaskStore, auth: AuthGate) -> Self {
        Self { store, auth }
    }
}

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Builds the application router.
///
/// `cors_origins` lists browser origins allowed to call the API; an empty
/// list installs no CORS layer.
#[must_use]
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/protected", get(session))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_bearer,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(cors_origins) {
        app = app.layer(cors);
    }
    app
}

/// CORS for the configured origins. Unparsable origins are skipped with a
/// warning.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

async fn health() -> &'static str {
    "ok"
}

async fn session(Extension(claims): Extension<Claims>) -> Json<SessionInfo> {
    Json(SessionInfo {
        subject: claims.sub,
        expires_at: claims.exp,
    })
}

async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.store.list().await)
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let task = state.store.get(TaskId::new(id)).await?;
    Ok(Json(task))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(new_task) = body?;
    new_task.validate()?;
    let task = state.store.create(new_task).await?;
    tracing::info!(id = %task.id, status = %task.status, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    let id = TaskId::new(id);
    patch.validate(id)?;
    let task = state.store.update(id, &patch).await?;
    tracing::info!(%id, status = %task.status, priority = %task.priority, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let id = TaskId::new(id);
    state.store.delete(id).await?;
    tracing::info!(%id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Starts the task server on `addr` and returns the bound address and a
/// join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_cors(addr, state, &[]).await
}

/// Like [`start_server`], with CORS enabled for `cors_origins`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_cors(
    addr: &str,
    state: Arc<AppState>,
    cors_origins: &[String],
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_shutdown(addr, state, cors_origins, std::future::pending()).await
}

/// Like [`start_server_with_cors`]; the server stops accepting connections
/// once `shutdown` resolves and the handle completes after in-flight
/// requests finish.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_shutdown<F>(
    addr: &str,
    state: Arc<AppState>,
    cors_origins: &[String],
    shutdown: F,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state, cors_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %e, "task server error");
        }
        tracing::info!("task server stopped");
    });

    Ok((bound_addr, handle))
}
