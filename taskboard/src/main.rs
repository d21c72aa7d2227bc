//! Taskboard: terminal Kanban board.
//!
//! Connects to a Taskboard server with a bearer token, then shows the board.
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! cargo run --bin taskboard -- --api-url http://127.0.0.1:8080 --token "$JWT"
//!
//! # Or via environment variables
//! TASKBOARD_API_URL=http://127.0.0.1:8080 TASKBOARD_TOKEN=... cargo run --bin taskboard
//! ```

use std::io;
use std::path::Path;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::api::ApiError;
use taskboard::api::http::HttpTaskApi;
use taskboard::app::App;
use taskboard::board::notify::{DEFAULT_CAPACITY, Notifications};
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::net::{self, NetCommand, NetEvent};
use taskboard::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let Some(token) = config.token.clone() else {
        eprintln!("No token configured: pass --token or set TASKBOARD_TOKEN");
        std::process::exit(1);
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(?config, "taskboard starting");

    let api = match HttpTaskApi::new(
        config.api_url.clone(),
        token,
        config.connect_timeout,
        config.request_timeout,
    ) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Cannot build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, api, &config).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskboard exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: HttpTaskApi,
    config: &ClientConfig,
) -> io::Result<()> {
    let notifications = Notifications::new(DEFAULT_CAPACITY, config.notification_ttl);
    let mut app = App::new(config.view, notifications);

    let (cmd_tx, mut evt_rx) = net::spawn_net(api, config.channel_capacity);
    if cmd_tx.send(NetCommand::Connect).await.is_err() {
        return Err(io::Error::other("network task stopped before start"));
    }

    loop {
        // Step 1: Size the columns and draw the frame.
        app.column_rows = ui::column_rows(terminal.size()?.height);
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Apply finished requests (non-blocking).
        drain_net_events(&mut app, &mut evt_rx);

        // Step 3: Expire notifications and advance autoscroll.
        app.tick(Instant::now());

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(command) = app.handle_key_event(key) {
                match cmd_tx.try_send(command) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(command)) => {
                        tracing::warn!(?command, "request queue full");
                        reject_unsent(&mut app, command, "too many requests in flight");
                    }
                    Err(mpsc::error::TrySendError::Closed(command)) => {
                        reject_unsent(&mut app, command, "network task stopped");
                    }
                }
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(NetCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Drain all pending `NetEvent`s from the receiver and apply them to the app.
fn drain_net_events(app: &mut App, rx: &mut mpsc::Receiver<NetEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.apply_net_event(event);
    }
}

/// Resolves a command that never reached the network task as failed, so
/// that an optimistic move rolls back and pending edits are released.
fn reject_unsent(app: &mut App, command: NetCommand, reason: &str) {
    let error = ApiError::Network(reason.to_string());
    let event = match command {
        NetCommand::Move { id, .. } => NetEvent::Moved {
            id,
            result: Err(error),
        },
        NetCommand::Edit { id, .. } => NetEvent::Edited {
            id,
            result: Err(error),
        },
        NetCommand::Delete(id) => NetEvent::Deleted {
            id,
            result: Err(error),
        },
        NetCommand::Connect | NetCommand::Reload | NetCommand::Create(_) | NetCommand::Shutdown => {
            app.board
                .notifications_mut()
                .error(format!("Request not sent: {reason}"));
            return;
        }
    };
    app.apply_net_event(event);
}
