//! Application state and event handling.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard_proto::{Task, TaskId};

use crate::board::filter::{self, BoardFilter, ColumnKey, ViewMode};
use crate::board::notify::Notifications;
use crate::board::{Board, MoveOutcome};
use crate::drag::{self, AutoScroll, Viewport};
use crate::net::{NetCommand, NetEvent};
use crate::prompt;

/// Which tab is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Kanban columns.
    #[default]
    Board,
    /// Counts and monthly charts.
    Dashboard,
}

/// What keystrokes currently edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Board navigation.
    #[default]
    Normal,
    /// Typing a new task.
    Create,
    /// Typing changes for a task.
    Edit(TaskId),
    /// Typing a due-date range.
    DateRange,
    /// Waiting for `y` to delete a task.
    ConfirmDelete(TaskId),
}

/// A card held by the keyboard "pointer".
#[derive(Debug, Clone)]
pub struct Grab {
    /// The held task.
    pub id: TaskId,
    /// Index of the hovered column.
    pub column: usize,
    /// Pointer row, relative to the top of the hovered column.
    pub pointer: usize,
    autoscroll: AutoScroll,
}

/// Maximum number of board columns in any view.
pub const MAX_COLUMNS: usize = 4;

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Task cache and notifications.
    pub board: Board,
    /// Shown tab.
    pub tab: Tab,
    /// Active board view.
    pub view: ViewMode,
    /// Active filters.
    pub filter: BoardFilter,
    /// Focused column index.
    pub selected_column: usize,
    /// Focused card index within the focused column.
    pub selected_row: usize,
    /// Card being moved, if any.
    pub grab: Option<Grab>,
    /// Scroll offset per column, in cards.
    pub scroll: [f64; MAX_COLUMNS],
    /// Visible cards per column; set by the render loop from the terminal size.
    pub column_rows: usize,
    /// Prompt state.
    pub mode: InputMode,
    /// Prompt text.
    pub input: String,
    /// Subject of the validated session.
    pub session: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates an empty app in `view`.
    #[must_use]
    pub fn new(view: ViewMode, notifications: Notifications) -> Self {
        Self {
            board: Board::with_notifications(notifications),
            tab: Tab::Board,
            view,
            filter: BoardFilter::default(),
            selected_column: 0,
            selected_row: 0,
            grab: None,
            scroll: [0.0; MAX_COLUMNS],
            column_rows: 10,
            mode: InputMode::Normal,
            input: String::new(),
            session: None,
            should_quit: false,
        }
    }

    /// Columns of the active view.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnKey> {
        filter::columns(self.view)
    }

    /// Visible cards of the column at `index`.
    #[must_use]
    pub fn column_cards(&self, index: usize) -> Vec<&Task> {
        self.columns()
            .get(index)
            .map(|column| filter::column_tasks(self.board.tasks(), &self.filter, *column))
            .unwrap_or_default()
    }

    /// The focused card.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.column_cards(self.selected_column)
            .get(self.selected_row)
            .copied()
    }

    /// The held card.
    #[must_use]
    pub fn grabbed_task(&self) -> Option<&Task> {
        self.grab.as_ref().and_then(|g| self.board.cache().get(g.id))
    }

    /// Scroll offset of a column, in whole cards.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn column_offset(&self, index: usize) -> usize {
        // Offsets are clamped to [0, card count] by `drag::scrolled`.
        self.scroll.get(index).map_or(0, |o| o.floor() as usize)
    }

    // -----------------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------------

    /// Handles a key event. Returns a command when the action needs the server.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<NetCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::ConfirmDelete(id) => self.handle_confirm_key(key, id),
            InputMode::Create | InputMode::Edit(_) | InputMode::DateRange => {
                self.handle_prompt_key(key)
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        if self.grab.is_some() {
            return self.handle_grab_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = match self.tab {
                    Tab::Board => Tab::Dashboard,
                    Tab::Dashboard => Tab::Board,
                };
            }
            KeyCode::Char('v') => self.set_view(self.view.toggled()),
            KeyCode::Char('c') => self.refilter(BoardFilter::cycle_category),
            KeyCode::Char('p') => self.refilter(BoardFilter::cycle_priority),
            KeyCode::Char('s') => self.refilter(BoardFilter::cycle_status),
            KeyCode::Char('r') => self.open_prompt(InputMode::DateRange),
            KeyCode::Char('R') => return Some(NetCommand::Reload),
            KeyCode::Char('n') => self.open_prompt(InputMode::Create),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_task().map(|t| t.id) {
                    self.open_prompt(InputMode::Edit(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task().map(|t| t.id) {
                    self.mode = InputMode::ConfirmDelete(id);
                }
            }
            KeyCode::Char(' ') => self.grab_selected(),
            KeyCode::Char('<') => return self.quick_move(-1),
            KeyCode::Char('>') => return self.quick_move(1),
            KeyCode::Left | KeyCode::Char('h') => self.focus_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.focus_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.focus_row(-1),
            KeyCode::Down | KeyCode::Char('j') => self.focus_row(1),
            _ => {}
        }
        None
    }

    fn handle_grab_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        let column_count = self.columns().len();
        let max_pointer = self.column_rows.saturating_sub(1);
        let grab = self.grab.as_mut()?;
        match key.code {
            KeyCode::Esc => self.cancel_grab(),
            KeyCode::Enter | KeyCode::Char(' ') => return self.drop_grabbed(),
            KeyCode::Left | KeyCode::Char('h') => grab.column = grab.column.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => {
                grab.column = (grab.column + 1).min(column_count.saturating_sub(1));
            }
            KeyCode::Up | KeyCode::Char('k') => grab.pointer = grab.pointer.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                grab.pointer = (grab.pointer + 1).min(max_pointer);
            }
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, id: TaskId) -> Option<NetCommand> {
        self.mode = InputMode::Normal;
        if !matches!(key.code, KeyCode::Char('y' | 'Y')) {
            return None;
        }
        self.board.begin_delete(id).ok()?;
        Some(NetCommand::Delete(id))
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.input.clear();
            }
            KeyCode::Enter => return self.submit_prompt(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        None
    }

    fn open_prompt(&mut self, mode: InputMode) {
        self.mode = mode;
        self.input.clear();
    }

    fn submit_prompt(&mut self) -> Option<NetCommand> {
        let mode = std::mem::take(&mut self.mode);
        let input = std::mem::take(&mut self.input);

        let outcome = match mode {
            InputMode::Create => {
                let today = chrono::Local::now().date_naive();
                prompt::parse_new_task(&input, today)
                    .map(|task| Some(NetCommand::Create(task)))
                    .map_err(|e| format!("Cannot create task: {e}"))
            }
            InputMode::Edit(id) => match prompt::parse_patch(&input) {
                Ok(patch) => Ok(self
                    .board
                    .begin_edit(id)
                    .ok()
                    .map(|()| NetCommand::Edit { id, patch })),
                Err(e) => Err(format!("Cannot edit task: {e}")),
            },
            InputMode::DateRange => match prompt::parse_date_range(&input) {
                Ok(Some((from, to))) => {
                    self.refilter(|f| f.set_date_range(from, to));
                    Ok(None)
                }
                Ok(None) => {
                    self.refilter(BoardFilter::clear_date_range);
                    Ok(None)
                }
                Err(e) => Err(format!("Invalid date range: {e}")),
            },
            InputMode::Normal | InputMode::ConfirmDelete(_) => Ok(None),
        };

        outcome.unwrap_or_else(|message| {
            self.board.notifications_mut().error(message);
            None
        })
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.selected_column = 0;
        self.selected_row = 0;
        self.scroll = [0.0; MAX_COLUMNS];
    }

    fn refilter(&mut self, change: impl FnOnce(&mut BoardFilter)) {
        change(&mut self.filter);
        self.selected_row = 0;
        self.scroll = [0.0; MAX_COLUMNS];
    }

    fn focus_column(&mut self, step: isize) {
        let last = self.columns().len().saturating_sub(1);
        self.selected_column = self.selected_column.saturating_add_signed(step).min(last);
        self.selected_row = 0;
    }

    fn focus_row(&mut self, step: isize) {
        let last = self.column_cards(self.selected_column).len().saturating_sub(1);
        self.selected_row = self.selected_row.saturating_add_signed(step).min(last);

        // Keep the focused card inside the visible window.
        let offset = self.column_offset(self.selected_column);
        let rows = self.column_rows.max(1);
        let new_offset = if self.selected_row < offset {
            self.selected_row
        } else if self.selected_row >= offset + rows {
            self.selected_row + 1 - rows
        } else {
            offset
        };
        if let Some(scroll) = self.scroll.get_mut(self.selected_column) {
            *scroll = f64::from(u32::try_from(new_offset).unwrap_or(u32::MAX));
        }
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    fn grab_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        if self.board.is_pending(id) {
            self.board
                .notifications_mut()
                .error(format!("task {id} has a pending change"));
            return;
        }
        let pointer = self
            .selected_row
            .saturating_sub(self.column_offset(self.selected_column));
        self.grab = Some(Grab {
            id,
            column: self.selected_column,
            pointer,
            autoscroll: AutoScroll::default(),
        });
        tracing::debug!(%id, "card grabbed");
    }

    fn cancel_grab(&mut self) {
        if let Some(mut grab) = self.grab.take() {
            grab.autoscroll.cancel();
            tracing::debug!(id = %grab.id, "grab cancelled");
        }
    }

    fn drop_grabbed(&mut self) -> Option<NetCommand> {
        let mut grab = self.grab.take()?;
        grab.autoscroll.cancel();
        let target = *self.columns().get(grab.column)?;
        self.selected_column = grab.column;
        self.selected_row = 0;
        self.start_move(grab.id, target)
    }

    /// Moves the focused card to the neighbouring column without grabbing it.
    fn quick_move(&mut self, step: isize) -> Option<NetCommand> {
        let task = self.selected_task()?;
        let id = task.id;
        let columns = self.columns();
        let current = ColumnKey::of(task, self.view);
        let index = columns.iter().position(|c| *c == current)?;
        let target = *columns.get(index.checked_add_signed(step)?)?;
        self.start_move(id, target)
    }

    fn start_move(&mut self, id: TaskId, target: ColumnKey) -> Option<NetCommand> {
        match self.board.begin_move(id, target).ok()? {
            MoveOutcome::Unchanged => None,
            MoveOutcome::Pending(pending) => Some(NetCommand::Move {
                id: pending.id,
                patch: pending.patch,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Network results and ticks
    // -----------------------------------------------------------------------

    /// Applies a result from the network task.
    pub fn apply_net_event(&mut self, event: NetEvent) {
        // Errors are already turned into notifications by the board.
        match event {
            NetEvent::Session(Ok(info)) => self.session = Some(info.subject),
            NetEvent::Session(Err(e)) => {
                self.session = None;
                self.board
                    .notifications_mut()
                    .error(format!("Session check failed: {e}"));
            }
            NetEvent::Loaded(result) => {
                let _ = self.board.finish_load(result);
            }
            NetEvent::Created(result) => {
                let _ = self.board.finish_create(result);
            }
            NetEvent::Moved { id, result } => {
                let _ = self.board.finish_move(id, result);
            }
            NetEvent::Edited { id, result } => {
                let _ = self.board.finish_edit(id, result);
            }
            NetEvent::Deleted { id, result } => {
                let _ = self.board.finish_delete(id, result);
            }
        }
        self.clamp_selection();
    }

    /// Per-frame housekeeping: expires notifications and runs autoscroll.
    pub fn tick(&mut self, now: Instant) {
        self.board.notifications_mut().expire(now);

        let Some(column) = self.grab.as_ref().map(|g| g.column) else {
            return;
        };
        let cards = self.column_cards(column).len();
        let rows = self.column_rows;
        let Some(offset) = self.scroll.get(column).copied() else {
            return;
        };
        let Some(grab) = self.grab.as_mut() else {
            return;
        };
        let view = Viewport {
            pointer: to_f64(grab.pointer),
            height: to_f64(rows),
            offset,
            content_height: to_f64(cards),
        };
        let delta = grab.autoscroll.tick(view);
        if let Some(scroll) = self.scroll.get_mut(column) {
            *scroll = drag::scrolled(view, delta);
        }
    }

    fn clamp_selection(&mut self) {
        let last_column = self.columns().len().saturating_sub(1);
        self.selected_column = self.selected_column.min(last_column);
        let last_row = self.column_cards(self.selected_column).len().saturating_sub(1);
        self.selected_row = self.selected_row.min(last_row);
        if self.grab.as_ref().is_some_and(|g| self.board.cache().get(g.id).is_none()) {
            self.cancel_grab();
        }
    }
}

fn to_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}
