use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::lock::FileLock;
use crate::io::store::Document;
use crate::io::watcher::DataWatcher;
use crate::io::workspace_io;
use crate::model::player::{AudioOutput, PlayState, SilentOutput};
use crate::model::task::Task;
use crate::model::timer::{Pomodoro, TimerEvent};
use crate::model::workspace::Workspace;
use crate::ops::{ambient_ops, player_ops};

use super::input;
use super::render;
use super::theme::Theme;

/// Which panel is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Board,
    Todo,
    Playlist,
    Notes,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Board, Panel::Todo, Panel::Playlist, Panel::Notes];

    pub fn label(self) -> &'static str {
        match self {
            Panel::Board => "Board",
            Panel::Todo => "To-Do",
            Panel::Playlist => "Playlist",
            Panel::Notes => "Notes",
        }
    }

    /// Name stored in .state.json
    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Board => "board",
            Panel::Todo => "todo",
            Panel::Playlist => "playlist",
            Panel::Notes => "notes",
        }
    }

    pub fn parse(s: &str) -> Option<Panel> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn next(self) -> Panel {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Edit,
    Confirm,
}

/// What the line being typed will become
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// `None` puts it where a re-opened task goes
    NewTask { column: Option<String> },
    NewColumn,
    NewNote,
    AddTrack,
    AttachFile { column: String },
}

impl EditTarget {
    /// Prompt shown before the edit buffer
    pub fn prompt(&self) -> &'static str {
        match self {
            EditTarget::NewTask { .. } => "New task: ",
            EditTarget::NewColumn => "New column: ",
            EditTarget::NewNote => "Note: ",
            EditTarget::AddTrack => "Add track: ",
            EditTarget::AttachFile { .. } => "Attach file: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask { text: String },
    DeleteColumn { key: String },
    RemoveTrack { path: PathBuf },
    DeleteNote { index: usize },
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub message: String,
    pub action: ConfirmAction,
}

/// Main application state
pub struct App {
    pub ws: Workspace,
    pub panel: Panel,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Board: selected column index
    pub column_cursor: usize,
    /// Board: selected row inside the column
    pub row_cursor: usize,
    pub todo_cursor: usize,
    pub playlist_cursor: usize,
    pub notes_cursor: usize,
    /// To-do panel lists completed tasks too
    pub show_completed: bool,
    /// Help overlay visible
    pub show_help: bool,
    pub edit_buffer: String,
    /// Byte offset into `edit_buffer`
    pub edit_cursor: usize,
    pub edit_target: Option<EditTarget>,
    pub confirm_state: Option<ConfirmState>,
    /// Transient message shown in the status row until the next key
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub timer: Pomodoro,
    pub output: Box<dyn AudioOutput>,
    /// Background files, refreshed on `b`
    pub backgrounds: Vec<PathBuf>,
    pub watcher: Option<DataWatcher>,
}

impl App {
    pub fn new(ws: Workspace) -> Self {
        let theme = Theme::from_config(&ws.config.ui);
        let timer = Pomodoro::new(ws.config.timer.work_minutes, ws.config.timer.break_minutes);
        let backgrounds = ambient_ops::list_backgrounds(&ws).unwrap_or_default();
        let mut output: Box<dyn AudioOutput> = Box::new(SilentOutput::default());
        for (name, volume) in ambient_ops::noise_levels(&ws) {
            output.set_channel_volume(&name, volume);
        }

        App {
            ws,
            panel: Panel::Board,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            column_cursor: 0,
            row_cursor: 0,
            todo_cursor: 0,
            playlist_cursor: 0,
            notes_cursor: 0,
            show_completed: true,
            show_help: false,
            edit_buffer: String::new(),
            edit_cursor: 0,
            edit_target: None,
            confirm_state: None,
            status_message: None,
            status_is_error: false,
            timer,
            output,
            backgrounds,
            watcher: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.ws.data_dir
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Key of the column under the board cursor
    pub fn current_column_key(&self) -> Option<String> {
        self.ws
            .kanban
            .columns
            .get_index(self.column_cursor)
            .map(|c| c.key.clone())
    }

    /// Text of the task under the board cursor
    pub fn selected_board_task(&self) -> Option<String> {
        let key = self.current_column_key()?;
        self.ws.kanban.board.tasks(&key).get(self.row_cursor).cloned()
    }

    /// Tasks the to-do panel shows, in to-do list order
    pub fn todo_items(&self) -> Vec<&Task> {
        self.ws
            .kanban
            .tasks
            .iter()
            .filter(|t| self.show_completed || !t.completed)
            .collect()
    }

    pub fn selected_todo(&self) -> Option<&Task> {
        self.todo_items().get(self.todo_cursor).copied()
    }

    /// Keep every cursor inside its list after a change
    pub fn clamp_cursors(&mut self) {
        let columns = self.ws.kanban.columns.len();
        self.column_cursor = self.column_cursor.min(columns.saturating_sub(1));
        let rows = self
            .current_column_key()
            .map_or(0, |k| self.ws.kanban.column_len(&k));
        self.row_cursor = self.row_cursor.min(rows.saturating_sub(1));
        self.todo_cursor = self.todo_cursor.min(self.todo_items().len().saturating_sub(1));
        self.playlist_cursor = self
            .playlist_cursor
            .min(self.ws.player.playlist.len().saturating_sub(1));
        self.notes_cursor = self.notes_cursor.min(self.ws.notes.len().saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write `docs` under the data-directory lock. Failures are already in
    /// the recovery log; they are also shown in the status row.
    pub fn save(&mut self, docs: &[Document]) -> bool {
        let result = FileLock::acquire_default(&self.ws.data_dir)
            .map_err(|e| e.to_string())
            .and_then(|_lock| {
                workspace_io::save_documents(&self.ws, docs).map_err(|e| e.to_string())
            });
        match result {
            Ok(()) => {
                if let Some(w) = &mut self.watcher {
                    w.mark_own_write();
                }
                true
            }
            Err(e) => {
                self.set_error(format!("save failed: {}", e));
                false
            }
        }
    }

    /// Re-read the documents another process changed. Playback carries on
    /// if the current track survived.
    pub fn reload(&mut self) {
        let playing = self.ws.player.current_track().map(Path::to_path_buf);
        let state = self.ws.player.state;
        let position = self.ws.player.position;

        self.ws = workspace_io::load_workspace(&self.ws.data_dir);
        if playing.is_some() && self.ws.player.current_track().map(Path::to_path_buf) == playing {
            self.ws.player.state = state;
            self.ws.player.position = position;
        } else if state != PlayState::Stopped {
            self.output.stop();
        }

        self.theme = Theme::from_config(&self.ws.config.ui);
        let timer = &self.ws.config.timer;
        self.timer.set_durations(timer.work_minutes, timer.break_minutes);
        self.clamp_cursors();
    }

    // -----------------------------------------------------------------------
    // Timer and status
    // -----------------------------------------------------------------------

    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(TimerEvent::PhaseEnded { finished, next }) = self.timer.tick(elapsed) {
            self.output.cue("timer_end");
            self.set_status(format!("{} over, {} next", finished.label(), next.label()));
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = true;
    }

    /// Label of the playlist's current track, if any
    pub fn now_playing(&self) -> Option<String> {
        self.ws.player.current_track().map(player_ops::track_label)
    }
}

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    use crate::io::state::read_ui_state;

    let Some(ui_state) = read_ui_state(app.data_dir()) else {
        return;
    };
    if let Some(panel) = Panel::parse(&ui_state.panel) {
        app.panel = panel;
    }
    app.column_cursor = ui_state.column;
    app.row_cursor = ui_state.board_row;
    app.todo_cursor = ui_state.todo_cursor;
    app.notes_cursor = ui_state.notes_cursor;
    app.show_completed = ui_state.show_completed;
    app.clamp_cursors();
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    use crate::io::state::{UiState, write_ui_state};

    let ui_state = UiState {
        panel: app.panel.as_str().to_string(),
        column: app.column_cursor,
        board_row: app.row_cursor,
        todo_cursor: app.todo_cursor,
        notes_cursor: app.notes_cursor,
        show_completed: app.show_completed,
    };
    let _ = write_ui_state(app.data_dir(), &ui_state);
}

/// Run the TUI application
pub fn run(data_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = crate::io::paths::resolve_data_dir(data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let ws = workspace_io::load_workspace(&data_dir);

    let mut app = App::new(ws);
    restore_ui_state(&mut app);
    app.watcher = DataWatcher::start(&data_dir).ok();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Save everything before exit
    app.save(&Document::ALL);
    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        let now = Instant::now();
        app.tick(now - last_tick);
        last_tick = now;

        if let Some(changed) = app.watcher.as_mut().and_then(|w| w.poll())
            && !changed.0.is_empty()
        {
            app.reload();
            app.set_status("reloaded from disk");
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
