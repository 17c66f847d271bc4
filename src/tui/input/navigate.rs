use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::recovery;
use crate::io::store::Document;
use crate::io::workspace_io::KANBAN_DOCUMENTS;
use crate::model::player::{AudioOutput, Player, PlayerError};
use crate::ops::{ambient_ops, kanban_ops, player_ops};
use crate::tui::app::{App, ConfirmAction, ConfirmState, EditTarget, Mode, Panel};

pub(super) const PLAYER_DOCUMENTS: [Document; 2] = [Document::Playlist, Document::PlayerState];

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.should_quit = true;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char(c @ '1'..='4') => {
            app.panel = Panel::ALL[(c as u8 - b'1') as usize];
        }
        KeyCode::Tab => app.panel = app.panel.next(),

        // Timer
        KeyCode::Char('t') => app.timer.toggle(),
        KeyCode::Char('T') => app.timer.reset(),

        // Transport works from every panel
        KeyCode::Char('n') => transport(app, player_ops::next_track),
        KeyCode::Char('p') => transport(app, player_ops::prev_track),
        KeyCode::Char('b') => cycle_background(app),

        code => match app.panel {
            Panel::Board => board_key(app, code),
            Panel::Todo => todo_key(app, code),
            Panel::Playlist => playlist_key(app, code),
            Panel::Notes => notes_key(app, code),
        },
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn step_cursor(cursor: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *cursor = 0;
        return;
    }
    *cursor = cursor.saturating_add_signed(delta).min(len - 1);
}

pub(super) fn begin_edit(app: &mut App, target: EditTarget) {
    app.edit_buffer.clear();
    app.edit_cursor = 0;
    app.edit_target = Some(target);
    app.mode = Mode::Edit;
}

fn begin_confirm(app: &mut App, message: String, action: ConfirmAction) {
    app.confirm_state = Some(ConfirmState { message, action });
    app.mode = Mode::Confirm;
}

/// Flip a task between its completion column and the active columns
fn toggle_task(app: &mut App, text: &str) {
    let Some(completed) = app.ws.kanban.tasks.is_completed(text) else {
        return;
    };
    match kanban_ops::toggle_task_completion(&mut app.ws.kanban, text, !completed) {
        Ok(Some(placement)) => {
            app.set_status(format!("\"{}\" -> {}", placement.text, placement.column));
            app.clamp_cursors();
            app.save(&KANBAN_DOCUMENTS);
        }
        Ok(None) => {}
        Err(e) => app.set_error(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

fn board_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('h') | KeyCode::Left => {
            let columns = app.ws.kanban.columns.len();
            step_cursor(&mut app.column_cursor, columns, -1);
            app.clamp_cursors();
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let columns = app.ws.kanban.columns.len();
            step_cursor(&mut app.column_cursor, columns, 1);
            app.clamp_cursors();
        }
        KeyCode::Char('j') | KeyCode::Down => board_row(app, 1),
        KeyCode::Char('k') | KeyCode::Up => board_row(app, -1),
        KeyCode::Char('H') => move_to_adjacent_column(app, -1),
        KeyCode::Char('L') => move_to_adjacent_column(app, 1),
        KeyCode::Char('K') => reorder_in_column(app, -1),
        KeyCode::Char('J') => reorder_in_column(app, 1),
        KeyCode::Char('<') => shift_current_column(app, -1),
        KeyCode::Char('>') => shift_current_column(app, 1),
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(text) = app.selected_board_task() {
                toggle_task(app, &text);
            }
        }
        KeyCode::Char('a') => {
            let column = app.current_column_key();
            if column.is_some() {
                begin_edit(app, EditTarget::NewTask { column });
            }
        }
        KeyCode::Char('A') => begin_edit(app, EditTarget::NewColumn),
        KeyCode::Char('f') => {
            if let Some(column) = app.current_column_key() {
                begin_edit(app, EditTarget::AttachFile { column });
            }
        }
        KeyCode::Char('x') => {
            if let Some(text) = app.selected_board_task() {
                begin_confirm(
                    app,
                    format!("Delete \"{}\"?", text),
                    ConfirmAction::DeleteTask { text },
                );
            }
        }
        KeyCode::Char('X') => {
            let Some(key) = app.current_column_key() else {
                return;
            };
            let count = app.ws.kanban.column_len(&key);
            let message = if count == 0 {
                format!("Delete column {}?", key)
            } else {
                format!("Delete column {} and its {} task(s)?", key, count)
            };
            begin_confirm(app, message, ConfirmAction::DeleteColumn { key });
        }
        _ => {}
    }
}

fn board_row(app: &mut App, delta: isize) {
    let rows = app
        .current_column_key()
        .map_or(0, |k| app.ws.kanban.column_len(&k));
    step_cursor(&mut app.row_cursor, rows, delta);
}

/// H/L: the keyboard version of dragging a card onto the next column
fn move_to_adjacent_column(app: &mut App, delta: isize) {
    let Some(text) = app.selected_board_task() else {
        return;
    };
    let Some(target) = app.column_cursor.checked_add_signed(delta) else {
        return;
    };
    let Some(key) = app.ws.kanban.columns.get_index(target).map(|c| c.key.clone()) else {
        return;
    };
    match kanban_ops::move_task(&mut app.ws.kanban, &text, &key) {
        Ok(_) => {
            app.column_cursor = target;
            app.row_cursor = app.ws.kanban.column_len(&key).saturating_sub(1);
            app.save(&KANBAN_DOCUMENTS);
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

fn reorder_in_column(app: &mut App, delta: isize) {
    let Some(key) = app.current_column_key() else {
        return;
    };
    let mut order = app.ws.kanban.board.tasks(&key).to_vec();
    let from = app.row_cursor;
    let Some(to) = from.checked_add_signed(delta).filter(|&to| to < order.len()) else {
        return;
    };
    order.swap(from, to);
    match kanban_ops::reorder_column_tasks(&mut app.ws.kanban, &key, &order) {
        Ok(()) => {
            app.row_cursor = to;
            app.save(&KANBAN_DOCUMENTS);
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

fn shift_current_column(app: &mut App, delta: isize) {
    let Some(key) = app.current_column_key() else {
        return;
    };
    match kanban_ops::shift_column(&mut app.ws.kanban, &key, delta) {
        Ok(Some(position)) => {
            app.column_cursor = position;
            app.save(&KANBAN_DOCUMENTS);
        }
        Ok(None) => {}
        Err(e) => app.set_error(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// To-do list
// ---------------------------------------------------------------------------

fn todo_key(app: &mut App, code: KeyCode) {
    let len = app.todo_items().len();
    match code {
        KeyCode::Char('j') | KeyCode::Down => step_cursor(&mut app.todo_cursor, len, 1),
        KeyCode::Char('k') | KeyCode::Up => step_cursor(&mut app.todo_cursor, len, -1),
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(text) = app.selected_todo().map(|t| t.text.clone()) {
                toggle_task(app, &text);
            }
        }
        KeyCode::Char('a') => begin_edit(app, EditTarget::NewTask { column: None }),
        KeyCode::Char('c') => {
            app.show_completed = !app.show_completed;
            app.clamp_cursors();
        }
        KeyCode::Char('x') => {
            if let Some(text) = app.selected_todo().map(|t| t.text.clone()) {
                begin_confirm(
                    app,
                    format!("Delete \"{}\"?", text),
                    ConfirmAction::DeleteTask { text },
                );
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Playlist
// ---------------------------------------------------------------------------

fn playlist_key(app: &mut App, code: KeyCode) {
    let len = app.ws.player.playlist.len();
    match code {
        KeyCode::Char('j') | KeyCode::Down => step_cursor(&mut app.playlist_cursor, len, 1),
        KeyCode::Char('k') | KeyCode::Up => step_cursor(&mut app.playlist_cursor, len, -1),
        KeyCode::Char(' ') => transport(app, |player, out| {
            player_ops::play_pause(player, out).map(|_| ())
        }),
        KeyCode::Enter => {
            let Some(path) = app.ws.player.playlist.get_index(app.playlist_cursor).cloned() else {
                return;
            };
            transport(app, |player, out| {
                player_ops::select_track(player, out, &path)?;
                player_ops::play_pause(player, out).map(|_| ())
            });
        }
        KeyCode::Char('K') => reorder_playlist(app, -1),
        KeyCode::Char('J') => reorder_playlist(app, 1),
        KeyCode::Char('a') => begin_edit(app, EditTarget::AddTrack),
        KeyCode::Char('x') => {
            if let Some(path) = app.ws.player.playlist.get_index(app.playlist_cursor).cloned() {
                begin_confirm(
                    app,
                    format!("Remove {} from the playlist?", player_ops::track_label(&path)),
                    ConfirmAction::RemoveTrack { path },
                );
            }
        }
        _ => {}
    }
}

/// Run a playback operation against the app's output and persist the
/// selection. A vanished file is logged and reported.
fn transport(
    app: &mut App,
    f: impl FnOnce(&mut Player, &mut dyn AudioOutput) -> Result<(), PlayerError>,
) {
    let result = f(&mut app.ws.player, app.output.as_mut());
    match result {
        Ok(()) => {
            if let Some(label) = app.now_playing() {
                app.set_status(format!("> {}", label));
            }
        }
        Err(e) => {
            if let PlayerError::Missing(path) = &e {
                recovery::log_missing(&app.ws.data_dir, "playlist track", path);
            }
            app.set_error(e.to_string());
        }
    }
    if let Some(i) = app.ws.player.playlist.current_index() {
        app.playlist_cursor = i;
    }
    app.save(&PLAYER_DOCUMENTS);
}

fn reorder_playlist(app: &mut App, delta: isize) {
    let mut order = app.ws.player.playlist.ids();
    let from = app.playlist_cursor;
    let Some(to) = from.checked_add_signed(delta).filter(|&to| to < order.len()) else {
        return;
    };
    order.swap(from, to);
    player_ops::reorder_playlist(&mut app.ws.player, app.output.as_mut(), &order);
    app.playlist_cursor = to;
    app.save(&PLAYER_DOCUMENTS);
}

// ---------------------------------------------------------------------------
// Notes and background
// ---------------------------------------------------------------------------

fn notes_key(app: &mut App, code: KeyCode) {
    let len = app.ws.notes.len();
    match code {
        KeyCode::Char('j') | KeyCode::Down => step_cursor(&mut app.notes_cursor, len, 1),
        KeyCode::Char('k') | KeyCode::Up => step_cursor(&mut app.notes_cursor, len, -1),
        KeyCode::Char('a') => begin_edit(app, EditTarget::NewNote),
        KeyCode::Char('x') if len > 0 => {
            let index = app.notes_cursor;
            begin_confirm(
                app,
                "Delete this note?".to_string(),
                ConfirmAction::DeleteNote { index },
            );
        }
        _ => {}
    }
}

fn cycle_background(app: &mut App) {
    app.backgrounds = ambient_ops::list_backgrounds(&app.ws).unwrap_or_default();
    match ambient_ops::next_background(&mut app.ws, &app.backgrounds) {
        Some(i) => {
            let name = app.backgrounds[i]
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            app.set_status(format!("background: {}", name));
        }
        None => app.set_error("no backgrounds found"),
    }
    app.save(&[Document::Background]);
}
