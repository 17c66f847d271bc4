use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::store::Document;
use crate::io::workspace_io::KANBAN_DOCUMENTS;
use crate::ops::{kanban_ops, player_ops};
use crate::tui::app::{App, EditTarget, Mode, Panel};
use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary};

use super::navigate::PLAYER_DOCUMENTS;

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => cancel_edit(app),
        (_, KeyCode::Enter) => commit_edit(app),
        (_, KeyCode::Backspace) => {
            if let Some(start) = prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(start..app.edit_cursor);
                app.edit_cursor = start;
            }
        }
        (_, KeyCode::Delete) => {
            if let Some(end) = next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(app.edit_cursor..end);
            }
        }
        (_, KeyCode::Left) => {
            if let Some(pos) = prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = pos;
            }
        }
        (_, KeyCode::Right) => {
            if let Some(pos) = next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = pos;
            }
        }
        (_, KeyCode::Home) => app.edit_cursor = 0,
        (_, KeyCode::End) => app.edit_cursor = app.edit_buffer.len(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            app.edit_buffer.drain(..app.edit_cursor);
            app.edit_cursor = 0;
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.insert(app.edit_cursor, c);
            app.edit_cursor += c.len_utf8();
        }
        _ => {}
    }
}

fn cancel_edit(app: &mut App) {
    app.edit_buffer.clear();
    app.edit_cursor = 0;
    app.edit_target = None;
    app.mode = Mode::Navigate;
}

fn commit_edit(app: &mut App) {
    let target = app.edit_target.take();
    let text = std::mem::take(&mut app.edit_buffer);
    app.edit_cursor = 0;
    app.mode = Mode::Navigate;

    let text = text.trim();
    let Some(target) = target else {
        return;
    };
    if text.is_empty() {
        return;
    }

    match target {
        EditTarget::NewTask { column } => {
            match kanban_ops::add_task(&mut app.ws.kanban, text, column.as_deref()) {
                Ok(placement) => {
                    select_placed(app, &placement.text, &placement.column);
                    app.save(&KANBAN_DOCUMENTS);
                }
                Err(e) => app.set_error(e.to_string()),
            }
        }
        EditTarget::NewColumn => match kanban_ops::add_column(&mut app.ws.kanban, text, None, None) {
            Ok(key) => {
                app.column_cursor = app.ws.kanban.columns.len().saturating_sub(1);
                app.row_cursor = 0;
                app.set_status(format!("added column {}", key));
                app.save(&KANBAN_DOCUMENTS);
            }
            Err(e) => app.set_error(e.to_string()),
        },
        EditTarget::NewNote => {
            if app.ws.notes.push(text) {
                app.notes_cursor = app.ws.notes.len() - 1;
                app.save(&[Document::Notes]);
            }
        }
        EditTarget::AddTrack => {
            let music_dir = app.ws.config.media.music_path(&app.ws.data_dir);
            let Some(path) = resolve_file(&music_dir, text) else {
                app.set_error(format!("no such file: {}", text));
                return;
            };
            if player_ops::add_track(&mut app.ws.player, &path) {
                app.playlist_cursor = app.ws.player.playlist.len() - 1;
                app.save(&PLAYER_DOCUMENTS);
            } else {
                app.set_status("already in the playlist");
            }
        }
        EditTarget::AttachFile { column } => {
            let Some(path) = resolve_file(&app.ws.data_dir, text) else {
                app.set_error(format!("no such file: {}", text));
                return;
            };
            match kanban_ops::attach_file(&mut app.ws.kanban, &path, &column) {
                Ok(placement) => {
                    select_placed(app, &placement.text, &placement.column);
                    app.save(&KANBAN_DOCUMENTS);
                }
                Err(e) => app.set_error(e.to_string()),
            }
        }
    }
}

/// Relative input resolves against `base`; `~/` against the home directory
fn resolve_file(base: &std::path::Path, input: &str) -> Option<PathBuf> {
    let path = match input.strip_prefix("~/") {
        Some(rest) => PathBuf::from(std::env::var("HOME").ok()?).join(rest),
        None => PathBuf::from(input),
    };
    let path = if path.is_relative() { base.join(path) } else { path };
    std::fs::canonicalize(path).ok()
}

/// Point the cursors of the current panel at a freshly placed task
fn select_placed(app: &mut App, text: &str, column: &str) {
    match app.panel {
        Panel::Board => {
            if let Some(i) = app.ws.kanban.columns.position(&column.to_string()) {
                app.column_cursor = i;
            }
            app.row_cursor = app.ws.kanban.column_len(column).saturating_sub(1);
        }
        _ => {
            if let Some(i) = app.todo_items().iter().position(|t| t.text == text) {
                app.todo_cursor = i;
            }
        }
    }
}
