use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::recovery;
use crate::io::store::Document;
use crate::io::workspace_io::KANBAN_DOCUMENTS;
use crate::ops::{kanban_ops, player_ops};
use crate::tui::app::{App, ConfirmAction, Mode};

use super::navigate::PLAYER_DOCUMENTS;

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Confirm: y
        (KeyModifiers::NONE, KeyCode::Char('y')) => {
            let state = app.confirm_state.take();
            app.mode = Mode::Navigate;
            if let Some(state) = state {
                run_confirmed(app, state.action);
            }
        }
        // Cancel: n or Esc
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.confirm_state = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn run_confirmed(app: &mut App, action: ConfirmAction) {
    match action {
        ConfirmAction::DeleteTask { text } => {
            if kanban_ops::delete_task(&mut app.ws.kanban, &text) {
                app.clamp_cursors();
                app.save(&KANBAN_DOCUMENTS);
            }
        }
        ConfirmAction::DeleteColumn { key } => {
            let title = app
                .ws
                .kanban
                .column(&key)
                .map(|c| c.title.clone())
                .unwrap_or_default();
            match kanban_ops::delete_column(&mut app.ws.kanban, &key) {
                Ok(removed) => {
                    app.clamp_cursors();
                    if app.save(&KANBAN_DOCUMENTS) {
                        recovery::log_column_deletion(&app.ws.data_dir, &key, &title, &removed);
                    }
                }
                Err(e) => app.set_error(e.to_string()),
            }
        }
        ConfirmAction::RemoveTrack { path } => {
            if player_ops::remove_track(&mut app.ws.player, app.output.as_mut(), &path).is_some() {
                app.clamp_cursors();
                app.save(&PLAYER_DOCUMENTS);
            }
        }
        ConfirmAction::DeleteNote { index } => {
            if app.ws.notes.remove(index).is_some() {
                app.clamp_cursors();
                app.save(&[Document::Notes]);
            }
        }
    }
}
