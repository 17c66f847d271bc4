pub mod board_view;
pub mod help_overlay;
mod helpers;
pub mod notes_view;
pub mod playlist_view;
pub mod status_row;
pub mod tab_bar;
pub mod todo_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Panel};

/// Main render function: dispatches to the panel renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);

    match app.panel {
        Panel::Board => board_view::render_board_view(frame, app, chunks[1]),
        Panel::Todo => todo_view::render_todo_view(frame, app, chunks[1]),
        Panel::Playlist => playlist_view::render_playlist_view(frame, app, chunks[1]),
        Panel::Notes => notes_view::render_notes_view(frame, app, chunks[1]),
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}
