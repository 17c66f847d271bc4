use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::player::PlayState;
use crate::ops::player_ops::track_label;
use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::helpers::{pad_to, visible_window};

pub fn render_playlist_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let playlist = &app.ws.player.playlist;
    if playlist.is_empty() {
        let empty = Paragraph::new(" Playlist is empty (a to add a track)")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let current = playlist.current_index();
    let mut lines: Vec<Line> = Vec::new();
    for i in visible_window(app.playlist_cursor, playlist.len(), area.height as usize) {
        let Some(path) = playlist.get_index(i) else {
            continue;
        };
        let is_cursor = i == app.playlist_cursor;
        let is_current = current == Some(i);
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };

        let marker = match (is_current, app.ws.player.state) {
            (true, PlayState::Playing) => "\u{266A}",
            (true, _) => ">",
            (false, _) => " ",
        };
        let mut label_style = Style::default().fg(app.theme.text).bg(row_bg);
        if is_current {
            label_style = label_style.fg(app.theme.text_bright).add_modifier(Modifier::BOLD);
        }
        let mut spans = vec![
            Span::styled(format!(" {} ", marker), Style::default().fg(app.theme.cyan).bg(row_bg)),
            Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(app.theme.dim).bg(row_bg)),
            Span::styled(truncate_to_width(&track_label(path), width.saturating_sub(20)), label_style),
        ];
        if !path.exists() {
            spans.push(Span::styled(" (missing)", Style::default().fg(app.theme.red).bg(row_bg)));
        }
        pad_to(&mut spans, width, Style::default().bg(row_bg));
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn marks_current_and_missing_tracks() {
        let tmp = TempDir::new().unwrap();
        let rain = tmp.path().join("rain_on_glass.ogg");
        std::fs::write(&rain, b"").unwrap();
        let mut app = empty_app();
        app.ws.player.playlist.append(rain);
        app.ws.player.playlist.append(PathBuf::from("/nowhere/city_night.mp3"));
        app.ws.player.state = PlayState::Playing;

        let out = render_to_string(TERM_W, 3, |frame, area| render_playlist_view(frame, &app, area));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " \u{266A}  1. rain on glass");
        assert_eq!(lines[1], "    2. city night (missing)");
    }

    #[test]
    fn empty_playlist_hint() {
        let app = empty_app();
        let out = render_to_string(TERM_W, 2, |frame, area| render_playlist_view(frame, &app, area));
        assert!(out.contains("Playlist is empty"));
    }
}
