use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::helpers::{pad_to, visible_window};

pub fn render_notes_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let notes = &app.ws.notes.lines;
    if notes.is_empty() {
        let empty = Paragraph::new(" No notes (a to write one)")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    for i in visible_window(app.notes_cursor, notes.len(), area.height as usize) {
        let is_cursor = i == app.notes_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let fg = if is_cursor { app.theme.text_bright } else { app.theme.text };
        let mut spans = vec![
            Span::styled(" \u{2022} ", Style::default().fg(app.theme.highlight).bg(row_bg)),
            Span::styled(
                truncate_to_width(&notes[i].content, width.saturating_sub(3)),
                Style::default().fg(fg).bg(row_bg),
            ),
        ];
        pad_to(&mut spans, width, Style::default().bg(row_bg));
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}
