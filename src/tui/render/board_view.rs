use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::column::KanbanColumn;
use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::helpers::{check_mark, pad_to, visible_window};

/// Render the kanban board: one bordered box per column, left to right
pub fn render_board_view(frame: &mut Frame, app: &App, area: Rect) {
    let columns = app.ws.kanban.columns.as_slice();
    if columns.is_empty() {
        let empty = Paragraph::new(" No columns")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    let n = columns.len() as u32;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns.iter().map(|_| Constraint::Ratio(1, n)))
        .split(area);

    for (i, column) in columns.iter().enumerate() {
        render_column(frame, app, column, i == app.column_cursor, chunks[i]);
    }
}

fn render_column(frame: &mut Frame, app: &App, column: &KanbanColumn, selected: bool, area: Rect) {
    let bg = app.theme.background;
    let color = app.theme.column_color(column.color);
    let tasks = app.ws.kanban.board.tasks(&column.key);

    let border_style = if selected {
        Style::default().fg(app.theme.highlight).bg(bg)
    } else {
        Style::default().fg(app.theme.dim).bg(bg)
    };
    let done_mark = if column.is_completion() { " \u{2713}" } else { "" };
    let title = Line::from(vec![
        Span::styled(
            format!(" {}", column.title),
            Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} {} ", done_mark, tasks.len()),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tasks.is_empty() {
        let empty = Paragraph::new(" (empty)").style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    let width = inner.width as usize;
    let cursor = if selected { app.row_cursor } else { 0 };
    let mut lines: Vec<Line> = Vec::new();
    for row in visible_window(cursor, tasks.len(), inner.height as usize) {
        let text = &tasks[row];
        let is_cursor = selected && row == app.row_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let completed = app.ws.kanban.tasks.is_completed(text).unwrap_or(false);
        let attached = app.ws.kanban.attachments.contains_key(text);

        let text_color = if is_cursor {
            app.theme.text_bright
        } else if completed {
            app.theme.dim
        } else {
            app.theme.text
        };
        let mut spans = vec![Span::styled(
            format!("{} ", check_mark(completed)),
            Style::default().fg(color).bg(row_bg),
        )];
        let marker = if attached { "+" } else { "" };
        let room = width.saturating_sub(4 + marker.len());
        spans.push(Span::styled(
            truncate_to_width(text, room),
            Style::default().fg(text_color).bg(row_bg),
        ));
        if attached {
            spans.push(Span::styled(marker, Style::default().fg(app.theme.cyan).bg(row_bg)));
        }
        pad_to(&mut spans, width, Style::default().bg(row_bg));
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn columns_render_side_by_side() {
        let app = sample_app();
        let out = render_to_string(TERM_W, 8, |frame, area| render_board_view(frame, &app, area));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("To Do 1"));
        assert!(lines[0].contains("In Progress 1"));
        assert!(lines[0].contains("Done \u{2713} 1"));
        assert!(lines[1].contains("[ ] Buy milk"));
        assert!(lines[1].contains("[ ] Write report"));
        assert!(lines[1].contains("[x] Call mom"));
    }

    #[test]
    fn empty_column_says_so() {
        let app = empty_app();
        let out = render_to_string(TERM_W, 5, |frame, area| render_board_view(frame, &app, area));
        assert_eq!(out.matches("(empty)").count(), 3);
    }

    #[test]
    fn long_titles_are_truncated() {
        let mut app = sample_app();
        crate::ops::kanban_ops::move_task(
            &mut app.ws.kanban,
            "An extremely long task description that will not fit",
            "todo",
        )
        .unwrap();
        let out = render_to_string(TERM_W, 8, |frame, area| render_board_view(frame, &app, area));
        assert!(out.contains('\u{2026}'));
        assert!(!out.contains("will not fit"));
    }
}
