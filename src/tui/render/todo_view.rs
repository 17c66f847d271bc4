use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

use super::helpers::{check_mark, pad_to, visible_window};

/// Render the flat to-do list with each task's column on the right
pub fn render_todo_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let items = app.todo_items();
    if items.is_empty() {
        let msg = if app.ws.kanban.tasks.is_empty() { " No tasks" } else { " Nothing pending" };
        let empty = Paragraph::new(msg).style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    for i in visible_window(app.todo_cursor, items.len(), area.height as usize) {
        let task = items[i];
        let is_cursor = i == app.todo_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };

        let column = app.ws.kanban.board.column_of(&task.text);
        let (label, label_color) = match column.and_then(|k| app.ws.kanban.column(k)) {
            Some(col) => (col.title.clone(), app.theme.column_color(col.color)),
            None => ("unplaced".to_string(), app.theme.red),
        };

        let text_color = if is_cursor {
            app.theme.text_bright
        } else if task.completed {
            app.theme.dim
        } else {
            app.theme.text
        };
        let check_color = if task.completed { app.theme.green } else { app.theme.text };

        let label_width = display_width(&label) + 2;
        let room = width.saturating_sub(5 + label_width);
        let mut spans = vec![
            Span::styled(
                format!(" {} ", check_mark(task.completed)),
                Style::default().fg(check_color).bg(row_bg),
            ),
            Span::styled(
                truncate_to_width(&task.text, room),
                Style::default().fg(text_color).bg(row_bg),
            ),
        ];
        let label_span = Span::styled(format!("{} ", label), Style::default().fg(label_color).bg(row_bg));
        pad_to(&mut spans, width.saturating_sub(label_width), Style::default().bg(row_bg));
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        spans.push(label_span);
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn lists_tasks_with_their_column() {
        let app = sample_app();
        let out = render_to_string(TERM_W, 5, |frame, area| render_todo_view(frame, &app, area));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with(" [ ] Buy milk"));
        assert!(lines[0].ends_with("To Do"));
        assert!(lines[1].ends_with("In Progress"));
        assert!(lines[2].starts_with(" [x] Call mom"));
    }

    #[test]
    fn hiding_completed_tasks() {
        let mut app = sample_app();
        app.show_completed = false;
        let out = render_to_string(TERM_W, 5, |frame, area| render_todo_view(frame, &app, area));
        assert!(!out.contains("Call mom"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn empty_list() {
        let app = empty_app();
        let out = render_to_string(TERM_W, 3, |frame, area| render_todo_view(frame, &app, area));
        assert_eq!(out, " No tasks");
    }
}
