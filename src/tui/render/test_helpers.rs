use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::column::{DONE_KEY, TODO_KEY};
use crate::model::workspace::Workspace;
use crate::ops::kanban_ops::{add_task, move_task};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An app over a workspace that is never written to disk.
pub fn empty_app() -> App {
    App::new(Workspace::new("/tmp/test-focus"))
}

/// Three tasks spread over the default columns, plus a note.
pub fn sample_app() -> App {
    let mut ws = Workspace::new("/tmp/test-focus");
    move_task(&mut ws.kanban, "Buy milk", TODO_KEY).unwrap();
    add_task(&mut ws.kanban, "Write report", None).unwrap();
    move_task(&mut ws.kanban, "Call mom", DONE_KEY).unwrap();
    ws.notes.push("remember the milk");
    App::new(ws)
}
