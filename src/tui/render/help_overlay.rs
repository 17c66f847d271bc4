use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, Panel};

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(60, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    // Context-sensitive part first
    lines.push(Line::from(Span::styled(format!(" {}", app.panel.label()), header_style)));
    let panel_bindings: &[(&str, &str)] = match app.panel {
        Panel::Board => &[
            (" h/l", "Previous/next column"),
            (" j/k", "Move cursor down/up"),
            (" H/L", "Move task to previous/next column"),
            (" J/K", "Move task down/up"),
            (" </>", "Move column left/right"),
            (" space", "Toggle done"),
            (" a / A", "Add task / add column"),
            (" f", "Attach a file"),
            (" x / X", "Delete task / delete column"),
        ],
        Panel::Todo => &[
            (" j/k", "Move cursor down/up"),
            (" space", "Toggle done"),
            (" a", "Add task"),
            (" c", "Show/hide completed"),
            (" x", "Delete task"),
        ],
        Panel::Playlist => &[
            (" j/k", "Move cursor down/up"),
            (" Enter", "Play track under cursor"),
            (" space", "Play/pause"),
            (" J/K", "Move track down/up"),
            (" a", "Add track"),
            (" x", "Remove track"),
        ],
        Panel::Notes => &[
            (" j/k", "Move cursor down/up"),
            (" a", "Add note"),
            (" x", "Delete note"),
        ],
    };
    for (key, desc) in panel_bindings {
        add_binding(&mut lines, key, desc, key_style, desc_style);
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Everywhere", header_style)));
    for (key, desc) in [
        (" 1-4/Tab", "Switch panel"),
        (" n/p", "Next/previous track"),
        (" t / T", "Start-pause / reset timer"),
        (" b", "Next background"),
        (" ?", "Toggle help"),
        (" q", "Quit"),
    ] {
        add_binding(&mut lines, key, desc, key_style, desc_style);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn help_follows_the_panel() {
        let mut app = empty_app();
        app.panel = Panel::Playlist;
        let out = render_to_string(TERM_W, 30, |frame, area| render_help_overlay(frame, &app, area));
        assert!(out.contains("Play track under cursor"));
        assert!(!out.contains("Add column"));
        assert!(out.contains("Next background"));
    }
}
