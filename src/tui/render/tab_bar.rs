use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Panel};

use super::helpers::spans_width;

/// Render the tab bar: one tab per panel, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Split into tab row and separator row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    // Leading icon
    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.highlight).bg(bg),
    ));
    spans.push(Span::styled(" ", Style::default().bg(bg)));

    for (i, panel) in Panel::ALL.into_iter().enumerate() {
        let is_current = app.panel == panel;
        spans.push(Span::styled(
            format!(" {} {} ", i + 1, panel.label()),
            tab_style(app, is_current),
        ));
        if let Some(count) = tab_count(app, panel) {
            spans.push(Span::styled(
                format!("{} ", count),
                Style::default()
                    .fg(app.theme.dim)
                    .bg(if is_current { app.theme.selection_bg } else { bg }),
            ));
        }
        sep_cols.push(spans_width(&spans));
        spans.push(sep.clone());
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
    sep_cols
}

/// Pending tasks on the to-do tab, tracks on the playlist tab
fn tab_count(app: &App, panel: Panel) -> Option<usize> {
    let n = match panel {
        Panel::Todo => app.ws.kanban.tasks.pending().count(),
        Panel::Playlist => app.ws.player.playlist.len(),
        Panel::Board | Panel::Notes => return None,
    };
    (n > 0).then_some(n)
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let mut line: String = String::with_capacity(width * 3);
    for col in 0..width {
        if sep_cols.contains(&col) {
            line.push('\u{2534}');
        } else {
            line.push('\u{2500}');
        }
    }
    let sep_widget =
        Paragraph::new(line).style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}
