use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::player::PlayState;
use crate::model::timer::Phase;
use crate::tui::app::{App, Mode, Panel};
use crate::util::unicode::truncate_to_width;

use super::helpers::{pad_to, spans_width};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Navigate => navigate_line(app, width),
        Mode::Edit => {
            let prompt = app.edit_target.as_ref().map_or("", |t| t.prompt());
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor.min(app.edit_buffer.len()));
            let mut spans = vec![
                Span::styled(prompt, Style::default().fg(app.theme.dim).bg(bg)),
                Span::styled(before.to_string(), Style::default().fg(app.theme.text_bright).bg(bg)),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
                Span::styled(after.to_string(), Style::default().fg(app.theme.text_bright).bg(bg)),
            ];
            push_hint(&mut spans, "Enter save  Esc cancel", app, width);
            Line::from(spans)
        }
        Mode::Confirm => {
            let message = app
                .confirm_state
                .as_ref()
                .map_or(String::new(), |c| c.message.clone());
            let mut spans = vec![Span::styled(
                message,
                Style::default()
                    .fg(app.theme.yellow)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )];
            push_hint(&mut spans, "y confirm  n cancel", app, width);
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Timer and now-playing on the left; a status message or key hints on the
/// right
fn navigate_line(app: &App, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let mut spans: Vec<Span<'static>> = Vec::new();

    let timer_color = match app.timer.phase() {
        Phase::Work => app.theme.highlight,
        Phase::Break => app.theme.green,
    };
    let run_mark = if app.timer.is_running() { "\u{25B6}" } else { "\u{23F8}" };
    spans.push(Span::styled(
        format!(" {} {} {} ", app.timer.phase().label(), app.timer, run_mark),
        Style::default().fg(timer_color).bg(bg),
    ));

    if let Some(label) = app.now_playing() {
        let mark = match app.ws.player.state {
            PlayState::Playing => "\u{266A}",
            PlayState::Paused => "\u{2016}",
            PlayState::Stopped => "\u{25A0}",
        };
        spans.push(Span::styled(
            format!(" {} {}", mark, truncate_to_width(&label, 30)),
            Style::default().fg(app.theme.cyan).bg(bg),
        ));
    }

    match &app.status_message {
        Some(msg) => {
            let color = if app.status_is_error { app.theme.red } else { app.theme.text_bright };
            let used = spans_width(&spans);
            let room = width.saturating_sub(used + 2);
            let msg = truncate_to_width(msg, room);
            let msg_width = crate::util::unicode::display_width(&msg);
            spans.push(Span::styled(
                " ".repeat(width.saturating_sub(used + msg_width + 1)),
                Style::default().bg(bg),
            ));
            spans.push(Span::styled(msg, Style::default().fg(color).bg(bg)));
            pad_to(&mut spans, width, Style::default().bg(bg));
        }
        None => push_hint(&mut spans, panel_hint(app.panel), app, width),
    }
    Line::from(spans)
}

fn panel_hint(panel: Panel) -> &'static str {
    match panel {
        Panel::Board => "a add  HL move  space done  ? help",
        Panel::Todo => "a add  space done  c completed  ? help",
        Panel::Playlist => "space play  n/p skip  a add  ? help",
        Panel::Notes => "a add  x delete  ? help",
    }
}

/// Right-align a dim hint when it fits
fn push_hint(spans: &mut Vec<Span<'_>>, hint: &'static str, app: &App, width: usize) {
    let bg = app.theme.background;
    let content_width = spans_width(spans);
    let hint_width = hint.chars().count();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }
}
