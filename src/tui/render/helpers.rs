use std::ops::Range;

use ratatui::style::Style;
use ratatui::text::Span;

use crate::util::unicode;

/// Checkbox for a task's completion flag
pub(super) fn check_mark(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Fill the rest of a row with `style` so a selection bar spans the width
pub(super) fn pad_to(spans: &mut Vec<Span<'_>>, width: usize, style: Style) {
    let used = spans_width(spans);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
}

/// Rows to draw so that `cursor` stays visible in `height` rows
pub(super) fn visible_window(cursor: usize, len: usize, height: usize) -> Range<usize> {
    if height == 0 || len == 0 {
        return 0..0;
    }
    let start = cursor.saturating_sub(height - 1).min(len.saturating_sub(height));
    start..(start + height).min(len)
}
