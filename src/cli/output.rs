use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::column::{KanbanColumn, Rgb};
use crate::model::kanban::Kanban;
use crate::model::task::Task;
use crate::ops::player_ops::{LibraryEntry, track_label};
use crate::ops::search::{HitTarget, SearchHit};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub text: String,
    pub completed: bool,
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<PathBuf>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub key: String,
    pub title: String,
    pub color: Rgb,
    pub completes: bool,
    pub tasks: usize,
}

#[derive(Serialize)]
pub struct BoardColumnJson {
    pub key: String,
    pub title: String,
    pub completes: bool,
    pub tasks: Vec<String>,
}

#[derive(Serialize)]
pub struct TrackJson {
    pub index: usize,
    pub path: PathBuf,
    pub label: String,
    pub current: bool,
    pub missing: bool,
}

#[derive(Serialize)]
pub struct NoiseJson {
    pub name: String,
    pub volume: u8,
}

#[derive(Serialize)]
pub struct BackgroundJson {
    pub index: usize,
    pub path: PathBuf,
    pub current: bool,
}

#[derive(Serialize)]
pub struct TimerJson {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(kanban: &Kanban, task: &Task) -> TaskJson {
    TaskJson {
        text: task.text.clone(),
        completed: task.completed,
        column: kanban.board.column_of(&task.text).map(str::to_string),
        attachment: kanban.attachments.get(&task.text).cloned(),
    }
}

pub fn column_to_json(kanban: &Kanban, column: &KanbanColumn) -> ColumnJson {
    ColumnJson {
        key: column.key.clone(),
        title: column.title.clone(),
        color: column.color,
        completes: column.is_completion(),
        tasks: kanban.column_len(&column.key),
    }
}

pub fn board_to_json(kanban: &Kanban) -> Vec<BoardColumnJson> {
    kanban
        .columns
        .iter()
        .map(|c| BoardColumnJson {
            key: c.key.clone(),
            title: c.title.clone(),
            completes: c.is_completion(),
            tasks: kanban.board.tasks(&c.key).to_vec(),
        })
        .collect()
}

pub fn playlist_to_json(tracks: &[PathBuf], current: Option<usize>) -> Vec<TrackJson> {
    tracks
        .iter()
        .enumerate()
        .map(|(index, path)| TrackJson {
            index,
            path: path.clone(),
            label: track_label(path),
            current: current == Some(index),
            missing: !path.exists(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn check_mark(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// `[x] text  (column)`, with an attachment marker when one is set
pub fn format_task_line(kanban: &Kanban, task: &Task) -> String {
    let mut line = format!("{} {}", check_mark(task.completed), task.text);
    match kanban.board.column_of(&task.text) {
        Some(key) => line.push_str(&format!("  ({})", key)),
        None => line.push_str("  (unplaced)"),
    }
    if kanban.attachments.contains_key(&task.text) {
        line.push_str("  +file");
    }
    line
}

/// One block per column, left to right, tasks in board order.
pub fn format_board(kanban: &Kanban) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, column) in kanban.columns.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        let tasks = kanban.board.tasks(&column.key);
        let marker = if column.is_completion() { " *" } else { "" };
        lines.push(format!(
            "{} ({}){} - {}",
            column.title,
            column.key,
            marker,
            tasks.len()
        ));
        if tasks.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for text in tasks {
            lines.push(format!("  {}", text));
        }
    }
    lines
}

pub fn format_column_line(kanban: &Kanban, column: &KanbanColumn) -> String {
    let done = if column.is_completion() { "  done" } else { "" };
    format!(
        "{:<12} {:<16} {:<12} {:>3} tasks{}",
        column.key,
        column.title,
        column.color.to_string(),
        kanban.column_len(&column.key),
        done
    )
}

/// `> 2. label  path`, `>` marking the current track
pub fn format_track_line(index: usize, path: &Path, current: bool) -> String {
    let marker = if current { ">" } else { " " };
    let missing = if path.exists() { "" } else { "  (missing)" };
    format!(
        "{} {}. {}  {}{}",
        marker,
        index + 1,
        track_label(path),
        path.display(),
        missing
    )
}

pub fn format_library_line(entry: &LibraryEntry) -> String {
    let marker = if entry.in_playlist { "+" } else { " " };
    format!("{} {}  {}", marker, entry.label, entry.path.display())
}

pub fn format_search_hit(hit: &SearchHit) -> String {
    match &hit.target {
        HitTarget::Task { column, completed } => format!(
            "task     {} {}  ({})",
            check_mark(*completed),
            hit.text,
            column.as_deref().unwrap_or("unplaced")
        ),
        HitTarget::Attachment { task } => format!("file     {}  (task: {})", hit.text, task),
        HitTarget::Note { line } => format!("note:{:<3} {}", line + 1, hit.text),
    }
}

/// Parse `R,G,B` or `#RRGGBB` for the `--color` flags
pub fn parse_color(s: &str) -> Result<Rgb, String> {
    s.parse::<Rgb>()
}
