use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

const STATE_FILE: &str = ".state.json";

/// Persisted TUI view state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Which panel is showing ("board", "todo", "playlist", "notes")
    pub panel: String,
    /// Board: selected column index
    #[serde(default)]
    pub column: usize,
    /// Board: selected row inside the column
    #[serde(default)]
    pub board_row: usize,
    #[serde(default)]
    pub todo_cursor: usize,
    #[serde(default)]
    pub notes_cursor: usize,
    /// Show completed tasks in the to-do panel
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

fn default_true() -> bool {
    true
}

pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(data_dir.join(STATE_FILE)).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(data_dir.join(STATE_FILE), content)
}
