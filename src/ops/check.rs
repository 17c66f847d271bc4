use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::model::kanban::Kanban;

/// Structured result from `focus check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// Board and to-do list disagree; `--fix` repairs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckError {
    /// The same text sits in more than one place on the board
    DuplicatePlacement { text: String, columns: Vec<String> },
    /// On the board but absent from the to-do list
    MissingTask { text: String, column: String },
    /// The to-do flag contradicts the column
    WrongCompletion {
        text: String,
        column: String,
        completed: bool,
    },
    /// A board sequence for a column that is not defined
    OrphanSequence { column: String, tasks: Vec<String> },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::DuplicatePlacement { text, columns } => {
                write!(f, "\"{}\" is placed in: {}", text, columns.join(", "))
            }
            CheckError::MissingTask { text, column } => {
                write!(f, "[{}] \"{}\" is not in the to-do list", column, text)
            }
            CheckError::WrongCompletion {
                text,
                column,
                completed,
            } => {
                let state = if *completed { "done" } else { "not done" };
                write!(f, "[{}] \"{}\" is marked {}", column, text, state)
            }
            CheckError::OrphanSequence { column, tasks } => write!(
                f,
                "board has {} task(s) under undefined column {}",
                tasks.len(),
                column
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckWarning {
    /// In the to-do list but on no column
    Unplaced { text: String, completed: bool },
    /// Attachment for a task that no longer exists
    DanglingAttachment { text: String },
    /// Attached file is gone from disk
    MissingFile { text: String, path: PathBuf },
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Validate the board against the to-do list and attachments. Read-only.
pub fn check_kanban(kanban: &Kanban) -> CheckResult {
    let mut result = CheckResult::default();

    let mut placements: HashMap<&str, Vec<String>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for (key, tasks) in kanban.board.iter() {
        let Some(column) = kanban.column(key) else {
            result.errors.push(CheckError::OrphanSequence {
                column: key.to_string(),
                tasks: tasks.to_vec(),
            });
            continue;
        };
        for text in tasks {
            let seen = placements.entry(text.as_str()).or_default();
            if seen.is_empty() {
                order.push(text);
                match kanban.tasks.is_completed(text) {
                    None => result.errors.push(CheckError::MissingTask {
                        text: text.clone(),
                        column: key.to_string(),
                    }),
                    Some(completed) if completed != column.is_completion() => {
                        result.errors.push(CheckError::WrongCompletion {
                            text: text.clone(),
                            column: key.to_string(),
                            completed,
                        })
                    }
                    Some(_) => {}
                }
            }
            seen.push(key.to_string());
        }
    }
    for text in order {
        let columns = &placements[text];
        if columns.len() > 1 {
            result.errors.push(CheckError::DuplicatePlacement {
                text: text.to_string(),
                columns: columns.clone(),
            });
        }
    }

    for task in kanban.tasks.iter() {
        if !placements.contains_key(task.text.as_str()) {
            result.warnings.push(CheckWarning::Unplaced {
                text: task.text.clone(),
                completed: task.completed,
            });
        }
    }
    for (text, path) in &kanban.attachments {
        if !kanban.tasks.contains(text) {
            result.warnings.push(CheckWarning::DanglingAttachment { text: text.clone() });
        } else if !path.exists() {
            result.warnings.push(CheckWarning::MissingFile {
                text: text.clone(),
                path: path.clone(),
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Fix
// ---------------------------------------------------------------------------

/// Repair what `check_kanban` reports, board placement winning over the
/// to-do flag. Returns a line per change made.
pub fn fix_kanban(kanban: &mut Kanban) -> Vec<String> {
    let mut fixes = Vec::new();

    // Orphan sequences: re-home their tasks by the to-do flag.
    let orphans: Vec<String> = kanban
        .board
        .keys()
        .filter(|k| kanban.column(k).is_none())
        .map(str::to_string)
        .collect();
    for key in orphans {
        for text in kanban.board.remove_column(&key) {
            if !kanban.board.contains_task(&text) {
                place_by_flag(kanban, &text, &mut fixes);
            }
        }
        fixes.push(format!("removed sequence for undefined column {}", key));
    }

    // Keep the first placement of each text.
    let keys: Vec<String> = kanban.board.keys().map(str::to_string).collect();
    let mut seen: Vec<String> = Vec::new();
    for key in &keys {
        let Some(tasks) = kanban.board.tasks_mut(key) else {
            continue;
        };
        let before = tasks.len();
        tasks.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(t.clone());
                true
            }
        });
        if tasks.len() < before {
            fixes.push(format!("dropped {} duplicate placement(s) from {}", before - tasks.len(), key));
        }
    }

    // Registry follows placement.
    for key in &keys {
        let Some(completed) = kanban.column(key).map(|c| c.is_completion()) else {
            continue;
        };
        for text in kanban.board.tasks(key).to_vec() {
            if kanban.tasks.is_completed(&text) != Some(completed) {
                kanban.tasks.upsert(&text, completed);
                fixes.push(format!("marked \"{}\" {}", text, if completed { "done" } else { "not done" }));
            }
        }
    }

    // Unplaced tasks go where a toggle would put them.
    let unplaced: Vec<String> = kanban
        .tasks
        .iter()
        .filter(|t| !kanban.board.contains_task(&t.text))
        .map(|t| t.text.clone())
        .collect();
    for text in unplaced {
        place_by_flag(kanban, &text, &mut fixes);
    }

    let dangling: Vec<String> = kanban
        .attachments
        .keys()
        .filter(|t| !kanban.tasks.contains(t))
        .cloned()
        .collect();
    for text in dangling {
        kanban.attachments.shift_remove(&text);
        fixes.push(format!("dropped attachment of vanished task \"{}\"", text));
    }

    fixes
}

/// Put a text on the column matching its to-do flag (unknown texts count as
/// not done). Leaves it off the board if no such column exists.
fn place_by_flag(kanban: &mut Kanban, text: &str, fixes: &mut Vec<String>) {
    let completed = kanban.tasks.is_completed(text).unwrap_or(false);
    let target = if completed {
        kanban.completion_target()
    } else {
        kanban.reopen_target()
    };
    let Some(key) = target.map(|c| c.key.clone()) else {
        fixes.push(format!("could not place \"{}\": no matching column", text));
        return;
    };
    if crate::ops::kanban_ops::move_task(kanban, text, &key).is_ok() {
        fixes.push(format!("placed \"{}\" in {}", text, key));
    }
}
