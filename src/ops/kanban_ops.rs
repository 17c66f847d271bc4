use std::path::Path;

use serde::Serialize;

use crate::model::column::{KanbanColumn, Rgb, unique_key};
use crate::model::kanban::Kanban;
use crate::model::ordered::OrderError;

/// Error type for board operations. A failed operation leaves the board
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KanbanError {
    #[error("task text cannot be empty")]
    EmptyText,
    #[error("column title cannot be empty")]
    EmptyTitle,
    #[error("no such column: {0}")]
    UnknownColumn(String),
    #[error("there is no {0} column to move the task to")]
    NoTargetColumn(&'static str),
    #[error("cannot delete the last column")]
    LastColumn,
    #[error("column order rejected: {0}")]
    NotAPermutation(#[from] OrderError),
}

/// Where a task ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub text: String,
    pub column: String,
    pub completed: bool,
}

fn clean_text(text: &str) -> Result<String, KanbanError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(KanbanError::EmptyText);
    }
    Ok(text.to_string())
}

fn require_column<'a>(kanban: &'a Kanban, key: &str) -> Result<&'a KanbanColumn, KanbanError> {
    kanban
        .column(key)
        .ok_or_else(|| KanbanError::UnknownColumn(key.to_string()))
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Put `text` at the end of column `target` and make the to-do list agree.
///
/// Every path that changes where a task lives (checkbox, drag between
/// columns, inline add, to-do input, file drop) goes through here. The text
/// is removed from every sequence first, so it is never on the board twice,
/// and its task is created or updated with `completed` set to whether the
/// target column completes.
pub fn move_task(kanban: &mut Kanban, text: &str, target: &str) -> Result<Placement, KanbanError> {
    let text = clean_text(text)?;
    let completed = require_column(kanban, target)?.is_completion();

    kanban.board.remove_everywhere(&text);
    kanban.board.ensure_column(target);
    kanban.board.push(target, &text);
    kanban.tasks.upsert(&text, completed);

    Ok(Placement {
        text,
        column: target.to_string(),
        completed,
    })
}

/// Checkbox toggle in the to-do list. Checking moves the task to the
/// completion column; unchecking moves it to the default active column
/// (`progress`), never back to `todo` while another active column exists.
/// Unknown texts are ignored.
pub fn toggle_task_completion(
    kanban: &mut Kanban,
    text: &str,
    completed: bool,
) -> Result<Option<Placement>, KanbanError> {
    if !kanban.tasks.contains(text) {
        return Ok(None);
    }
    let target = if completed {
        kanban
            .completion_target()
            .ok_or(KanbanError::NoTargetColumn("completion"))?
    } else {
        kanban
            .reopen_target()
            .ok_or(KanbanError::NoTargetColumn("active"))?
    };
    let target = target.key.clone();
    move_task(kanban, text, &target).map(Some)
}

/// Add a task from the to-do input (no column) or a column's inline input.
pub fn add_task(kanban: &mut Kanban, text: &str, column: Option<&str>) -> Result<Placement, KanbanError> {
    let target = match column {
        Some(key) => key.to_string(),
        None => kanban
            .reopen_target()
            .map(|c| c.key.clone())
            .ok_or(KanbanError::NoTargetColumn("active"))?,
    };
    move_task(kanban, text, &target)
}

/// A file dropped on a column becomes a task named after the file, with the
/// path remembered as its attachment.
pub fn attach_file(kanban: &mut Kanban, path: &Path, column: &str) -> Result<Placement, KanbanError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let placement = move_task(kanban, &name, column)?;
    kanban
        .attachments
        .insert(placement.text.clone(), path.to_path_buf());
    Ok(placement)
}

/// Remove a task from the board, the to-do list and the attachments.
/// Returns false if it was nowhere.
pub fn delete_task(kanban: &mut Kanban, text: &str) -> bool {
    let on_board = kanban.board.remove_everywhere(text) > 0;
    let in_list = kanban.tasks.remove(text).is_some();
    let attached = kanban.attachments.shift_remove(text).is_some();
    on_board || in_list || attached
}

/// Within-column drag: rebuild the column from the order the view reports.
/// Texts are taken first-seen and unknown ones ignored; texts of the column
/// missing from `order` keep their relative order after the listed ones.
pub fn reorder_column_tasks(kanban: &mut Kanban, key: &str, order: &[String]) -> Result<(), KanbanError> {
    require_column(kanban, key)?;
    kanban.board.ensure_column(key);
    let Some(tasks) = kanban.board.tasks_mut(key) else {
        return Ok(());
    };
    let mut rest = std::mem::take(tasks);
    for text in order {
        if let Some(pos) = rest.iter().position(|t| t == text) {
            tasks.push(rest.remove(pos));
        }
    }
    tasks.append(&mut rest);
    Ok(())
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Create a column at the end of the board. Returns its generated key.
pub fn add_column(
    kanban: &mut Kanban,
    title: &str,
    color: Option<Rgb>,
    completes: Option<bool>,
) -> Result<String, KanbanError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(KanbanError::EmptyTitle);
    }
    let existing = kanban.column_keys();
    let key = unique_key(title, existing.iter().map(String::as_str));
    let mut column = KanbanColumn::new(key.clone(), title, color.unwrap_or_default());
    column.completes = completes;
    kanban.columns.append(column);
    kanban.align_board();
    Ok(key)
}

/// Change a column's title, color or completion attribute. The key never
/// changes. Flipping the completion attribute re-flags the tasks already in
/// the column.
pub fn edit_column(
    kanban: &mut Kanban,
    key: &str,
    title: Option<&str>,
    color: Option<Rgb>,
    completes: Option<bool>,
) -> Result<(), KanbanError> {
    let title = match title.map(str::trim) {
        Some("") => return Err(KanbanError::EmptyTitle),
        other => other,
    };
    let column = kanban
        .columns
        .get_mut(&key.to_string())
        .ok_or_else(|| KanbanError::UnknownColumn(key.to_string()))?;
    if let Some(title) = title {
        column.title = title.to_string();
    }
    if let Some(color) = color {
        column.color = color;
    }
    if let Some(completes) = completes {
        column.completes = Some(completes);
    }
    let completed = column.is_completion();
    let texts = kanban.board.tasks(key).to_vec();
    for text in texts {
        kanban.tasks.upsert(&text, completed);
    }
    Ok(())
}

/// Delete a column with everything in it. Returns the removed task texts so
/// the caller can record them. Asking the user to confirm a non-empty column
/// is the caller's job.
pub fn delete_column(kanban: &mut Kanban, key: &str) -> Result<Vec<String>, KanbanError> {
    require_column(kanban, key)?;
    if kanban.columns.len() == 1 {
        return Err(KanbanError::LastColumn);
    }
    let removed = kanban.board.tasks(key).to_vec();
    for text in &removed {
        delete_task(kanban, text);
    }
    kanban.columns.remove(&key.to_string());
    kanban.board.remove_column(key);
    Ok(removed)
}

/// Replace the column order. `keys` must be a permutation of the current
/// keys.
pub fn reorder_columns(kanban: &mut Kanban, keys: &[String]) -> Result<(), KanbanError> {
    kanban.columns.reorder_exact(keys)?;
    kanban.align_board();
    Ok(())
}

/// Move a column left (negative) or right. Returns the new position, or
/// `None` at the edge of the board.
pub fn shift_column(kanban: &mut Kanban, key: &str, delta: isize) -> Result<Option<usize>, KanbanError> {
    require_column(kanban, key)?;
    let moved = kanban.columns.shift(&key.to_string(), delta);
    kanban.align_board();
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::{DONE_KEY, PROGRESS_KEY, TODO_KEY};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// Uniqueness across sequences, and completion agreeing with placement.
    fn assert_consistent(kanban: &Kanban) {
        let mut seen = HashSet::new();
        for (key, tasks) in kanban.board.iter() {
            let col = kanban.column(key).expect("board key without column");
            for text in tasks {
                assert!(seen.insert(text.clone()), "{} on the board twice", text);
                assert_eq!(
                    kanban.tasks.is_completed(text),
                    Some(col.is_completion()),
                    "{} in {}",
                    text,
                    key
                );
            }
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn board_with(entries: &[(&str, &str)]) -> Kanban {
        let mut kanban = Kanban::default();
        for (text, column) in entries {
            move_task(&mut kanban, text, column).unwrap();
        }
        kanban
    }

    // --- move_task ---

    #[test]
    fn move_from_todo_to_done_completes() {
        let mut kanban = board_with(&[("Buy milk", TODO_KEY)]);
        assert_eq!(kanban.tasks.is_completed("Buy milk"), Some(false));

        let placed = move_task(&mut kanban, "Buy milk", DONE_KEY).unwrap();
        assert!(placed.completed);
        assert_eq!(kanban.tasks.is_completed("Buy milk"), Some(true));
        assert_eq!(kanban.board.tasks(DONE_KEY), strings(&["Buy milk"]));
        assert!(kanban.board.tasks(TODO_KEY).is_empty());
        assert_consistent(&kanban);
    }

    #[test]
    fn move_is_idempotent() {
        let mut kanban = board_with(&[("a", TODO_KEY), ("b", PROGRESS_KEY)]);
        move_task(&mut kanban, "a", PROGRESS_KEY).unwrap();
        let once = kanban.clone();
        move_task(&mut kanban, "a", PROGRESS_KEY).unwrap();
        assert_eq!(kanban, once);
    }

    #[test]
    fn any_move_sequence_keeps_uniqueness() {
        let mut kanban = Kanban::default();
        let keys = [TODO_KEY, PROGRESS_KEY, DONE_KEY];
        let texts = ["a", "b", "c", "a", "b", "a"];
        for (i, text) in texts.iter().enumerate() {
            for step in 0..3 {
                move_task(&mut kanban, text, keys[(i + step) % 3]).unwrap();
                assert_consistent(&kanban);
            }
        }
        assert_eq!(kanban.board.task_count(), 3);
        assert_eq!(kanban.tasks.len(), 3);
    }

    #[test]
    fn move_rejects_unknown_column_and_empty_text() {
        let mut kanban = board_with(&[("a", TODO_KEY)]);
        let before = kanban.clone();
        assert_eq!(
            move_task(&mut kanban, "a", "nope"),
            Err(KanbanError::UnknownColumn("nope".into()))
        );
        assert_eq!(move_task(&mut kanban, "   ", TODO_KEY), Err(KanbanError::EmptyText));
        assert_eq!(kanban, before);
    }

    #[test]
    fn move_trims_text() {
        let mut kanban = Kanban::default();
        let placed = move_task(&mut kanban, "  Call Bob \n", TODO_KEY).unwrap();
        assert_eq!(placed.text, "Call Bob");
        assert!(kanban.tasks.contains("Call Bob"));
    }

    #[test]
    fn custom_completion_column_completes() {
        let mut kanban = Kanban::default();
        let key = add_column(&mut kanban, "Shipped", None, Some(true)).unwrap();
        move_task(&mut kanban, "a", &key).unwrap();
        assert_eq!(kanban.tasks.is_completed("a"), Some(true));
        assert_consistent(&kanban);
    }

    // --- toggle_task_completion ---

    #[test]
    fn toggle_on_moves_to_done() {
        let mut kanban = board_with(&[("a", TODO_KEY)]);
        let placed = toggle_task_completion(&mut kanban, "a", true).unwrap().unwrap();
        assert_eq!(placed.column, DONE_KEY);
        assert_consistent(&kanban);
    }

    #[test]
    fn toggle_off_lands_in_progress_never_todo() {
        for start in [TODO_KEY, PROGRESS_KEY, DONE_KEY] {
            let mut kanban = board_with(&[("a", start)]);
            toggle_task_completion(&mut kanban, "a", false).unwrap();
            assert_eq!(kanban.board.column_of("a"), Some(PROGRESS_KEY));
            assert_eq!(kanban.tasks.is_completed("a"), Some(false));
        }
    }

    #[test]
    fn toggle_unknown_text_is_noop() {
        let mut kanban = board_with(&[("a", TODO_KEY)]);
        let before = kanban.clone();
        assert_eq!(toggle_task_completion(&mut kanban, "zzz", true), Ok(None));
        assert_eq!(kanban, before);
    }

    #[test]
    fn toggle_off_without_progress_uses_other_active_column() {
        let mut kanban = board_with(&[("a", DONE_KEY)]);
        delete_column(&mut kanban, PROGRESS_KEY).unwrap();
        let review = add_column(&mut kanban, "Review", None, None).unwrap();
        toggle_task_completion(&mut kanban, "a", false).unwrap();
        assert_eq!(kanban.board.column_of("a"), Some(review.as_str()));

        delete_column(&mut kanban, &review).unwrap();
        move_task(&mut kanban, "b", DONE_KEY).unwrap();
        toggle_task_completion(&mut kanban, "b", false).unwrap();
        assert_eq!(kanban.board.column_of("b"), Some(TODO_KEY));
    }

    #[test]
    fn toggle_on_without_completion_column_is_rejected() {
        let mut kanban = board_with(&[("a", TODO_KEY)]);
        delete_column(&mut kanban, DONE_KEY).unwrap();
        let before = kanban.clone();
        assert_eq!(
            toggle_task_completion(&mut kanban, "a", true),
            Err(KanbanError::NoTargetColumn("completion"))
        );
        assert_eq!(kanban, before);
    }

    // --- add / attach / delete ---

    #[test]
    fn add_without_column_goes_to_progress() {
        let mut kanban = Kanban::default();
        let placed = add_task(&mut kanban, "Write report", None).unwrap();
        assert_eq!(placed.column, PROGRESS_KEY);
        let placed = add_task(&mut kanban, "Plan", Some(TODO_KEY)).unwrap();
        assert_eq!(placed.column, TODO_KEY);
        assert_consistent(&kanban);
    }

    #[test]
    fn attach_file_names_task_after_file() {
        let mut kanban = Kanban::default();
        let path = PathBuf::from("/home/u/docs/report.pdf");
        let placed = attach_file(&mut kanban, &path, TODO_KEY).unwrap();
        assert_eq!(placed.text, "report.pdf");
        assert_eq!(kanban.attachments.get("report.pdf"), Some(&path));
        assert_eq!(attach_file(&mut kanban, Path::new("/"), TODO_KEY), Err(KanbanError::EmptyText));
    }

    #[test]
    fn delete_task_clears_everything_and_is_idempotent() {
        let mut kanban = Kanban::default();
        attach_file(&mut kanban, Path::new("/x/a.txt"), TODO_KEY).unwrap();
        assert!(delete_task(&mut kanban, "a.txt"));
        assert!(!kanban.board.contains_task("a.txt"));
        assert!(!kanban.tasks.contains("a.txt"));
        assert!(kanban.attachments.is_empty());
        assert!(!delete_task(&mut kanban, "a.txt"));
    }

    // --- within-column reorder ---

    #[test]
    fn reorder_column_tasks_keeps_every_task() {
        let mut kanban = board_with(&[("a", TODO_KEY), ("b", TODO_KEY), ("c", TODO_KEY)]);
        reorder_column_tasks(&mut kanban, TODO_KEY, &strings(&["c", "c", "zzz", "a"])).unwrap();
        assert_eq!(kanban.board.tasks(TODO_KEY), strings(&["c", "a", "b"]));
        assert_eq!(
            reorder_column_tasks(&mut kanban, "nope", &[]),
            Err(KanbanError::UnknownColumn("nope".into()))
        );
    }

    // --- columns ---

    #[test]
    fn add_column_generates_unique_keys() {
        let mut kanban = Kanban::default();
        assert_eq!(add_column(&mut kanban, "Review", None, None).unwrap(), "review");
        assert_eq!(add_column(&mut kanban, "Review", None, None).unwrap(), "review_1");
        assert_eq!(add_column(&mut kanban, "  ", None, None), Err(KanbanError::EmptyTitle));
        assert!(kanban.board.tasks("review_1").is_empty());
        assert_eq!(
            kanban.board.keys().collect::<Vec<_>>(),
            vec![TODO_KEY, PROGRESS_KEY, DONE_KEY, "review", "review_1"]
        );
    }

    #[test]
    fn edit_column_keeps_key_and_reflags_tasks() {
        let mut kanban = board_with(&[("a", PROGRESS_KEY)]);
        edit_column(&mut kanban, PROGRESS_KEY, Some("Doing"), Some(Rgb(1, 2, 3)), None).unwrap();
        let col = kanban.column(PROGRESS_KEY).unwrap();
        assert_eq!(col.title, "Doing");
        assert_eq!(col.color, Rgb(1, 2, 3));

        edit_column(&mut kanban, PROGRESS_KEY, None, None, Some(true)).unwrap();
        assert_eq!(kanban.tasks.is_completed("a"), Some(true));
        assert_consistent(&kanban);

        assert_eq!(
            edit_column(&mut kanban, PROGRESS_KEY, Some(""), None, None),
            Err(KanbanError::EmptyTitle)
        );
    }

    #[test]
    fn delete_column_cascades() {
        let mut kanban = Kanban::default();
        let key = add_column(&mut kanban, "Review", None, None).unwrap();
        attach_file(&mut kanban, Path::new("/x/spec.md"), &key).unwrap();
        move_task(&mut kanban, "other", TODO_KEY).unwrap();

        let removed = delete_column(&mut kanban, &key).unwrap();
        assert_eq!(removed, strings(&["spec.md"]));
        assert!(kanban.column(&key).is_none());
        assert!(!kanban.tasks.contains("spec.md"));
        assert!(kanban.attachments.is_empty());
        assert!(kanban.tasks.contains("other"));
        assert_eq!(kanban.board.keys().count(), 3);
    }

    #[test]
    fn last_column_cannot_be_deleted() {
        let mut kanban = Kanban::default();
        delete_column(&mut kanban, TODO_KEY).unwrap();
        delete_column(&mut kanban, PROGRESS_KEY).unwrap();
        assert_eq!(delete_column(&mut kanban, DONE_KEY), Err(KanbanError::LastColumn));
        assert_eq!(
            delete_column(&mut kanban, "nope"),
            Err(KanbanError::UnknownColumn("nope".into()))
        );
    }

    #[test]
    fn reorder_columns_requires_permutation() {
        let mut kanban = Kanban::default();
        let before = kanban.clone();
        assert!(matches!(
            reorder_columns(&mut kanban, &strings(&[DONE_KEY, TODO_KEY])),
            Err(KanbanError::NotAPermutation(_))
        ));
        assert_eq!(kanban, before);

        reorder_columns(&mut kanban, &strings(&[DONE_KEY, TODO_KEY, PROGRESS_KEY])).unwrap();
        assert_eq!(kanban.column_keys(), strings(&[DONE_KEY, TODO_KEY, PROGRESS_KEY]));
        assert_eq!(
            kanban.board.keys().collect::<Vec<_>>(),
            vec![DONE_KEY, TODO_KEY, PROGRESS_KEY]
        );
    }

    #[test]
    fn shift_column_moves_one_place() {
        let mut kanban = Kanban::default();
        assert_eq!(shift_column(&mut kanban, DONE_KEY, -1), Ok(Some(1)));
        assert_eq!(kanban.column_keys(), strings(&[TODO_KEY, DONE_KEY, PROGRESS_KEY]));
        assert_eq!(shift_column(&mut kanban, TODO_KEY, -1), Ok(None));
    }
}
