use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::model::kanban::Kanban;
use crate::model::notes::Notes;

/// What a search hit points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitTarget {
    Task {
        column: Option<String>,
        completed: bool,
    },
    /// 0-based line of the notes pad
    Note { line: usize },
    /// A task's attached file path
    Attachment { task: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub target: HitTarget,
    pub text: String,
    #[serde(skip)]
    pub spans: Vec<Range<usize>>,
}

fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search task texts, attachment paths and note lines. Tasks come in to-do
/// list order, then attachments, then notes.
pub fn search(kanban: &Kanban, notes: &Notes, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for task in kanban.tasks.iter() {
        let spans = find_matches(re, &task.text);
        if !spans.is_empty() {
            hits.push(SearchHit {
                target: HitTarget::Task {
                    column: kanban.board.column_of(&task.text).map(str::to_string),
                    completed: task.completed,
                },
                text: task.text.clone(),
                spans,
            });
        }
    }

    for (task, path) in &kanban.attachments {
        let shown = path.display().to_string();
        let spans = find_matches(re, &shown);
        if !spans.is_empty() {
            hits.push(SearchHit {
                target: HitTarget::Attachment { task: task.clone() },
                text: shown,
                spans,
            });
        }
    }

    for (line, note) in notes.lines.iter().enumerate() {
        let spans = find_matches(re, &note.content);
        if !spans.is_empty() {
            hits.push(SearchHit {
                target: HitTarget::Note { line },
                text: note.content.clone(),
                spans,
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::{DONE_KEY, TODO_KEY};
    use crate::ops::kanban_ops::{attach_file, move_task};
    use std::path::Path;

    #[test]
    fn finds_tasks_attachments_and_notes() {
        let mut kanban = Kanban::default();
        move_task(&mut kanban, "Buy milk", TODO_KEY).unwrap();
        move_task(&mut kanban, "Milk the cow", DONE_KEY).unwrap();
        move_task(&mut kanban, "Write report", TODO_KEY).unwrap();
        attach_file(&mut kanban, Path::new("/farm/milking.txt"), TODO_KEY).unwrap();
        let notes = Notes::from_text("oat milk is fine\nnothing here");

        let re = Regex::new("(?i)milk").unwrap();
        let hits = search(&kanban, &notes, &re);
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Buy milk", "Milk the cow", "milking.txt", "/farm/milking.txt", "oat milk is fine"]
        );
        assert_eq!(
            hits[1].target,
            HitTarget::Task {
                column: Some(DONE_KEY.into()),
                completed: true
            }
        );
        assert_eq!(hits[0].spans, vec![4..8]);
        assert_eq!(hits[4].target, HitTarget::Note { line: 0 });
    }

    #[test]
    fn no_matches() {
        let kanban = Kanban::default();
        let re = Regex::new("x").unwrap();
        assert!(search(&kanban, &Notes::default(), &re).is_empty());
    }
}
