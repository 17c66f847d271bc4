use serde::{Deserialize, Serialize};

/// One sticky-note line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
}

/// The notes document: one entry per non-blank line of the notes pad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notes {
    pub lines: Vec<Note>,
}

impl Notes {
    /// Split free text into notes, dropping blank lines
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Note {
                content: l.to_string(),
            })
            .collect();
        Notes { lines }
    }

    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|n| n.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn push(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        self.lines.push(Note {
            content: line.to_string(),
        });
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Note> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
