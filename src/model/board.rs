use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column key → ordered task texts. Order inside a column is the display
/// order and is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KanbanBoard {
    columns: IndexMap<String, Vec<String>>,
}

impl KanbanBoard {
    /// An empty sequence for each key
    pub fn with_columns<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut board = KanbanBoard::default();
        for key in keys {
            board.ensure_column(key);
        }
        board
    }

    pub fn ensure_column(&mut self, key: &str) {
        if !self.columns.contains_key(key) {
            self.columns.insert(key.to_string(), Vec::new());
        }
    }

    /// Tasks in a column (empty if the column has no sequence)
    pub fn tasks(&self, key: &str) -> &[String] {
        self.columns.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tasks_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        self.columns.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Which column holds this text, if any (first match in board order)
    pub fn column_of(&self, text: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, tasks)| tasks.iter().any(|t| t == text))
            .map(|(k, _)| k.as_str())
    }

    pub fn contains_task(&self, text: &str) -> bool {
        self.column_of(text).is_some()
    }

    /// Remove every occurrence of `text` from every column.
    /// Returns how many entries were removed.
    pub fn remove_everywhere(&mut self, text: &str) -> usize {
        let mut removed = 0;
        for tasks in self.columns.values_mut() {
            let before = tasks.len();
            tasks.retain(|t| t != text);
            removed += before - tasks.len();
        }
        removed
    }

    /// Append `text` to the end of a column. Returns false if the column has
    /// no sequence.
    pub fn push(&mut self, key: &str, text: &str) -> bool {
        match self.columns.get_mut(key) {
            Some(tasks) => {
                tasks.push(text.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop a column's sequence, returning its tasks
    pub fn remove_column(&mut self, key: &str) -> Vec<String> {
        self.columns.shift_remove(key).unwrap_or_default()
    }

    /// Total number of entries across all columns
    pub fn task_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Rearrange the map so its keys follow `order`; keys not in `order`
    /// keep their relative order after the listed ones.
    pub fn sort_columns_by(&mut self, order: &[String]) {
        let rank = |k: &str| order.iter().position(|o| o == k).unwrap_or(order.len());
        self.columns.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));
    }
}
