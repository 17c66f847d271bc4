use std::path::PathBuf;

use indexmap::IndexMap;

use super::board::KanbanBoard;
use super::column::{KanbanColumn, PROGRESS_KEY, TODO_KEY, default_columns};
use super::ordered::OrderedCollection;
use super::task::TaskRegistry;

/// Task text → path of the file that was dropped to create it
pub type Attachments = IndexMap<String, PathBuf>;

/// Everything the board/to-do reconciliation touches, kept together so the
/// two views can never be mutated separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Kanban {
    pub columns: OrderedCollection<KanbanColumn>,
    pub board: KanbanBoard,
    pub tasks: TaskRegistry,
    pub attachments: Attachments,
}

impl Default for Kanban {
    fn default() -> Self {
        Kanban::with_columns(default_columns())
    }
}

impl Kanban {
    /// A board with these columns, empty sequences and no tasks
    pub fn with_columns(columns: Vec<KanbanColumn>) -> Self {
        let columns = OrderedCollection::from_items(columns);
        let board = KanbanBoard::with_columns(columns.iter().map(|c| c.key.as_str()));
        Kanban {
            columns,
            board,
            tasks: TaskRegistry::default(),
            attachments: Attachments::new(),
        }
    }

    pub fn column(&self, key: &str) -> Option<&KanbanColumn> {
        self.columns.get(&key.to_string())
    }

    pub fn column_keys(&self) -> Vec<String> {
        self.columns.ids()
    }

    /// Make sure every defined column has a sequence and that the board's
    /// key order follows the column order.
    pub fn align_board(&mut self) {
        for col in self.columns.iter() {
            self.board.ensure_column(&col.key);
        }
        let order = self.column_keys();
        self.board.sort_columns_by(&order);
    }

    /// Where a task goes when it is checked off: the built-in `done` column
    /// if it still completes, else the first completion column.
    pub fn completion_target(&self) -> Option<&KanbanColumn> {
        self.column(super::column::DONE_KEY)
            .filter(|c| c.is_completion())
            .or_else(|| self.columns.iter().find(|c| c.is_completion()))
    }

    /// Where a task goes when it is unchecked or added from the to-do list:
    /// `progress`, else the first active column other than `todo`, else `todo`.
    pub fn reopen_target(&self) -> Option<&KanbanColumn> {
        let active = |c: &&KanbanColumn| !c.is_completion();
        self.column(PROGRESS_KEY)
            .filter(active)
            .or_else(|| {
                self.columns
                    .iter()
                    .filter(active)
                    .find(|c| c.key != TODO_KEY)
            })
            .or_else(|| self.column(TODO_KEY).filter(active))
    }

    /// Number of tasks placed in a column
    pub fn column_len(&self, key: &str) -> usize {
        self.board.tasks(key).len()
    }
}
