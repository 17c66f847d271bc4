pub mod board;
pub mod column;
pub mod config;
pub mod kanban;
pub mod notes;
pub mod ordered;
pub mod player;
pub mod prefs;
pub mod task;
pub mod timer;
pub mod workspace;

pub use board::KanbanBoard;
pub use column::{KanbanColumn, Rgb};
pub use config::FocusConfig;
pub use kanban::Kanban;
pub use notes::Notes;
pub use ordered::{Identified, OrderedCollection};
pub use player::{PlayState, Player};
pub use task::{Task, TaskRegistry};
pub use timer::Pomodoro;
pub use workspace::Workspace;
