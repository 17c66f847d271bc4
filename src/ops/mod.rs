pub mod ambient_ops;
pub mod check;
pub mod kanban_ops;
pub mod player_ops;
pub mod search;
