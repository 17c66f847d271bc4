use std::path::{Path, PathBuf};

use crate::io::config_io;
use crate::io::recovery;
use crate::io::store::{Batch, Document, Store, StoreError};
use crate::model::board::KanbanBoard;
use crate::model::column::{KanbanColumn, default_columns};
use crate::model::kanban::{Attachments, Kanban};
use crate::model::notes::Notes;
use crate::model::ordered::OrderedCollection;
use crate::model::player::{Player, PlayerState};
use crate::model::prefs::{BackgroundPref, LanguagePref, NoiseVolumes};
use crate::model::task::{Task, TaskRegistry};
use crate::model::workspace::Workspace;
use crate::ops::check;

/// Load every document in `data_dir`. Never fails: missing documents get
/// their defaults, malformed ones are logged and replaced in memory.
pub fn load_workspace(data_dir: &Path) -> Workspace {
    let store = Store::new(data_dir);
    Workspace {
        data_dir: data_dir.to_path_buf(),
        config: config_io::load_config(data_dir),
        kanban: load_kanban(&store),
        notes: store.load::<Notes>(Document::Notes).value,
        player: load_player(&store),
        noises: store.load::<NoiseVolumes>(Document::Noises).value,
        language: store.load::<LanguagePref>(Document::Language).value,
        background: store.load::<BackgroundPref>(Document::Background).value,
    }
}

/// Columns, board, to-do list and attachments.
pub fn load_kanban(store: &Store) -> Kanban {
    let columns: Vec<KanbanColumn> = store.load_or(Document::Columns, default_columns).value;
    let columns = if columns.is_empty() {
        default_columns()
    } else {
        columns
    };
    let mut kanban = Kanban::with_columns(columns);

    kanban.board = store.load::<KanbanBoard>(Document::Board).value;
    kanban.align_board();

    let raw_tasks: Vec<Task> = store.load(Document::Tasks).value;
    let (tasks, dropped) = TaskRegistry::from_tasks(raw_tasks);
    if !dropped.is_empty() {
        let details: Vec<String> = dropped
            .iter()
            .map(|t| format!("{} (completed: {})", t.text, t.completed))
            .collect();
        recovery::log_conflict(store.dir(), "duplicate to-do entries collapsed", &details);
    }
    kanban.tasks = tasks;

    kanban.attachments = store.load::<Attachments>(Document::Attachments).value;

    let errors: Vec<String> = check::check_kanban(&kanban)
        .errors
        .iter()
        .map(ToString::to_string)
        .collect();
    if !errors.is_empty() {
        recovery::log_conflict(store.dir(), "board and to-do list disagree (focus check --fix repairs)", &errors);
    }
    kanban
}

/// Playlist and player state. Tracks whose files are gone are dropped and
/// logged.
pub fn load_player(store: &Store) -> Player {
    let paths: Vec<PathBuf> = store.load(Document::Playlist).value;
    let (present, missing): (Vec<PathBuf>, Vec<PathBuf>) =
        paths.into_iter().partition(|p| p.exists());
    for path in &missing {
        recovery::log_missing(store.dir(), "playlist track", path);
    }
    let saved: PlayerState = store.load(Document::PlayerState).value;
    Player::restore(OrderedCollection::from_items(present), &saved)
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Add the current value of `doc` to a batch
pub fn stage(batch: &mut Batch, ws: &Workspace, doc: Document) -> Result<(), StoreError> {
    match doc {
        Document::Tasks => batch.add(doc, &ws.kanban.tasks)?,
        Document::Board => batch.add(doc, &ws.kanban.board)?,
        Document::Columns => batch.add(doc, &ws.kanban.columns)?,
        Document::Attachments => batch.add(doc, &ws.kanban.attachments)?,
        Document::Notes => batch.add(doc, &ws.notes)?,
        Document::Playlist => batch.add(doc, &ws.player.playlist)?,
        Document::PlayerState => batch.add(doc, &ws.player.saved_state())?,
        Document::Noises => batch.add(doc, &ws.noises)?,
        Document::Language => batch.add(doc, &ws.language)?,
        Document::Background => batch.add(doc, &ws.background)?,
    };
    Ok(())
}

/// Write the given documents as one unit
pub fn save_documents(ws: &Workspace, docs: &[Document]) -> Result<(), StoreError> {
    let store = Store::new(&ws.data_dir);
    store.ensure_dir()?;
    let mut batch = Batch::new();
    for doc in docs {
        stage(&mut batch, ws, *doc)?;
    }
    store.commit(&batch)
}

/// The four documents every kanban mutation touches
pub const KANBAN_DOCUMENTS: [Document; 4] = [
    Document::Tasks,
    Document::Board,
    Document::Columns,
    Document::Attachments,
];

pub fn save_kanban(ws: &Workspace) -> Result<(), StoreError> {
    save_documents(ws, &KANBAN_DOCUMENTS)
}

pub fn save_all(ws: &Workspace) -> Result<(), StoreError> {
    save_documents(ws, &Document::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::{RecoveryCategory, read_recovery_entries};
    use crate::model::column::{DONE_KEY, PROGRESS_KEY, TODO_KEY};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_directory_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let ws = load_workspace(tmp.path());
        assert_eq!(ws.kanban.column_keys(), vec![TODO_KEY, PROGRESS_KEY, DONE_KEY]);
        assert_eq!(ws.kanban.board.keys().count(), 3);
        assert!(ws.kanban.tasks.is_empty());
        assert!(ws.player.playlist.is_empty());
        assert_eq!(ws.player.playlist.current_index(), None);
        assert_eq!(ws.effective_language(), "en");
    }

    #[test]
    fn corrupt_columns_fall_back_to_builtins() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kanban_columns.json"), "[{\"key\": ").unwrap();
        fs::write(tmp.path().join("kanban.json"), "also broken").unwrap();

        let ws = load_workspace(tmp.path());
        assert_eq!(ws.kanban.column_keys(), vec![TODO_KEY, PROGRESS_KEY, DONE_KEY]);
        for key in [TODO_KEY, PROGRESS_KEY, DONE_KEY] {
            assert!(ws.kanban.board.tasks(key).is_empty());
        }
        let parser_entries = read_recovery_entries(tmp.path(), None, None)
            .into_iter()
            .filter(|e| e.category == RecoveryCategory::Parser)
            .count();
        assert_eq!(parser_entries, 2);
    }

    #[test]
    fn board_gets_sequences_for_added_columns() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("kanban_columns.json"),
            r#"[{"key":"todo","title":"To Do","color":[1,2,3]},{"key":"review","title":"Review","color":[4,5,6]}]"#,
        )
        .unwrap();
        fs::write(tmp.path().join("kanban.json"), r#"{"todo":["a"]}"#).unwrap();
        let ws = load_workspace(tmp.path());
        assert_eq!(ws.kanban.board.tasks("todo"), ["a".to_string()]);
        assert!(ws.kanban.board.tasks("review").is_empty());
        assert_eq!(ws.kanban.board.keys().collect::<Vec<_>>(), vec!["todo", "review"]);
    }

    #[test]
    fn duplicate_tasks_collapse_and_log() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("tasks.json"),
            r#"[{"text":"a","completed":false},{"text":"a","completed":true}]"#,
        )
        .unwrap();
        let ws = load_workspace(tmp.path());
        assert_eq!(ws.kanban.tasks.len(), 1);
        assert_eq!(ws.kanban.tasks.is_completed("a"), Some(false));
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries[0].category, RecoveryCategory::Conflict);
    }

    #[test]
    fn disagreeing_documents_are_logged_once() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kanban.json"), r#"{"todo":["x"],"done":["x","y"]}"#).unwrap();
        fs::write(tmp.path().join("tasks.json"), r#"[{"text":"y","completed":false}]"#).unwrap();

        let ws = load_workspace(tmp.path());
        assert_eq!(ws.kanban.tasks.is_completed("y"), Some(false));
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Conflict);
        assert_eq!(
            entries[0].body,
            [
                "[todo] \"x\" is not in the to-do list",
                "[done] \"y\" is marked not done",
                "\"x\" is placed in: todo, done",
            ]
            .join("\n")
        );

        load_workspace(tmp.path());
        assert_eq!(read_recovery_entries(tmp.path(), None, None).len(), 1);
    }

    #[test]
    fn playlist_drops_missing_files_and_restores_selection() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.mp3");
        let b = tmp.path().join("b.mp3");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();
        let gone = tmp.path().join("gone.mp3");
        fs::write(
            tmp.path().join("playlist.json"),
            serde_json::to_string(&vec![&a, &gone, &b]).unwrap(),
        )
        .unwrap();
        fs::write(
            tmp.path().join("player_state.json"),
            serde_json::to_string(&PlayerState {
                last_track: Some(b.clone()),
            })
            .unwrap(),
        )
        .unwrap();

        let ws = load_workspace(tmp.path());
        assert_eq!(ws.player.playlist.ids(), vec![a, b.clone()]);
        assert_eq!(ws.player.current_track(), Some(b.as_path()));
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Missing);
    }

    #[test]
    fn save_then_load_keeps_state() {
        let tmp = TempDir::new().unwrap();
        let mut ws = load_workspace(tmp.path());
        ws.kanban.tasks.upsert("Buy milk", true);
        ws.kanban.board.push(DONE_KEY, "Buy milk");
        ws.notes.push("remember");
        ws.noises.insert("rain".into(), 40);
        save_all(&ws).unwrap();

        for doc in Document::ALL {
            assert!(tmp.path().join(doc.file_name()).exists(), "{} missing", doc);
        }
        let back = load_workspace(tmp.path());
        assert_eq!(back, ws);
    }
}
