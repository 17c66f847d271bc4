//! Integration tests for the `focus` CLI.
//!
//! Each test points `focus` at a temp data directory with `-D`, runs it as a
//! subprocess, and checks stdout and/or the JSON documents on disk.

use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

/// Run `focus -D <dir>` with the given args, returning (stdout, stderr, success).
fn run_focus(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_focus"))
        .arg("-D")
        .arg(dir)
        .args(args)
        .env_remove("FOCUS_DATA_DIR")
        .output()
        .expect("failed to run focus");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `focus` expecting success, return stdout.
fn run_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_focus(dir, args);
    if !success {
        panic!(
            "focus {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `focus` expecting failure, return stderr.
fn run_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_focus(dir, args);
    if success {
        panic!("focus {:?} should have failed:\nstdout: {}", args, stdout);
    }
    stderr
}

fn read_json(dir: &Path, file: &str) -> Value {
    let text = fs::read_to_string(dir.join(file)).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// A data directory with three tasks spread over the default columns.
fn seeded() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    run_ok(tmp.path(), &["init"]);
    run_ok(tmp.path(), &["add", "Buy milk", "--column", "todo"]);
    run_ok(tmp.path(), &["add", "Write report"]);
    run_ok(tmp.path(), &["add", "Call mom", "--column", "done"]);
    tmp
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_writes_documents() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_ok(tmp.path(), &["init"]);
    assert!(out.contains("Initialized focus"));
    for file in ["focus.toml", "tasks.json", "kanban.json", "kanban_columns.json"] {
        assert!(tmp.path().join(file).exists(), "{} missing", file);
    }

    let err = run_err(tmp.path(), &["init"]);
    assert!(err.contains("--force"));
    run_ok(tmp.path(), &["init", "--force"]);
}

#[test]
fn test_commands_work_without_init() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("fresh");
    run_ok(&dir, &["add", "first thing"]);
    let out = run_ok(&dir, &["tasks"]);
    assert_eq!(out, "[ ] first thing  (progress)\n");
}

// ---------------------------------------------------------------------------
// Tasks and board
// ---------------------------------------------------------------------------

#[test]
fn test_tasks_lists_in_todo_order() {
    let tmp = seeded();
    let out = run_ok(tmp.path(), &["tasks"]);
    assert_eq!(
        out,
        "[ ] Buy milk  (todo)\n[ ] Write report  (progress)\n[x] Call mom  (done)\n"
    );

    let pending = run_ok(tmp.path(), &["tasks", "--pending"]);
    assert!(!pending.contains("Call mom"));
    let done = run_ok(tmp.path(), &["tasks", "--done"]);
    assert_eq!(done, "[x] Call mom  (done)\n");
}

#[test]
fn test_board_text_and_json() {
    let tmp = seeded();
    let out = run_ok(tmp.path(), &["board"]);
    assert!(out.starts_with("To Do (todo) - 1\n  Buy milk\n"));
    assert!(out.contains("Done (done) * - 1"));

    let json: Value = serde_json::from_str(&run_ok(tmp.path(), &["board", "--json"])).unwrap();
    let columns = json.as_array().unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1]["key"], "progress");
    assert_eq!(columns[1]["tasks"][0], "Write report");
}

#[test]
fn test_done_and_undone_move_between_columns() {
    let tmp = seeded();
    let out = run_ok(tmp.path(), &["done", "Buy milk"]);
    assert_eq!(out, "done \"Buy milk\" -> done\n");
    let tasks = read_json(tmp.path(), "tasks.json");
    let milk = tasks
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["text"] == "Buy milk")
        .unwrap();
    assert_eq!(milk["completed"], true);

    let out = run_ok(tmp.path(), &["undone", "Buy milk"]);
    assert_eq!(out, "reopened \"Buy milk\" -> progress\n");
}

#[test]
fn test_mv_requires_known_task_and_column() {
    let tmp = seeded();
    run_ok(tmp.path(), &["mv", "Buy milk", "progress"]);
    let board = read_json(tmp.path(), "kanban.json");
    assert_eq!(board["progress"][1], "Buy milk");
    assert_eq!(board["todo"].as_array().unwrap().len(), 0);

    assert!(run_err(tmp.path(), &["mv", "nope", "todo"]).contains("task not found"));
    assert!(run_err(tmp.path(), &["mv", "Buy milk", "nowhere"]).contains("no such column"));
}

#[test]
fn test_rm_deletes_everywhere() {
    let tmp = seeded();
    run_ok(tmp.path(), &["rm", "Write report"]);
    let out = run_ok(tmp.path(), &["tasks"]);
    assert!(!out.contains("Write report"));
    assert!(run_err(tmp.path(), &["rm", "Write report"]).contains("task not found"));
}

#[test]
fn test_sort_reorders_one_column() {
    let tmp = seeded();
    run_ok(tmp.path(), &["add", "Second", "--column", "todo"]);
    run_ok(tmp.path(), &["sort", "todo", "Second", "Buy milk"]);
    let board = read_json(tmp.path(), "kanban.json");
    assert_eq!(board["todo"], serde_json::json!(["Second", "Buy milk"]));

    assert!(run_err(tmp.path(), &["sort", "todo", "Call mom"]).contains("not in column"));
}

#[test]
fn test_attach_creates_a_card() {
    let tmp = seeded();
    let file = tmp.path().join("plan.pdf");
    fs::write(&file, b"%PDF").unwrap();
    let out = run_ok(tmp.path(), &["attach", file.to_str().unwrap()]);
    assert_eq!(out, "attached \"plan.pdf\" -> todo\n");
    let tasks = run_ok(tmp.path(), &["tasks", "--column", "todo"]);
    assert!(tasks.contains("plan.pdf  (todo)  +file"));
}

#[test]
fn test_search_covers_tasks_and_notes() {
    let tmp = seeded();
    run_ok(tmp.path(), &["notes", "add", "milk is in the fridge"]);
    let out = run_ok(tmp.path(), &["search", "(?i)milk"]);
    assert!(out.contains("Buy milk"));
    assert!(out.contains("note:1"));
    assert!(run_err(tmp.path(), &["search", "("]).contains("invalid regex"));
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[test]
fn test_column_lifecycle() {
    let tmp = seeded();
    let key = run_ok(tmp.path(), &["column", "add", "Waiting On", "--color", "#ff8800"]);
    assert_eq!(key.trim(), "waitingon");

    run_ok(tmp.path(), &["column", "up", "waitingon"]);
    let columns = read_json(tmp.path(), "kanban_columns.json");
    assert_eq!(columns[2]["key"], "waitingon");

    run_ok(tmp.path(), &["column", "edit", "waitingon", "--title", "Blocked"]);
    let list = run_ok(tmp.path(), &["column", "list"]);
    assert!(list.contains("Blocked"));

    run_ok(tmp.path(), &["mv", "Buy milk", "waitingon"]);
    let err = run_err(tmp.path(), &["column", "rm", "waitingon"]);
    assert!(err.contains("--force"));
    run_ok(tmp.path(), &["column", "rm", "waitingon", "--force"]);
    assert!(!run_ok(tmp.path(), &["tasks"]).contains("Buy milk"));

    // The deleted task is kept in the recovery log
    let log = run_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("Buy milk"));
}

#[test]
fn test_column_rm_failed_save_logs_no_deletion() {
    let tmp = seeded();
    fs::remove_file(tmp.path().join("tasks.json")).unwrap();
    fs::create_dir(tmp.path().join("tasks.json")).unwrap();

    let err = run_err(tmp.path(), &["column", "rm", "todo", "--force"]);
    assert!(err.contains("error:"));
    let log = run_ok(tmp.path(), &["recovery"]);
    assert!(!log.contains("column todo deleted"));
    assert!(log.contains("tasks.json not saved"));
}

#[test]
fn test_column_completes_flag_reflags_tasks() {
    let tmp = seeded();
    run_ok(tmp.path(), &["column", "edit", "progress", "--completes", "true"]);
    let out = run_ok(tmp.path(), &["tasks", "--column", "progress"]);
    assert_eq!(out, "[x] Write report  (progress)\n");
}

#[test]
fn test_column_order_must_be_permutation() {
    let tmp = seeded();
    run_ok(tmp.path(), &["column", "order", "done", "progress", "todo"]);
    let board = run_ok(tmp.path(), &["board"]);
    assert!(board.starts_with("Done (done)"));
    run_err(tmp.path(), &["column", "order", "done", "todo"]);
}

// ---------------------------------------------------------------------------
// Playlist, notes, preferences
// ---------------------------------------------------------------------------

#[test]
fn test_playlist_add_select_and_step() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_ok(tmp.path(), &["init"]);
    let music = tmp.path().join("music");
    for name in ["a_side.mp3", "b_side.ogg"] {
        fs::write(music.join(name), b"").unwrap();
    }
    fs::write(music.join("cover.txt"), b"").unwrap();

    let a = music.join("a_side.mp3");
    let b = music.join("b_side.ogg");
    run_ok(tmp.path(), &["playlist", "add", a.to_str().unwrap()]);
    run_ok(tmp.path(), &["playlist", "add", b.to_str().unwrap()]);
    let dup = run_ok(tmp.path(), &["playlist", "add", a.to_str().unwrap()]);
    assert!(dup.contains("already in the playlist"));
    let err = run_err(tmp.path(), &["playlist", "add", music.join("cover.txt").to_str().unwrap()]);
    assert!(err.contains("not a music file"));

    assert_eq!(run_ok(tmp.path(), &["playlist", "next"]), "> b side\n");
    assert_eq!(run_ok(tmp.path(), &["playlist", "next"]), "> a side\n");
    run_ok(tmp.path(), &["playlist", "select", b.to_str().unwrap()]);

    let json: Value =
        serde_json::from_str(&run_ok(tmp.path(), &["playlist", "--json"])).unwrap();
    assert_eq!(json[1]["current"], true);

    let library = run_ok(tmp.path(), &["library"]);
    assert_eq!(library.lines().count(), 2);
    assert!(library.lines().all(|l| l.starts_with('+')));
}

#[test]
fn test_notes_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_ok(tmp.path(), &["notes", "set", "first\n\nsecond"]);
    run_ok(tmp.path(), &["notes", "add", "third"]);
    assert_eq!(run_ok(tmp.path(), &["notes"]), "first\nsecond\nthird\n");
    run_ok(tmp.path(), &["notes", "clear"]);
    assert_eq!(run_ok(tmp.path(), &["notes"]), "");
}

#[test]
fn test_noise_volume_is_clamped() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(run_ok(tmp.path(), &["noise", "set", "rain", "150"]), "rain 100\n");
    assert_eq!(run_ok(tmp.path(), &["noise", "set", "fire", "-5"]), "fire 0\n");
    assert!(run_err(tmp.path(), &["noise", "set", "thunder", "5"]).contains("thunder"));
    let list = run_ok(tmp.path(), &["noise"]);
    assert!(list.contains("rain") && list.contains("100"));
}

#[test]
fn test_language_choice() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(run_ok(tmp.path(), &["lang"]), "en\n");
    assert_eq!(run_ok(tmp.path(), &["lang", "ja"]), "ja\n");
    assert_eq!(run_ok(tmp.path(), &["lang"]), "ja\n");
    run_err(tmp.path(), &["lang", "tlh"]);
}

#[test]
fn test_background_cycles() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_ok(tmp.path(), &["init"]);
    let bg = tmp.path().join("background");
    fs::write(bg.join("a.png"), b"").unwrap();
    fs::write(bg.join("b.jpg"), b"").unwrap();

    let first = run_ok(tmp.path(), &["bg", "next"]);
    let second = run_ok(tmp.path(), &["bg", "next"]);
    assert_ne!(first, second);
    let list = run_ok(tmp.path(), &["bg"]);
    assert_eq!(list.lines().filter(|l| l.starts_with('>')).count(), 1);
}

#[test]
fn test_timer_config_keeps_comments() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_ok(tmp.path(), &["init"]);
    assert_eq!(run_ok(tmp.path(), &["timer"]), "work 25 min, break 5 min\n");
    run_ok(tmp.path(), &["config", "timer", "--work", "50", "--break", "10"]);
    assert_eq!(run_ok(tmp.path(), &["timer"]), "work 50 min, break 10 min\n");
    let toml = fs::read_to_string(tmp.path().join("focus.toml")).unwrap();
    assert!(toml.contains("# focus configuration"));
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[test]
fn test_check_and_fix() {
    let tmp = seeded();
    assert!(run_ok(tmp.path(), &["check"]).contains("board is consistent"));

    // Hand-edit the board so a task sits in two columns
    fs::write(
        tmp.path().join("kanban.json"),
        r#"{"todo": ["Buy milk"], "progress": ["Write report", "Buy milk"], "done": ["Call mom"]}"#,
    )
    .unwrap();
    let out = run_ok(tmp.path(), &["check"]);
    assert!(out.contains("\"Buy milk\" is placed in: todo, progress"));

    run_ok(tmp.path(), &["check", "--fix"]);
    assert!(run_ok(tmp.path(), &["check"]).contains("board is consistent"));
}

#[test]
fn test_recovery_prune() {
    let tmp = seeded();
    run_ok(tmp.path(), &["init", "--force"]);
    let log = run_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("tasks cleared by init --force"));
    let out = run_ok(tmp.path(), &["recovery", "prune", "--all"]);
    assert_eq!(out, "pruned 1 entry\n");
    assert_eq!(run_ok(tmp.path(), &["recovery"]), "recovery log is empty\n");
}
