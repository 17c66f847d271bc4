mod init;
mod media;
pub use init::cmd_init;

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::paths;
use crate::io::recovery;
use crate::io::store::{Document, Store};
use crate::io::workspace_io::{self, KANBAN_DOCUMENTS};
use crate::model::task::Task;
use crate::model::workspace::Workspace;
use crate::ops::kanban_ops::{self, KanbanError};
use crate::ops::{check, search};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = paths::resolve_data_dir(cli.data_dir.as_deref());
    let dir = dir.as_path();

    match cli.command {
        None => crate::tui::run(Some(dir)).map_err(Into::into),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, dir),

            // Read commands
            Commands::Tasks(args) => cmd_tasks(args, dir, json),
            Commands::Board => cmd_board(dir, json),
            Commands::Search(args) => cmd_search(args, dir, json),
            Commands::Check(args) => cmd_check(args, dir, json),
            Commands::Timer => cmd_timer(dir, json),

            // Task writes
            Commands::Add(args) => cmd_add(args, dir, json),
            Commands::Done(args) => cmd_set_done(args, dir, json, true),
            Commands::Undone(args) => cmd_set_done(args, dir, json, false),
            Commands::Mv(args) => cmd_mv(args, dir, json),
            Commands::Rm(args) => cmd_rm(args, dir),
            Commands::Attach(args) => cmd_attach(args, dir, json),
            Commands::Sort(args) => cmd_sort(args, dir),

            // Column management
            Commands::Column(args) => cmd_column(args, dir, json),

            // Media and preferences
            Commands::Playlist(args) => media::cmd_playlist(args, dir, json),
            Commands::Library => media::cmd_library(dir, json),
            Commands::Notes(args) => media::cmd_notes(args, dir, json),
            Commands::Noise(args) => media::cmd_noise(args, dir, json),
            Commands::Lang(args) => media::cmd_lang(args, dir, json),
            Commands::Bg(args) => media::cmd_bg(args, dir, json),

            // Maintenance
            Commands::Config(args) => cmd_config(args, dir),
            Commands::Recovery(args) => cmd_recovery(args, dir, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Lock the data directory, load every document, apply `f`, then write
/// `docs` as one unit. Nothing is written if `f` fails.
fn mutate<T>(
    dir: &Path,
    docs: &[Document],
    f: impl FnOnce(&mut Workspace) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    Store::new(dir).ensure_dir()?;
    let _lock = FileLock::acquire_default(dir)?;
    let mut ws = workspace_io::load_workspace(dir);
    let out = f(&mut ws)?;
    workspace_io::save_documents(&ws, docs)?;
    Ok(out)
}

fn require_task(ws: &Workspace, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    if ws.kanban.tasks.contains(text) || ws.kanban.board.contains_task(text) {
        Ok(())
    } else {
        Err(format!("task not found: {}", text).into())
    }
}

fn report_placement(placement: &kanban_ops::Placement, verb: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        print_json(placement)
    } else {
        println!("{} \"{}\" -> {}", verb, placement.text, placement.column);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_tasks(args: TasksArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace_io::load_workspace(dir);
    let kanban = &ws.kanban;

    // A column filter lists in board order; otherwise to-do list order.
    let tasks: Vec<&Task> = match &args.column {
        Some(key) => {
            if kanban.column(key).is_none() {
                return Err(KanbanError::UnknownColumn(key.clone()).into());
            }
            kanban
                .board
                .tasks(key)
                .iter()
                .filter_map(|text| kanban.tasks.get(text))
                .collect()
        }
        None => kanban.tasks.iter().collect(),
    };
    let tasks: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| !(args.pending && t.completed) && !(args.done && !t.completed))
        .collect();

    if json {
        let out: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(kanban, t)).collect();
        print_json(&out)
    } else {
        for task in tasks {
            println!("{}", format_task_line(kanban, task));
        }
        Ok(())
    }
}

fn cmd_board(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace_io::load_workspace(dir);
    if json {
        return print_json(&board_to_json(&ws.kanban));
    }
    for line in format_board(&ws.kanban) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let re = Regex::new(&args.pattern).map_err(|e| format!("invalid regex: {}", e))?;
    let ws = workspace_io::load_workspace(dir);
    let hits = search::search(&ws.kanban, &ws.notes, &re);
    if json {
        return print_json(&hits);
    }
    for hit in &hits {
        println!("{}", format_search_hit(hit));
    }
    Ok(())
}

fn cmd_timer(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(dir);
    if json {
        return print_json(&TimerJson {
            work_minutes: config.timer.work_minutes,
            break_minutes: config.timer.break_minutes,
        });
    }
    println!(
        "work {} min, break {} min",
        config.timer.work_minutes, config.timer.break_minutes
    );
    Ok(())
}

fn cmd_check(args: CheckArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if args.fix {
        let fixes = mutate(dir, &KANBAN_DOCUMENTS, |ws| Ok(check::fix_kanban(&mut ws.kanban)))?;
        if json {
            return print_json(&fixes);
        }
        if fixes.is_empty() {
            println!("nothing to fix");
        }
        for fix in &fixes {
            println!("  {}", fix);
        }
        return Ok(());
    }

    let ws = workspace_io::load_workspace(dir);
    let result = check::check_kanban(&ws.kanban);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.errors.is_empty() {
            println!("Errors:");
            for err in &result.errors {
                println!("  {}", err);
            }
        }
        if !result.warnings.is_empty() {
            if !result.errors.is_empty() {
                println!();
            }
            println!("Warnings:");
            for warn in &result.warnings {
                match warn {
                    check::CheckWarning::Unplaced { text, .. } => {
                        println!("  \"{}\" is on no column", text);
                    }
                    check::CheckWarning::DanglingAttachment { text } => {
                        println!("  attachment for vanished task \"{}\"", text);
                    }
                    check::CheckWarning::MissingFile { text, path } => {
                        println!("  \"{}\" points at missing file {}", text, path.display());
                    }
                }
            }
        }
        if result.valid {
            println!("✓ board is consistent");
        } else {
            println!("✗ board has errors (run `focus check --fix`)");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task write handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let placement = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        Ok(kanban_ops::add_task(&mut ws.kanban, &args.text, args.column.as_deref())?)
    })?;
    report_placement(&placement, "added", json)
}

fn cmd_set_done(args: TextArg, dir: &Path, json: bool, completed: bool) -> Result<(), Box<dyn std::error::Error>> {
    let placement = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        kanban_ops::toggle_task_completion(&mut ws.kanban, &args.text, completed)?
            .ok_or_else(|| format!("task not found: {}", args.text).into())
    })?;
    report_placement(&placement, if completed { "done" } else { "reopened" }, json)
}

fn cmd_mv(args: MvArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let placement = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        require_task(ws, &args.text)?;
        Ok(kanban_ops::move_task(&mut ws.kanban, &args.text, &args.column)?)
    })?;
    report_placement(&placement, "moved", json)
}

fn cmd_rm(args: TextArg, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        if kanban_ops::delete_task(&mut ws.kanban, &args.text) {
            Ok(())
        } else {
            Err(format!("task not found: {}", args.text).into())
        }
    })?;
    println!("deleted \"{}\"", args.text);
    Ok(())
}

fn cmd_attach(args: AttachArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = std::fs::canonicalize(&args.path)
        .map_err(|e| format!("cannot attach {}: {}", args.path.display(), e))?;
    let placement = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        Ok(kanban_ops::attach_file(&mut ws.kanban, &path, &args.column)?)
    })?;
    report_placement(&placement, "attached", json)
}

fn cmd_sort(args: SortArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        let placed = ws.kanban.board.tasks(&args.column);
        if let Some(stray) = args.texts.iter().find(|t| !placed.contains(t)) {
            if ws.kanban.column(&args.column).is_none() {
                return Err(KanbanError::UnknownColumn(args.column.clone()).into());
            }
            return Err(format!("\"{}\" is not in column {}", stray, args.column).into());
        }
        Ok(kanban_ops::reorder_column_tasks(&mut ws.kanban, &args.column, &args.texts)?)
    })
}

// ---------------------------------------------------------------------------
// Column handlers
// ---------------------------------------------------------------------------

fn cmd_column(args: ColumnCmd, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(ColumnAction::List) {
        ColumnAction::List => cmd_column_list(dir, json),
        ColumnAction::Add(args) => cmd_column_add(args, dir),
        ColumnAction::Edit(args) => cmd_column_edit(args, dir),
        ColumnAction::Rm(args) => cmd_column_rm(args, dir),
        ColumnAction::Order(args) => mutate(dir, &KANBAN_DOCUMENTS, |ws| {
            Ok(kanban_ops::reorder_columns(&mut ws.kanban, &args.keys)?)
        }),
        ColumnAction::Up(args) => cmd_column_shift(args, dir, -1),
        ColumnAction::Down(args) => cmd_column_shift(args, dir, 1),
    }
}

fn cmd_column_list(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace_io::load_workspace(dir);
    let kanban = &ws.kanban;
    if json {
        let out: Vec<ColumnJson> = kanban.columns.iter().map(|c| column_to_json(kanban, c)).collect();
        return print_json(&out);
    }
    for column in kanban.columns.iter() {
        println!("{}", format_column_line(kanban, column));
    }
    Ok(())
}

fn cmd_column_add(args: ColumnAddArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let color = args.color.as_deref().map(parse_color).transpose()?;
    let completes = args.completes.then_some(true);
    let key = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        Ok(kanban_ops::add_column(&mut ws.kanban, &args.title, color, completes)?)
    })?;
    println!("{}", key);
    Ok(())
}

fn cmd_column_edit(args: ColumnEditArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if args.title.is_none() && args.color.is_none() && args.completes.is_none() {
        return Err("nothing to change (use --title, --color or --completes)".into());
    }
    let color = args.color.as_deref().map(parse_color).transpose()?;
    mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        Ok(kanban_ops::edit_column(
            &mut ws.kanban,
            &args.key,
            args.title.as_deref(),
            color,
            args.completes,
        )?)
    })
}

fn cmd_column_rm(args: ColumnRmArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (title, removed) = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        let title = ws
            .kanban
            .column(&args.key)
            .map(|c| c.title.clone())
            .ok_or_else(|| KanbanError::UnknownColumn(args.key.clone()))?;
        let held = ws.kanban.column_len(&args.key);
        if held > 0 && !args.force {
            return Err(format!(
                "column {} holds {} task(s); use --force to delete them too",
                args.key, held
            )
            .into());
        }
        let removed = kanban_ops::delete_column(&mut ws.kanban, &args.key)?;
        Ok((title, removed))
    })?;
    recovery::log_column_deletion(dir, &args.key, &title, &removed);
    println!("deleted column {} ({} task(s) removed)", args.key, removed.len());
    Ok(())
}

fn cmd_column_shift(args: ColumnKeyArg, dir: &Path, delta: isize) -> Result<(), Box<dyn std::error::Error>> {
    let moved = mutate(dir, &KANBAN_DOCUMENTS, |ws| {
        Ok(kanban_ops::shift_column(&mut ws.kanban, &args.key, delta)?)
    })?;
    match moved {
        Some(index) => println!("{} is now column {}", args.key, index + 1),
        None => println!("{} is already at the edge", args.key),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        ConfigAction::Timer(args) => {
            if args.work.is_none() && args.break_minutes.is_none() {
                return Err("nothing to change (use --work and/or --break)".into());
            }
            Store::new(dir).ensure_dir()?;
            let _lock = FileLock::acquire_default(dir)?;
            let (_, mut doc) = config_io::read_config_doc(dir)?;
            config_io::set_timer(&mut doc, args.work, args.break_minutes)?;
            config_io::write_config(dir, &doc)?;
            let config = config_io::load_config(dir);
            println!(
                "work {} min, break {} min",
                config.timer.work_minutes, config.timer.break_minutes
            );
            Ok(())
        }
    }
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, Box<dyn std::error::Error>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e).into())
}

fn cmd_recovery(args: RecoveryCmd, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = prune.before.as_deref().map(parse_timestamp).transpose()?;
            let removed = recovery::prune_recovery(dir, before, prune.all)?;
            println!("pruned {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
            Ok(())
        }
        None => {
            let since = args.since.as_deref().map(parse_timestamp).transpose()?;
            let limit = args.limit.unwrap_or(10);
            let entries = recovery::read_recovery_entries(dir, Some(limit), since);
            if json {
                let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                return print_json(&out);
            }
            if entries.is_empty() {
                println!("recovery log is empty");
            }
            for entry in &entries {
                print!("{}", entry.to_display_markdown());
            }
            Ok(())
        }
    }
}
