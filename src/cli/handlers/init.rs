use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::paths::abbreviate_path;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry, atomic_write};
use crate::io::store::Store;
use crate::io::workspace_io;
use crate::model::workspace::Workspace;

pub const FOCUS_TOML_TEMPLATE: &str = r##"# focus configuration
# Edit freely; `focus config timer --work 50 --break 10` keeps comments intact.

[timer]
work_minutes = 25
break_minutes = 5

[media]
# Relative paths resolve against the data directory
music_dir = "music"
music_extensions = ["ogg", "mp3", "wav"]
background_dir = "background"
background_extensions = ["mov", "mp4", "avi", "mkv", "jpg", "jpeg", "png", "bmp", "gif", "webp"]
# Ambient noise channels offered in the mixer
noises = ["tv", "fire", "wind", "rain"]

[ui]
language = "en"
languages = ["en", "ru", "zh", "ja", "es"]

# --- Colors ---
# Uncomment and edit to override the theme.
#
# [ui.colors]
# background = "#0C001B"
# text = "#A09BFE"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#5A5580"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# cyan = "#44DDFF"
"##;

pub fn cmd_init(args: InitArgs, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_io::config_path(data_dir);
    if config_path.exists() && !args.force {
        return Err(format!(
            "focus is already set up in {} (use --force to reset it)",
            abbreviate_path(data_dir)
        )
        .into());
    }

    fs::create_dir_all(data_dir)?;
    let _lock = FileLock::acquire_default(data_dir)?;

    // A forced reset wipes the board; keep its tasks in the recovery log.
    if args.force {
        let old = workspace_io::load_kanban(&Store::new(data_dir));
        if !old.tasks.is_empty() {
            let body: Vec<String> = old
                .tasks
                .iter()
                .map(|t| format!("[{}] {}", if t.completed { "x" } else { " " }, t.text))
                .collect();
            recovery::log_recovery(
                data_dir,
                RecoveryEntry::new(RecoveryCategory::Delete, "tasks cleared by init --force")
                    .field("Tasks", old.tasks.len().to_string())
                    .body(body.join("\n")),
            );
        }
    }

    let ws = Workspace::new(data_dir);
    for dir in [
        ws.config.media.music_path(data_dir),
        ws.config.media.background_path(data_dir),
    ] {
        fs::create_dir_all(dir)?;
    }
    atomic_write(&config_path, FOCUS_TOML_TEMPLATE.as_bytes())?;
    workspace_io::save_all(&ws)?;

    println!("Initialized focus in {}", abbreviate_path(data_dir));
    Ok(())
}
