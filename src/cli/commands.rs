use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "focus", about = concat!("focus v", env!("CARGO_PKG_VERSION"), " - board, to-do list, music and a pomodoro in one terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $FOCUS_DATA_DIR or ~/.local/share/focus)
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory with focus.toml and empty documents
    Init(InitArgs),
    /// List to-do tasks
    Tasks(TasksArgs),
    /// Show the kanban board
    Board,
    /// Search tasks, attachments and notes by regex
    Search(SearchArgs),
    /// Add a task (default column: progress)
    Add(AddArgs),
    /// Mark a task done (moves it to the completion column)
    Done(TextArg),
    /// Mark a task not done (moves it back to an active column)
    Undone(TextArg),
    /// Move a task to another column
    Mv(MvArgs),
    /// Delete a task from the board and the to-do list
    Rm(TextArg),
    /// Attach a file as a task
    Attach(AttachArgs),
    /// Reorder the tasks inside one column
    Sort(SortArgs),
    /// Column management
    Column(ColumnCmd),
    /// Playlist management
    Playlist(PlaylistCmd),
    /// List music files in the library directory
    Library,
    /// Show or edit the notes pad
    Notes(NotesCmd),
    /// Ambient noise volumes
    Noise(NoiseCmd),
    /// Show or set the interface language
    Lang(LangArgs),
    /// Background images and videos
    Bg(BgCmd),
    /// Show the pomodoro durations
    Timer,
    /// Edit focus.toml
    Config(ConfigCmd),
    /// Validate that the board and to-do list agree
    Check(CheckArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite focus.toml and reset every document
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TasksArgs {
    /// Only tasks placed in this column
    #[arg(long)]
    pub column: Option<String>,
    /// Only tasks not yet done
    #[arg(long, conflicts_with = "done")]
    pub pending: bool,
    /// Only completed tasks
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
}

#[derive(Args)]
pub struct TextArg {
    /// Task text (exact)
    pub text: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Column to add to
    #[arg(long)]
    pub column: Option<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task text (exact)
    pub text: String,
    /// Target column key
    pub column: String,
}

#[derive(Args)]
pub struct AttachArgs {
    /// File to attach; its file name becomes the task text
    pub path: PathBuf,
    /// Column to place it in
    #[arg(long, default_value = "todo")]
    pub column: String,
}

#[derive(Args)]
pub struct SortArgs {
    /// Column key
    pub column: String,
    /// Task texts in the new order; unlisted tasks keep their order after these
    #[arg(required = true)]
    pub texts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColumnCmd {
    #[command(subcommand)]
    pub action: Option<ColumnAction>,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// List columns (default)
    List,
    /// Add a column at the right end
    Add(ColumnAddArgs),
    /// Change a column's title, color or completion flag
    Edit(ColumnEditArgs),
    /// Delete a column and the tasks in it
    Rm(ColumnRmArgs),
    /// Set the full column order
    Order(ColumnOrderArgs),
    /// Move a column one place left
    Up(ColumnKeyArg),
    /// Move a column one place right
    Down(ColumnKeyArg),
}

#[derive(Args)]
pub struct ColumnAddArgs {
    /// Column title (the key is derived from it)
    pub title: String,
    /// Color as R,G,B or #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
    /// Tasks in this column count as done
    #[arg(long)]
    pub completes: bool,
}

#[derive(Args)]
pub struct ColumnEditArgs {
    /// Column key
    pub key: String,
    #[arg(long)]
    pub title: Option<String>,
    /// Color as R,G,B or #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
    /// Whether tasks in this column count as done
    #[arg(long)]
    pub completes: Option<bool>,
}

#[derive(Args)]
pub struct ColumnRmArgs {
    /// Column key
    pub key: String,
    /// Delete even if the column holds tasks
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ColumnOrderArgs {
    /// Every column key, in the new order
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Args)]
pub struct ColumnKeyArg {
    /// Column key
    pub key: String,
}

// ---------------------------------------------------------------------------
// Playlist
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PlaylistCmd {
    #[command(subcommand)]
    pub action: Option<PlaylistAction>,
}

#[derive(Subcommand)]
pub enum PlaylistAction {
    /// List tracks (default)
    List,
    /// Append a track
    Add(TrackArg),
    /// Remove a track
    Rm(TrackArg),
    /// Reorder tracks; unlisted tracks keep their order after these
    Order(PlaylistOrderArgs),
    /// Make a track current
    Select(TrackArg),
    /// Make the next track current
    Next,
    /// Make the previous track current
    Prev,
}

#[derive(Args)]
pub struct TrackArg {
    /// Track file path
    pub path: PathBuf,
}

#[derive(Args)]
pub struct PlaylistOrderArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Notes and preferences
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NotesCmd {
    #[command(subcommand)]
    pub action: Option<NotesAction>,
}

#[derive(Subcommand)]
pub enum NotesAction {
    /// Print the notes pad (default)
    Show,
    /// Replace the notes pad; blank lines are dropped
    Set(NoteTextArg),
    /// Append one line
    Add(NoteTextArg),
    /// Empty the notes pad
    Clear,
}

#[derive(Args)]
pub struct NoteTextArg {
    pub text: String,
}

#[derive(Args)]
pub struct NoiseCmd {
    #[command(subcommand)]
    pub action: Option<NoiseAction>,
}

#[derive(Subcommand)]
pub enum NoiseAction {
    /// List noise channels and volumes (default)
    List,
    /// Set a channel's volume (0-100)
    Set(NoiseSetArgs),
}

#[derive(Args)]
pub struct NoiseSetArgs {
    /// Noise name (see focus.toml [media] noises)
    pub name: String,
    /// Volume, clamped to 0-100
    #[arg(allow_negative_numbers = true)]
    pub volume: i64,
}

#[derive(Args)]
pub struct LangArgs {
    /// Language code to switch to (omit to show the current one)
    pub code: Option<String>,
}

#[derive(Args)]
pub struct BgCmd {
    #[command(subcommand)]
    pub action: Option<BgAction>,
}

#[derive(Subcommand)]
pub enum BgAction {
    /// List backgrounds (default)
    List,
    /// Switch to the next background
    Next,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set pomodoro durations in minutes
    Timer(ConfigTimerArgs),
}

#[derive(Args)]
pub struct ConfigTimerArgs {
    #[arg(long)]
    pub work: Option<u32>,
    #[arg(long = "break")]
    pub break_minutes: Option<u32>,
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CheckArgs {
    /// Repair what check reports
    #[arg(long)]
    pub fix: bool,
}

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
