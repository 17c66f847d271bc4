use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Log size above which old entries are trimmed inline (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this many days are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

const FILE_HEADER: &str = "\
<!-- focus recovery log
     Data focus could not load or save normally ends up here:
     unreadable documents, failed saves, tasks removed with a column.
     View with: focus recovery
     Prune old entries: focus recovery prune -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A document could not be parsed; defaults were used
    Parser,
    /// A save failed; the body holds the content that was not written
    Write,
    /// Tasks removed as a side effect (column delete)
    Delete,
    /// Documents disagree with each other
    Conflict,
    /// A referenced file is gone
    Missing,
}

impl RecoveryCategory {
    const ALL: [RecoveryCategory; 5] = [
        RecoveryCategory::Parser,
        RecoveryCategory::Write,
        RecoveryCategory::Delete,
        RecoveryCategory::Conflict,
        RecoveryCategory::Missing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryCategory::Parser => "parser",
            RecoveryCategory::Write => "write",
            RecoveryCategory::Delete => "delete",
            RecoveryCategory::Conflict => "conflict",
            RecoveryCategory::Missing => "missing",
        }
    }

    pub fn parse_category(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Same record apart from the timestamp
    fn same_record(&self, other: &RecoveryEntry) -> bool {
        self.category == other.category
            && self.description == other.description
            && self.fields == other.fields
            && self.body.trim() == other.body.trim()
    }
}

pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` through a sibling temp file and a rename, so
/// readers only ever see the old or the new content.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut tmp = staged_write(path, content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `content` to a temp file next to `path` without replacing it yet.
/// Dropping the returned file discards it.
pub fn staged_write(path: &Path, content: &[u8]) -> io::Result<NamedTempFile> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_data()?;
    Ok(tmp)
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

const STAMP_FORMAT: chrono::SecondsFormat = chrono::SecondsFormat::Secs;

impl RecoveryEntry {
    /// Markdown block: `## <stamp> [category] description`, `Key: value`
    /// fields, then the body in a fence.
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp.to_rfc3339_opts(STAMP_FORMAT, true),
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push_str("\n```\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push_str("\n---\n");
        out
    }

    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }

    /// JSON shape for `focus recovery --json`
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(STAMP_FORMAT, true),
            "category": self.category.as_str(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append an entry. Failure to log is reported on stderr and otherwise ignored.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(data_dir, &entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

/// Append an entry unless the log already holds the same record. Used for
/// conditions found on load, which repeat on every read until repaired.
pub fn log_recovery_once(data_dir: &Path, entry: RecoveryEntry) {
    let content = std::fs::read_to_string(recovery_log_path(data_dir)).unwrap_or_default();
    if parse_entries(&content).iter().any(|e| e.same_record(&entry)) {
        return;
    }
    log_recovery(data_dir, entry);
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);
    let size = std::fs::metadata(&path).map(|m| m.len()).ok();
    if size.is_some_and(|len| len > MAX_LOG_SIZE) {
        try_inline_trim(&path);
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if size.unwrap_or(0) == 0 {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Drop entries past the prune age when the log has grown too large.
/// Skipped silently if another process holds the log.
fn try_inline_trim(path: &Path) {
    let Ok(file) = OpenOptions::new().read(true).write(true).open(path) else {
        return;
    };
    if !try_flock(&file) {
        return;
    }
    let mut content = String::new();
    if io::BufReader::new(&file).read_to_string(&mut content).is_err() {
        return;
    }
    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_entries_before(&content, &cutoff);
    if trimmed.len() < content.len()
        && let Ok(mut f) = File::create(path)
    {
        let _ = f.write_all(trimmed.as_bytes());
    }
}

#[cfg(unix)]
fn try_flock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> bool {
    true
}

/// A document failed to parse and its default was substituted. Logged once
/// per distinct content.
pub fn log_parse_failure(data_dir: &Path, file_name: &str, error: &str, raw: &str) {
    log_recovery_once(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Parser, format!("{} unreadable, using defaults", file_name))
            .field("Source", file_name)
            .field("Error", error)
            .body(raw),
    );
}

/// A save failed; keep what would have been written
pub fn log_write_failure(data_dir: &Path, file_name: &str, error: &str, content: &str) {
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Write, format!("{} not saved", file_name))
            .field("Target", file_name)
            .field("Error", error)
            .body(content),
    );
}

/// Tasks removed together with their column
pub fn log_column_deletion(data_dir: &Path, key: &str, title: &str, tasks: &[String]) {
    if tasks.is_empty() {
        return;
    }
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Delete, format!("column {} deleted", key))
            .field("Column", title)
            .field("Tasks", tasks.len().to_string())
            .body(tasks.join("\n")),
    );
}

/// A referenced file is gone. Logged once per path.
pub fn log_missing(data_dir: &Path, what: &str, path: &Path) {
    log_recovery_once(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Missing, format!("{} not found", what))
            .field("Path", path.display().to_string()),
    );
}

/// Documents disagree. Logged once per distinct set of details.
pub fn log_conflict(data_dir: &Path, description: &str, details: &[String]) {
    log_recovery_once(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Conflict, description).body(details.join("\n")),
    );
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Entries newest first, optionally limited and filtered by age.
pub fn read_recovery_entries(
    data_dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<RecoveryEntry> {
    let Ok(content) = std::fs::read_to_string(recovery_log_path(data_dir)) else {
        return Vec::new();
    };
    let mut entries = parse_entries(&content);
    if let Some(since) = since {
        entries.retain(|e| e.timestamp >= since);
    }
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut current: Option<RecoveryEntry> = None;
    let mut in_fence = false;

    for line in content.lines() {
        if in_fence {
            if line == "```" {
                in_fence = false;
            } else if let Some(entry) = current.as_mut() {
                if !entry.body.is_empty() {
                    entry.body.push('\n');
                }
                entry.body.push_str(line);
            }
            continue;
        }
        if let Some(header) = line.strip_prefix("## ") {
            entries.extend(current.take());
            current = parse_entry_header(header).map(|(timestamp, category, description)| {
                RecoveryEntry {
                    timestamp,
                    category,
                    description,
                    fields: Vec::new(),
                    body: String::new(),
                }
            });
            continue;
        }
        let Some(entry) = current.as_mut() else {
            continue;
        };
        if line == "---" {
            entries.extend(current.take());
        } else if line.starts_with("```") {
            in_fence = true;
        } else if let Some((key, value)) = line.trim().split_once(": ") {
            entry.fields.push((key.to_string(), value.to_string()));
        }
    }
    entries.extend(current);
    entries
}

/// `<stamp> [category] description`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (stamp, rest) = header.split_once(' ')?;
    let timestamp = DateTime::parse_from_rfc3339(stamp).ok()?.with_timezone(&Utc);
    let rest = rest.strip_prefix('[')?;
    let (category, description) = rest.split_once("] ")?;
    let category = RecoveryCategory::parse_category(category)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove entries older than `before` (default: the prune age), or all of
/// them. Returns how many were removed.
pub fn prune_recovery(
    data_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }

    let file = OpenOptions::new().read(true).write(true).open(&path)?;
    let mut locked = false;
    for _ in 0..10 {
        if try_flock(&file) {
            locked = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    if !locked {
        return Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "recovery log is in use, try again later",
        ));
    }

    let content = std::fs::read_to_string(&path)?;
    let before_count = parse_entries(&content).len();
    if all {
        std::fs::write(&path, FILE_HEADER)?;
        return Ok(before_count);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let trimmed = prune_entries_before(&content, &cutoff);
    let after_count = parse_entries(&trimmed).len();
    std::fs::write(&path, &trimmed)?;
    Ok(before_count - after_count)
}

/// Drop raw entry blocks stamped before `cutoff`, keeping the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut out = String::new();
    let mut block = String::new();
    let mut keep_block = true;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            out.push_str(line);
            out.push('\n');
            in_header = line != "---";
            continue;
        }
        if let Some(header) = line.strip_prefix("## ") {
            if keep_block {
                out.push_str(&block);
            }
            block.clear();
            keep_block = parse_entry_header(header).is_some_and(|(ts, _, _)| ts >= *cutoff);
        }
        block.push_str(line);
        block.push('\n');
    }
    if keep_block {
        out.push_str(&block);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use tempfile::TempDir;

    fn entry_at(days_ago: i64, category: RecoveryCategory, desc: &str) -> RecoveryEntry {
        let mut entry = RecoveryEntry::new(category, desc);
        entry.timestamp = Utc::now() - chrono::Duration::days(days_ago);
        entry
    }

    #[test]
    fn markdown_layout() {
        let md = RecoveryEntry::new(RecoveryCategory::Parser, "kanban.json unreadable")
            .field("Source", "kanban.json")
            .body("{not json")
            .to_markdown();
        assert!(md.contains("[parser] kanban.json unreadable"));
        assert!(md.contains("Source: kanban.json\n"));
        assert!(md.contains("```\n{not json\n```\n"));
        assert!(md.ends_with("---\n"));

        let bare = RecoveryEntry::new(RecoveryCategory::Missing, "track not found").to_markdown();
        assert!(!bare.contains("```"));
    }

    #[test]
    fn log_then_read_newest_first() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), RecoveryEntry::new(RecoveryCategory::Parser, "first"));
        log_recovery(tmp.path(), RecoveryEntry::new(RecoveryCategory::Write, "second"));

        let entries = read_recovery_entries(tmp.path(), None, None);
        let descs: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descs, vec!["second", "first"]);

        let content = std::fs::read_to_string(recovery_log_path(tmp.path())).unwrap();
        assert!(content.starts_with("<!-- focus recovery log"));
    }

    #[test]
    fn limit_keeps_most_recent() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            log_recovery(
                tmp.path(),
                RecoveryEntry::new(RecoveryCategory::Conflict, format!("entry{}", i)),
            );
        }
        let entries = read_recovery_entries(tmp.path(), Some(2), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "entry4");
        assert_eq!(entries[1].description, "entry3");
    }

    #[test]
    fn fields_and_body_survive_a_round_trip() {
        let tmp = TempDir::new().unwrap();
        log_write_failure(tmp.path(), "tasks.json", "Permission denied", "[\n  {\"text\": \"a\"}\n]");

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.category, RecoveryCategory::Write);
        assert_eq!(e.description, "tasks.json not saved");
        assert_eq!(
            e.fields,
            vec![
                ("Target".to_string(), "tasks.json".to_string()),
                ("Error".to_string(), "Permission denied".to_string()),
            ]
        );
        assert_eq!(e.body, "[\n  {\"text\": \"a\"}\n]");
    }

    #[test]
    fn column_deletion_skips_empty_columns() {
        let tmp = TempDir::new().unwrap();
        log_column_deletion(tmp.path(), "review", "Review", &[]);
        assert!(read_recovery_entries(tmp.path(), None, None).is_empty());

        log_column_deletion(tmp.path(), "review", "Review", &["a".into(), "b".into()]);
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries[0].category, RecoveryCategory::Delete);
        assert_eq!(entries[0].body, "a\nb");
    }

    #[test]
    fn repeated_load_findings_are_logged_once() {
        let tmp = TempDir::new().unwrap();
        let track = Path::new("/music/gone.mp3");
        log_missing(tmp.path(), "playlist track", track);
        log_missing(tmp.path(), "playlist track", track);
        log_conflict(tmp.path(), "board and to-do list disagree", &["a".into()]);
        log_conflict(tmp.path(), "board and to-do list disagree", &["a".into()]);
        assert_eq!(read_recovery_entries(tmp.path(), None, None).len(), 2);

        log_missing(tmp.path(), "playlist track", Path::new("/music/other.mp3"));
        log_conflict(tmp.path(), "board and to-do list disagree", &["a".into(), "b".into()]);
        assert_eq!(read_recovery_entries(tmp.path(), None, None).len(), 4);

        // raw document bodies usually end in a newline the log does not keep
        log_parse_failure(tmp.path(), "kanban.json", "expected value", "{oops\n");
        log_parse_failure(tmp.path(), "kanban.json", "expected value", "{oops\n");
        assert_eq!(read_recovery_entries(tmp.path(), None, None).len(), 5);
    }

    #[test]
    fn since_filters_by_timestamp() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), entry_at(10, RecoveryCategory::Parser, "older"));
        log_recovery(tmp.path(), entry_at(0, RecoveryCategory::Write, "newer"));
        let since = Utc::now() - chrono::Duration::days(5);
        let entries = read_recovery_entries(tmp.path(), None, Some(since));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "newer");
    }

    #[test]
    fn prune_by_age_and_all() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(prune_recovery(tmp.path(), None, true).unwrap(), 0);

        log_recovery(tmp.path(), entry_at(60, RecoveryCategory::Parser, "old"));
        log_recovery(tmp.path(), entry_at(0, RecoveryCategory::Write, "new"));

        assert_eq!(prune_recovery(tmp.path(), None, false).unwrap(), 1);
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new");

        assert_eq!(prune_recovery(tmp.path(), None, true).unwrap(), 1);
        assert!(read_recovery_entries(tmp.path(), None, None).is_empty());
    }

    #[test]
    fn header_parsing() {
        let (ts, cat, desc) =
            parse_entry_header("2026-02-10T14:32:05Z [delete] column review deleted").unwrap();
        assert_eq!(ts.year(), 2026);
        assert_eq!(cat, RecoveryCategory::Delete);
        assert_eq!(desc, "column review deleted");

        assert!(parse_entry_header("not a header").is_none());
        assert!(parse_entry_header("2026-02-10T14:32:05Z [bogus] x").is_none());
    }

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        atomic_write(&path, b"[]").unwrap();
        atomic_write(&path, b"[1]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1]");
    }

    #[test]
    fn to_json_shape() {
        let json = RecoveryEntry::new(RecoveryCategory::Missing, "track not found")
            .field("Path", "/m/a.mp3")
            .to_json();
        assert_eq!(json["category"], "missing");
        assert_eq!(json["fields"]["Path"], "/m/a.mp3");
        assert_eq!(json["body"], "");
    }
}
