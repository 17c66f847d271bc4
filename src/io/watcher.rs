use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events written by this process within this window are treated as our own.
const OWN_WRITE_GRACE: Duration = Duration::from_millis(500);

/// Documents in the data directory changed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changed(pub Vec<PathBuf>);

/// Watches the data directory for documents rewritten by another process
/// (typically the CLI while the TUI is open).
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<Vec<PathBuf>>,
    quiet_until: Option<Instant>,
}

impl DataWatcher {
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root = data_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| p.starts_with(&root) && is_document(p))
                    .collect();
                if !relevant.is_empty() {
                    let _ = tx.send(relevant);
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;
        Ok(DataWatcher {
            _watcher: watcher,
            rx,
            quiet_until: None,
        })
    }

    /// Call right after saving so the echo of our own write is dropped.
    pub fn mark_own_write(&mut self) {
        self.quiet_until = Some(Instant::now() + OWN_WRITE_GRACE);
    }

    /// Drain queued events without blocking. Returns `None` when nothing
    /// foreign changed.
    pub fn poll(&mut self) -> Option<Changed> {
        let mut paths: Vec<PathBuf> = Vec::new();
        while let Ok(batch) = self.rx.try_recv() {
            for p in batch {
                if !paths.contains(&p) {
                    paths.push(p);
                }
            }
        }
        if paths.is_empty() {
            return None;
        }
        if self.quiet_until.is_some_and(|t| Instant::now() < t) {
            return None;
        }
        Some(Changed(paths))
    }
}

/// Documents and config count; dotfiles (.lock, .state.json, .recovery.log)
/// and editor/temp files do not.
fn is_document(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("toml")
    )
}
