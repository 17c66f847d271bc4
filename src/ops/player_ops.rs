use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::player::{AudioOutput, PlayState, Player, PlayerError};

/// Longest track label before it is cut and suffixed with `...`
pub const LABEL_MAX_CHARS: usize = 30;

// ---------------------------------------------------------------------------
// Playlist edits
// ---------------------------------------------------------------------------

/// Append a track unless it is already listed.
pub fn add_track(player: &mut Player, path: &Path) -> bool {
    player.playlist.append(path.to_path_buf())
}

/// Remove a track. Removing the track that is playing stops playback.
pub fn remove_track(player: &mut Player, out: &mut dyn AudioOutput, path: &Path) -> Option<PathBuf> {
    let was_current = player.current_track() == Some(path);
    let removed = player.playlist.remove(&path.to_path_buf())?;
    if was_current {
        if player.state != PlayState::Stopped {
            out.stop();
        }
        player.state = PlayState::Stopped;
        player.position = 0.0;
    }
    Some(removed)
}

/// Apply the order a playlist drag produced; see
/// [`OrderedCollection::reorder`](crate::model::ordered::OrderedCollection::reorder).
/// If the current track changes, the output is stopped.
pub fn reorder_playlist(player: &mut Player, out: &mut dyn AudioOutput, order: &[PathBuf]) {
    let before = player.current_track().map(Path::to_path_buf);
    player.playlist.reorder(order);
    if player.current_track().map(Path::to_path_buf) != before {
        if player.state != PlayState::Stopped {
            out.stop();
        }
        player.state = PlayState::Stopped;
        player.position = 0.0;
    }
}

/// Make `path` current and start it. Returns false if it is not listed.
pub fn select_track(player: &mut Player, out: &mut dyn AudioOutput, path: &Path) -> Result<bool, PlayerError> {
    if !player.playlist.select(&path.to_path_buf()) {
        return Ok(false);
    }
    start_current(player, out)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Pause if playing, otherwise play the current track from where it was
/// paused. Nothing happens on an empty playlist. A missing file leaves the
/// state as it was and reports [`PlayerError::Missing`].
pub fn play_pause(player: &mut Player, out: &mut dyn AudioOutput) -> Result<PlayState, PlayerError> {
    let Some(path) = player.current_track().map(Path::to_path_buf) else {
        return Ok(player.state);
    };
    if player.is_playing() {
        player.position = out.pause();
        player.state = PlayState::Paused;
        return Ok(player.state);
    }
    if !path.exists() {
        return Err(PlayerError::Missing(path));
    }
    out.play(&path, player.position)?;
    player.state = PlayState::Playing;
    Ok(player.state)
}

/// Next track, wrapping to the first, played from the start.
pub fn next_track(player: &mut Player, out: &mut dyn AudioOutput) -> Result<(), PlayerError> {
    if player.playlist.select_next().is_none() {
        return Ok(());
    }
    start_current(player, out)
}

/// Previous track, wrapping to the last, played from the start.
pub fn prev_track(player: &mut Player, out: &mut dyn AudioOutput) -> Result<(), PlayerError> {
    if player.playlist.select_prev().is_none() {
        return Ok(());
    }
    start_current(player, out)
}

/// The output finished a track. Advance only if we were playing (a stop or
/// pause also ends the stream). Returns whether it advanced.
pub fn handle_track_end(player: &mut Player, out: &mut dyn AudioOutput) -> Result<bool, PlayerError> {
    if !player.is_playing() {
        return Ok(false);
    }
    next_track(player, out)?;
    Ok(true)
}

fn start_current(player: &mut Player, out: &mut dyn AudioOutput) -> Result<(), PlayerError> {
    player.position = 0.0;
    let Some(path) = player.current_track().map(Path::to_path_buf) else {
        return Ok(());
    };
    if !path.exists() {
        out.stop();
        player.state = PlayState::Stopped;
        return Err(PlayerError::Missing(path));
    }
    out.play(&path, 0.0)?;
    player.state = PlayState::Playing;
    Ok(())
}

// ---------------------------------------------------------------------------
// Labels and library
// ---------------------------------------------------------------------------

/// File stem with underscores as spaces, cut at 30 characters.
pub fn track_label(path: &Path) -> String {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default();
    if name.chars().count() > LABEL_MAX_CHARS {
        let cut: String = name.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    pub path: PathBuf,
    pub label: String,
    pub in_playlist: bool,
}

/// Files in `dir` with one of `extensions` (case-insensitive), sorted by
/// path. A missing directory is an empty library.
pub fn scan_library(dir: &Path, extensions: &[String], player: &Player) -> std::io::Result<Vec<LibraryEntry>> {
    let mut paths = list_media(dir, extensions)?;
    paths.sort();
    Ok(paths
        .into_iter()
        .map(|path| LibraryEntry {
            label: track_label(&path),
            in_playlist: player.playlist.contains(&path),
            path,
        })
        .collect())
}

/// Regular files in `dir` whose extension is in `extensions`
pub fn list_media(dir: &Path, extensions: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut found = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
        if matches && path.is_file() {
            found.push(path);
        }
    }
    Ok(found)
}
