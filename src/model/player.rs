use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::ordered::OrderedCollection;

/// Error type for playback
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("track not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("audio output failed: {0}")]
    Output(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Persisted player state (player_state.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub last_track: Option<PathBuf>,
}

/// Playlist plus transport state. The playlist's selection is the current
/// track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub playlist: OrderedCollection<PathBuf>,
    pub state: PlayState,
    /// Seconds into the current track to resume from
    pub position: f64,
}

impl Player {
    /// Restore a player from its documents. `last_track` is re-selected if it
    /// is still in the playlist.
    pub fn restore(playlist: OrderedCollection<PathBuf>, saved: &PlayerState) -> Self {
        let mut player = Player {
            playlist,
            ..Default::default()
        };
        if let Some(last) = &saved.last_track {
            player.playlist.select(last);
        }
        player
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn current_track(&self) -> Option<&Path> {
        self.playlist.current().map(PathBuf::as_path)
    }

    /// The document stored in player_state.json
    pub fn saved_state(&self) -> PlayerState {
        PlayerState {
            last_track: self.playlist.current().cloned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Audio output
// ---------------------------------------------------------------------------

/// The audio backend. Decoding and mixing live behind this seam.
pub trait AudioOutput {
    /// Start playing `path` from `start` seconds.
    fn play(&mut self, path: &Path, start: f64) -> Result<(), PlayerError>;
    /// Pause and report the position reached, in seconds.
    fn pause(&mut self) -> f64;
    fn stop(&mut self);
    /// Fire a one-shot sound effect (e.g. `timer_end`).
    fn cue(&mut self, name: &str);
    /// Set the looping volume (0–100) of an ambient noise channel.
    fn set_channel_volume(&mut self, name: &str, volume: u8);
}

/// An output that plays nothing but keeps wall-clock position, so pause and
/// resume behave as they would with a real backend.
#[derive(Debug, Default)]
pub struct SilentOutput {
    started: Option<(Instant, f64)>,
    pub cues: Vec<String>,
}

impl AudioOutput for SilentOutput {
    fn play(&mut self, _path: &Path, start: f64) -> Result<(), PlayerError> {
        self.started = Some((Instant::now(), start));
        Ok(())
    }

    fn pause(&mut self) -> f64 {
        match self.started.take() {
            Some((at, offset)) => offset + at.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }

    fn stop(&mut self) {
        self.started = None;
    }

    fn cue(&mut self, name: &str) {
        self.cues.push(name.to_string());
    }

    fn set_channel_volume(&mut self, _name: &str, _volume: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_reselects_last_track() {
        let playlist = OrderedCollection::from_items(vec![
            PathBuf::from("/m/a.mp3"),
            PathBuf::from("/m/b.mp3"),
        ]);
        let player = Player::restore(
            playlist,
            &PlayerState {
                last_track: Some(PathBuf::from("/m/b.mp3")),
            },
        );
        assert_eq!(player.current_track(), Some(Path::new("/m/b.mp3")));
        assert_eq!(player.state, PlayState::Stopped);
    }

    #[test]
    fn restore_ignores_vanished_last_track() {
        let playlist = OrderedCollection::from_items(vec![PathBuf::from("/m/a.mp3")]);
        let player = Player::restore(
            playlist,
            &PlayerState {
                last_track: Some(PathBuf::from("/m/gone.mp3")),
            },
        );
        assert_eq!(player.current_track(), Some(Path::new("/m/a.mp3")));
    }

    #[test]
    fn player_state_document() {
        let empty: PlayerState = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.last_track, None);

        let player = Player::restore(
            OrderedCollection::from_items(vec![PathBuf::from("/m/a.mp3")]),
            &empty,
        );
        assert_eq!(
            serde_json::to_string(&player.saved_state()).unwrap(),
            r#"{"last_track":"/m/a.mp3"}"#
        );
    }

    #[test]
    fn silent_output_tracks_resume_offset() {
        let mut out = SilentOutput::default();
        out.play(Path::new("x"), 12.5).unwrap();
        assert!(out.pause() >= 12.5);
        assert_eq!(out.pause(), 0.0);
    }
}
