use std::path::PathBuf;

use super::config::FocusConfig;
use super::kanban::Kanban;
use super::notes::Notes;
use super::player::Player;
use super::prefs::{BackgroundPref, LanguagePref, NoiseVolumes};

/// The whole application state, loaded from one data directory. Owned by
/// whichever surface is running and handed to `ops` by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub data_dir: PathBuf,
    pub config: FocusConfig,
    pub kanban: Kanban,
    pub notes: Notes,
    pub player: Player,
    pub noises: NoiseVolumes,
    pub language: LanguagePref,
    pub background: BackgroundPref,
}

impl Workspace {
    /// A fresh workspace with default documents
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Workspace {
            data_dir: data_dir.into(),
            config: FocusConfig::default(),
            kanban: Kanban::default(),
            notes: Notes::default(),
            player: Player::default(),
            noises: NoiseVolumes::new(),
            language: LanguagePref::default(),
            background: BackgroundPref::default(),
        }
    }

    /// Language in effect: the stored choice, else the configured default
    pub fn effective_language(&self) -> &str {
        self.language
            .language
            .as_deref()
            .unwrap_or(&self.config.ui.language)
    }
}
