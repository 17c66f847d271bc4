use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration from focus.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Default: see FOCUS_TOML_TEMPLATE in cli/handlers/init.rs
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    /// Default: see FOCUS_TOML_TEMPLATE in cli/handlers/init.rs
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Relative paths resolve against the data directory
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
    #[serde(default = "default_music_extensions")]
    pub music_extensions: Vec<String>,
    #[serde(default = "default_background_dir")]
    pub background_dir: PathBuf,
    #[serde(default = "default_background_extensions")]
    pub background_extensions: Vec<String>,
    /// Ambient noise channels offered in the mixer
    #[serde(default = "default_noises")]
    pub noises: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            music_dir: default_music_dir(),
            music_extensions: default_music_extensions(),
            background_dir: default_background_dir(),
            background_extensions: default_background_extensions(),
            noises: default_noises(),
        }
    }
}

impl MediaConfig {
    pub fn music_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.music_dir)
    }

    pub fn background_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.background_dir)
    }
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("music")
}

fn default_background_dir() -> PathBuf {
    PathBuf::from("background")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_music_extensions() -> Vec<String> {
    strings(&["ogg", "mp3", "wav"])
}

fn default_background_extensions() -> Vec<String> {
    strings(&[
        "mov", "mp4", "avi", "mkv", "jpg", "jpeg", "png", "bmp", "gif", "webp",
    ])
}

fn default_noises() -> Vec<String> {
    strings(&["tv", "fire", "wind", "rain"])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Theme overrides, "#RRGGBB" by theme slot name
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            language: default_language(),
            languages: default_languages(),
            colors: HashMap::new(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_languages() -> Vec<String> {
    strings(&["en", "ru", "zh", "ja", "es"])
}
