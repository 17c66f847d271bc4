use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::recovery;
use crate::model::config::FocusConfig;

pub const CONFIG_FILE: &str = "focus.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load focus.toml. A missing file gives the defaults; a malformed one is
/// logged and also gives the defaults.
pub fn load_config(data_dir: &Path) -> FocusConfig {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return FocusConfig::default(),
        Err(e) => {
            recovery::log_parse_failure(data_dir, CONFIG_FILE, &e.to_string(), "");
            return FocusConfig::default();
        }
    };
    match toml::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            recovery::log_parse_failure(data_dir, CONFIG_FILE, e.message(), &text);
            FocusConfig::default()
        }
    }
}

/// Read focus.toml as both the parsed config and an editable document.
/// An absent file reads as an empty document.
pub fn read_config_doc(data_dir: &Path) -> Result<(FocusConfig, toml_edit::DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    let config: FocusConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        message: e.message().to_string(),
    })?;
    let doc = text
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ConfigError::ParseError {
            path,
            message: e.message().to_string(),
        })?;
    Ok((config, doc))
}

/// Write the document back, keeping the user's comments and layout
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    recovery::atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|source| ConfigError::WriteError { path, source })
}

/// Set `[timer]` durations; `None` leaves a value alone
pub fn set_timer(
    doc: &mut toml_edit::DocumentMut,
    work_minutes: Option<u32>,
    break_minutes: Option<u32>,
) -> Result<(), ConfigError> {
    for (key, value) in [("work_minutes", work_minutes), ("break_minutes", break_minutes)] {
        if value == Some(0) {
            return Err(ConfigError::Invalid(format!("{} must be at least 1", key)));
        }
    }
    if !doc.contains_key("timer") {
        doc["timer"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if let Some(work) = work_minutes {
        doc["timer"]["work_minutes"] = toml_edit::value(i64::from(work));
    }
    if let Some(rest) = break_minutes {
        doc["timer"]["break_minutes"] = toml_edit::value(i64::from(rest));
    }
    Ok(())
}
