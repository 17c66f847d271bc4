use std::path::PathBuf;

use crate::model::workspace::Workspace;
use crate::ops::player_ops::list_media;

/// Highest noise volume
pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefError {
    #[error("unknown noise '{0}' (configured: {1})")]
    UnknownNoise(String, String),
    #[error("unsupported language '{0}' (available: {1})")]
    UnknownLanguage(String, String),
}

// ---------------------------------------------------------------------------
// Noise mixer
// ---------------------------------------------------------------------------

/// Set a noise channel's volume, clamped to 0–100. Returns the stored value.
pub fn set_noise_volume(ws: &mut Workspace, name: &str, volume: i64) -> Result<u8, PrefError> {
    let noises = &ws.config.media.noises;
    if !noises.iter().any(|n| n == name) {
        return Err(PrefError::UnknownNoise(name.to_string(), noises.join(", ")));
    }
    let volume = volume.clamp(0, i64::from(MAX_VOLUME)) as u8;
    ws.noises.insert(name.to_string(), volume);
    Ok(volume)
}

/// Every configured noise with its volume (0 when never set)
pub fn noise_levels(ws: &Workspace) -> Vec<(String, u8)> {
    ws.config
        .media
        .noises
        .iter()
        .map(|n| (n.clone(), ws.noises.get(n).copied().unwrap_or(0)))
        .collect()
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

pub fn set_language(ws: &mut Workspace, code: &str) -> Result<(), PrefError> {
    let available = &ws.config.ui.languages;
    if !available.iter().any(|l| l == code) {
        return Err(PrefError::UnknownLanguage(code.to_string(), available.join(", ")));
    }
    ws.language.language = Some(code.to_string());
    Ok(())
}

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

/// Background files, sorted
pub fn list_backgrounds(ws: &Workspace) -> std::io::Result<Vec<PathBuf>> {
    let media = &ws.config.media;
    let mut found = list_media(&media.background_path(&ws.data_dir), &media.background_extensions)?;
    found.sort();
    Ok(found)
}

/// The stored background, ignored when its index is out of range
pub fn current_background<'a>(ws: &Workspace, backgrounds: &'a [PathBuf]) -> Option<&'a PathBuf> {
    ws.background.index.and_then(|i| backgrounds.get(i))
}

/// Step to the next background, wrapping. With no backgrounds the stored
/// index is cleared.
pub fn next_background(ws: &mut Workspace, backgrounds: &[PathBuf]) -> Option<usize> {
    if backgrounds.is_empty() {
        ws.background.index = None;
        return None;
    }
    let next = match ws.background.index {
        Some(i) if i < backgrounds.len() => (i + 1) % backgrounds.len(),
        _ => 0,
    };
    ws.background.index = Some(next);
    Some(next)
}
