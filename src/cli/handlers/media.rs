use std::path::{Path, PathBuf};

use super::{mutate, print_json};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::recovery;
use crate::io::store::Document;
use crate::io::workspace_io;
use crate::model::player::{PlayerError, SilentOutput};
use crate::model::workspace::Workspace;
use crate::ops::{ambient_ops, player_ops};

const PLAYLIST_DOCUMENTS: [Document; 2] = [Document::Playlist, Document::PlayerState];

/// The CLI has no audio device; transport commands only move the selection.
fn transport<T>(
    ws: &mut Workspace,
    dir: &Path,
    f: impl FnOnce(&mut crate::model::player::Player, &mut SilentOutput) -> Result<T, PlayerError>,
) -> Result<T, Box<dyn std::error::Error>> {
    let mut out = SilentOutput::default();
    f(&mut ws.player, &mut out).map_err(|e| {
        if let PlayerError::Missing(path) = &e {
            recovery::log_missing(dir, "playlist track", path);
        }
        e.into()
    })
}

/// Canonical path when the file exists, else the path as given (so a
/// vanished track can still be removed)
fn track_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Playlist
// ---------------------------------------------------------------------------

pub(super) fn cmd_playlist(args: PlaylistCmd, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(PlaylistAction::List) {
        PlaylistAction::List => {
            let ws = workspace_io::load_workspace(dir);
            let playlist = &ws.player.playlist;
            let current = playlist.current_index();
            if json {
                return print_json(&playlist_to_json(playlist.as_slice(), current));
            }
            if playlist.is_empty() {
                println!("playlist is empty");
            }
            for (i, path) in playlist.iter().enumerate() {
                println!("{}", format_track_line(i, path, current == Some(i)));
            }
            Ok(())
        }
        PlaylistAction::Add(track) => {
            let path = std::fs::canonicalize(&track.path)
                .map_err(|e| format!("cannot add {}: {}", track.path.display(), e))?;
            let added = mutate(dir, &PLAYLIST_DOCUMENTS, |ws| {
                let exts = &ws.config.media.music_extensions;
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                if !exts.iter().any(|want| want.eq_ignore_ascii_case(ext)) {
                    return Err(format!("not a music file (expected one of: {})", exts.join(", ")).into());
                }
                Ok(player_ops::add_track(&mut ws.player, &path))
            })?;
            if added {
                println!("added {}", player_ops::track_label(&path));
            } else {
                println!("{} is already in the playlist", player_ops::track_label(&path));
            }
            Ok(())
        }
        PlaylistAction::Rm(track) => {
            let path = track_path(&track.path);
            mutate(dir, &PLAYLIST_DOCUMENTS, |ws| {
                let mut out = SilentOutput::default();
                player_ops::remove_track(&mut ws.player, &mut out, &path)
                    .map(|_| ())
                    .ok_or_else(|| format!("not in playlist: {}", path.display()).into())
            })?;
            println!("removed {}", player_ops::track_label(&path));
            Ok(())
        }
        PlaylistAction::Order(order) => {
            let paths: Vec<PathBuf> = order.paths.iter().map(|p| track_path(p)).collect();
            mutate(dir, &PLAYLIST_DOCUMENTS, |ws| {
                if let Some(stray) = paths.iter().find(|p| !ws.player.playlist.contains(p)) {
                    return Err(format!("not in playlist: {}", stray.display()).into());
                }
                transport(ws, dir, |player, out| {
                    player_ops::reorder_playlist(player, out, &paths);
                    Ok(())
                })
            })
        }
        PlaylistAction::Select(track) => {
            let path = track_path(&track.path);
            mutate(dir, &PLAYLIST_DOCUMENTS, |ws| {
                let found = transport(ws, dir, |player, out| player_ops::select_track(player, out, &path))?;
                if found {
                    Ok(())
                } else {
                    Err(format!("not in playlist: {}", path.display()).into())
                }
            })?;
            println!("> {}", player_ops::track_label(&path));
            Ok(())
        }
        PlaylistAction::Next => step(dir, player_ops::next_track),
        PlaylistAction::Prev => step(dir, player_ops::prev_track),
    }
}

fn step(
    dir: &Path,
    f: fn(&mut crate::model::player::Player, &mut dyn crate::model::player::AudioOutput) -> Result<(), PlayerError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let current = mutate(dir, &PLAYLIST_DOCUMENTS, |ws| {
        transport(ws, dir, |player, out| f(player, out))?;
        Ok(ws.player.current_track().map(Path::to_path_buf))
    })?;
    match current {
        Some(path) => println!("> {}", player_ops::track_label(&path)),
        None => println!("playlist is empty"),
    }
    Ok(())
}

pub(super) fn cmd_library(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace_io::load_workspace(dir);
    let media = &ws.config.media;
    let music_dir = media.music_path(dir);
    let entries = player_ops::scan_library(&music_dir, &media.music_extensions, &ws.player)?;
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("no music in {}", music_dir.display());
    }
    for entry in &entries {
        println!("{}", format_library_line(entry));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

pub(super) fn cmd_notes(args: NotesCmd, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(NotesAction::Show) {
        NotesAction::Show => {
            let ws = workspace_io::load_workspace(dir);
            if json {
                return print_json(&ws.notes);
            }
            if !ws.notes.is_empty() {
                println!("{}", ws.notes.to_text());
            }
            Ok(())
        }
        NotesAction::Set(note) => mutate(dir, &[Document::Notes], |ws| {
            ws.notes = crate::model::notes::Notes::from_text(&note.text);
            Ok(())
        }),
        NotesAction::Add(note) => mutate(dir, &[Document::Notes], |ws| {
            if ws.notes.push(&note.text) {
                Ok(())
            } else {
                Err("note line cannot be empty".into())
            }
        }),
        NotesAction::Clear => mutate(dir, &[Document::Notes], |ws| {
            ws.notes = Default::default();
            Ok(())
        }),
    }
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

pub(super) fn cmd_noise(args: NoiseCmd, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(NoiseAction::List) {
        NoiseAction::List => {
            let ws = workspace_io::load_workspace(dir);
            let levels = ambient_ops::noise_levels(&ws);
            if json {
                let out: Vec<NoiseJson> = levels
                    .into_iter()
                    .map(|(name, volume)| NoiseJson { name, volume })
                    .collect();
                return print_json(&out);
            }
            for (name, volume) in levels {
                println!("{:<8} {:>3}", name, volume);
            }
            Ok(())
        }
        NoiseAction::Set(set) => {
            let volume = mutate(dir, &[Document::Noises], |ws| {
                Ok(ambient_ops::set_noise_volume(ws, &set.name, set.volume)?)
            })?;
            println!("{} {}", set.name, volume);
            Ok(())
        }
    }
}

pub(super) fn cmd_lang(args: LangArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = match args.code {
        Some(code) => mutate(dir, &[Document::Language], |ws| {
            ambient_ops::set_language(ws, &code)?;
            Ok(ws.clone())
        })?,
        None => workspace_io::load_workspace(dir),
    };
    if json {
        return print_json(&serde_json::json!({
            "language": ws.effective_language(),
            "available": ws.config.ui.languages,
        }));
    }
    println!("{}", ws.effective_language());
    Ok(())
}

pub(super) fn cmd_bg(args: BgCmd, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(BgAction::List) {
        BgAction::List => {
            let ws = workspace_io::load_workspace(dir);
            let backgrounds = ambient_ops::list_backgrounds(&ws)?;
            let current = ambient_ops::current_background(&ws, &backgrounds);
            if json {
                let out: Vec<BackgroundJson> = backgrounds
                    .iter()
                    .enumerate()
                    .map(|(index, path)| BackgroundJson {
                        index,
                        path: path.clone(),
                        current: current == Some(path),
                    })
                    .collect();
                return print_json(&out);
            }
            for path in &backgrounds {
                let marker = if current == Some(path) { ">" } else { " " };
                println!("{} {}", marker, path.display());
            }
            Ok(())
        }
        BgAction::Next => {
            let chosen = mutate(dir, &[Document::Background], |ws| {
                let backgrounds = ambient_ops::list_backgrounds(ws)?;
                Ok(ambient_ops::next_background(ws, &backgrounds).map(|i| backgrounds[i].clone()))
            })?;
            match chosen {
                Some(path) => println!("> {}", path.display()),
                None => println!("no backgrounds found"),
            }
            Ok(())
        }
    }
}
