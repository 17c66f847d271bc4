use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::recovery::{self, atomic_write, staged_write};

/// The JSON documents kept in the data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Tasks,
    Board,
    Columns,
    Notes,
    Playlist,
    PlayerState,
    Noises,
    Language,
    Background,
    Attachments,
}

impl Document {
    pub const ALL: [Document; 10] = [
        Document::Tasks,
        Document::Board,
        Document::Columns,
        Document::Notes,
        Document::Playlist,
        Document::PlayerState,
        Document::Noises,
        Document::Language,
        Document::Background,
        Document::Attachments,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Document::Tasks => "tasks.json",
            Document::Board => "kanban.json",
            Document::Columns => "kanban_columns.json",
            Document::Notes => "notes.json",
            Document::Playlist => "playlist.json",
            Document::PlayerState => "player_state.json",
            Document::Noises => "noises.json",
            Document::Language => "language.json",
            Document::Background => "background.json",
            Document::Attachments => "file_paths.json",
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not serialize {doc}: {source}")]
    Serialize {
        doc: Document,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where a loaded value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File,
    Missing,
    /// The file exists but could not be read or parsed; the reason is kept
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub origin: Origin,
}

/// Serialized documents waiting to be written together
#[derive(Debug, Default)]
pub struct Batch {
    entries: Vec<(Document, String)>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` now; nothing touches the disk until commit.
    /// A later add of the same document replaces the earlier one.
    pub fn add<T: Serialize + ?Sized>(&mut self, doc: Document, value: &T) -> Result<&mut Self, StoreError> {
        let content = to_json(doc, value)?;
        self.entries.retain(|(d, _)| *d != doc);
        self.entries.push((doc, content));
        Ok(self)
    }

    pub fn documents(&self) -> impl Iterator<Item = Document> + '_ {
        self.entries.iter().map(|(d, _)| *d)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON documents in one directory. Malformed reads and failed writes are
/// recorded in the recovery log next to them.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, doc: Document) -> PathBuf {
        self.dir.join(doc.file_name())
    }

    pub fn exists(&self, doc: Document) -> bool {
        self.path(doc).exists()
    }

    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    pub fn load<T: DeserializeOwned + Default>(&self, doc: Document) -> Loaded<T> {
        self.load_or(doc, T::default)
    }

    /// Read and parse a document, substituting `default()` when it is missing
    /// or malformed. A malformed file is logged and left as it is.
    pub fn load_or<T: DeserializeOwned>(&self, doc: Document, default: impl FnOnce() -> T) -> Loaded<T> {
        let path = self.path(doc);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Loaded {
                    value: default(),
                    origin: Origin::Missing,
                };
            }
            Err(e) => {
                let reason = e.to_string();
                recovery::log_parse_failure(&self.dir, doc.file_name(), &reason, "");
                return Loaded {
                    value: default(),
                    origin: Origin::Malformed(reason),
                };
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Loaded {
                value,
                origin: Origin::File,
            },
            Err(e) => {
                let reason = e.to_string();
                recovery::log_parse_failure(&self.dir, doc.file_name(), &reason, &raw);
                Loaded {
                    value: default(),
                    origin: Origin::Malformed(reason),
                }
            }
        }
    }

    /// Overwrite one document.
    pub fn save<T: Serialize + ?Sized>(&self, doc: Document, value: &T) -> Result<(), StoreError> {
        let content = to_json(doc, value)?;
        let path = self.path(doc);
        atomic_write(&path, content.as_bytes()).map_err(|source| {
            recovery::log_write_failure(&self.dir, doc.file_name(), &source.to_string(), &content);
            StoreError::WriteError { path, source }
        })
    }

    /// Write every document of a batch. All temp files are written and synced
    /// before the first rename, so a failure while staging leaves every old
    /// document in place. A failed rename logs the documents not yet
    /// replaced.
    pub fn commit(&self, batch: &Batch) -> Result<(), StoreError> {
        let mut staged = Vec::with_capacity(batch.entries.len());
        for (doc, content) in &batch.entries {
            let path = self.path(*doc);
            match staged_write(&path, content.as_bytes()) {
                Ok(tmp) => staged.push((*doc, path, tmp)),
                Err(source) => {
                    for (doc, content) in &batch.entries {
                        recovery::log_write_failure(&self.dir, doc.file_name(), &source.to_string(), content);
                    }
                    return Err(StoreError::WriteError { path, source });
                }
            }
        }

        for (i, (_, path, tmp)) in staged.into_iter().enumerate() {
            if let Err(e) = tmp.persist(&path) {
                for (doc, content) in &batch.entries[i..] {
                    recovery::log_write_failure(&self.dir, doc.file_name(), &e.error.to_string(), content);
                }
                return Err(StoreError::WriteError {
                    path,
                    source: e.error,
                });
            }
        }
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(doc: Document, value: &T) -> Result<String, StoreError> {
    let mut content =
        serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize { doc, source })?;
    content.push('\n');
    Ok(content)
}
