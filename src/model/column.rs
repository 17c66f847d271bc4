use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ordered::Identified;

/// Built-in column keys
pub const TODO_KEY: &str = "todo";
pub const PROGRESS_KEY: &str = "progress";
pub const DONE_KEY: &str = "done";

/// An RGB color, persisted as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.0, c.1, c.2]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb(100, 100, 100)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse `r,g,b` or `#RRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format!("invalid color '{}': expected #RRGGBB", s));
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16)
                    .map_err(|_| format!("invalid color '{}': bad hex digits", s))
            };
            return Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("invalid color '{}': expected R,G,B", s));
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid color '{}': channels must be 0-255", s))?;
        }
        Ok(Rgb::from(channels))
    }
}

/// A column definition on the kanban board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanColumn {
    /// Stable identifier; the board document is keyed by it
    pub key: String,
    /// Display title
    pub title: String,
    #[serde(default)]
    pub color: Rgb,
    /// Whether tasks placed here count as completed. When absent, only the
    /// built-in `done` column completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completes: Option<bool>,
}

impl KanbanColumn {
    pub fn new(key: impl Into<String>, title: impl Into<String>, color: Rgb) -> Self {
        KanbanColumn {
            key: key.into(),
            title: title.into(),
            color,
            completes: None,
        }
    }

    /// True if a task in this column is completed
    pub fn is_completion(&self) -> bool {
        self.completes.unwrap_or(self.key == DONE_KEY)
    }
}

impl Identified for KanbanColumn {
    type Id = String;

    fn id(&self) -> &String {
        &self.key
    }
}

/// The three columns a fresh board starts with
pub fn default_columns() -> Vec<KanbanColumn> {
    vec![
        KanbanColumn::new(TODO_KEY, "To Do", Rgb(70, 130, 180)),
        KanbanColumn::new(PROGRESS_KEY, "In Progress", Rgb(255, 165, 0)),
        KanbanColumn::new(DONE_KEY, "Done", Rgb(50, 205, 50)),
    ]
}

/// Slug a column title into a key: lowercase alphanumerics and underscores,
/// `column` when nothing survives.
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();
    if slug.is_empty() {
        "column".to_string()
    } else {
        slug
    }
}

/// Generate a key for `title` that does not collide with `existing`,
/// suffixing `_1`, `_2`, … as needed.
pub fn unique_key<'a>(title: &str, existing: impl IntoIterator<Item = &'a str> + Clone) -> String {
    let base = slugify(title);
    let taken = |k: &str| existing.clone().into_iter().any(|e| e == k);
    if !taken(&base) {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{}_{}", base, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_keeps_alnum_and_underscore() {
        assert_eq!(slugify("Review"), "review");
        assert_eq!(slugify("Code Review!"), "codereview");
        assert_eq!(slugify("on_hold 2"), "on_hold2");
        assert_eq!(slugify("Отложено"), "отложено");
        assert_eq!(slugify("!!!"), "column");
    }

    #[test]
    fn unique_key_suffixes_collisions() {
        let existing = ["todo", "review", "review_1"];
        assert_eq!(unique_key("Blocked", existing.iter().copied()), "blocked");
        assert_eq!(unique_key("Review", existing.iter().copied()), "review_2");
        assert_eq!(unique_key("To Do", existing.iter().copied()), "todo_1");
    }

    #[test]
    fn completion_defaults_to_done_key() {
        let cols = default_columns();
        let flags: Vec<bool> = cols.iter().map(KanbanColumn::is_completion).collect();
        assert_eq!(flags, vec![false, false, true]);

        let mut archive = KanbanColumn::new("archive", "Archive", Rgb::default());
        assert!(!archive.is_completion());
        archive.completes = Some(true);
        assert!(archive.is_completion());
    }

    #[test]
    fn column_document_shape() {
        let json = r#"{"key":"todo","title":"To Do","color":[70,130,180]}"#;
        let col: KanbanColumn = serde_json::from_str(json).unwrap();
        assert_eq!(col.color, Rgb(70, 130, 180));
        assert_eq!(serde_json::to_string(&col).unwrap(), json);

        let no_color: KanbanColumn = serde_json::from_str(r#"{"key":"x","title":"X"}"#).unwrap();
        assert_eq!(no_color.color, Rgb(100, 100, 100));
    }

    #[test]
    fn parse_colors() {
        assert_eq!("200,50,50".parse::<Rgb>(), Ok(Rgb(200, 50, 50)));
        assert_eq!("#C83232".parse::<Rgb>(), Ok(Rgb(200, 50, 50)));
        assert!("300,0,0".parse::<Rgb>().is_err());
        assert!("1,2".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
    }
}
