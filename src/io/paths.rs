use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "FOCUS_DATA_DIR";

/// Resolve the data directory: explicit flag, then `$FOCUS_DATA_DIR`, then
/// `$XDG_DATA_HOME/focus`, then `~/.local/share/focus`.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    resolve_with(flag, |key| std::env::var(key).ok())
}

fn resolve_with(flag: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    let set = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);
    if let Some(dir) = set(DATA_DIR_ENV) {
        return dir;
    }
    let data_home = set("XDG_DATA_HOME").unwrap_or_else(|| {
        set("HOME")
            .unwrap_or_else(|| PathBuf::from("/"))
            .join(".local")
            .join("share")
    });
    data_home.join("focus")
}

/// Shorten a path under `$HOME` to `~/...` for display
pub fn abbreviate_path(path: &Path) -> String {
    if let Ok(home) = std::env::var("HOME")
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn flag_wins() {
        let env = env_of(&[(DATA_DIR_ENV, "/env")]);
        assert_eq!(resolve_with(Some(Path::new("/flag")), env), PathBuf::from("/flag"));
    }

    #[test]
    fn env_override_then_xdg_then_home() {
        let env = env_of(&[(DATA_DIR_ENV, "/env"), ("XDG_DATA_HOME", "/xdg")]);
        assert_eq!(resolve_with(None, env), PathBuf::from("/env"));

        let env = env_of(&[("XDG_DATA_HOME", "/xdg"), ("HOME", "/home/u")]);
        assert_eq!(resolve_with(None, env), PathBuf::from("/xdg/focus"));

        let env = env_of(&[("XDG_DATA_HOME", ""), ("HOME", "/home/u")]);
        assert_eq!(
            resolve_with(None, env),
            PathBuf::from("/home/u/.local/share/focus")
        );
    }
}
