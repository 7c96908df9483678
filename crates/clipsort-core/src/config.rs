// crates/clipsort-core/src/config.rs
//
// Configuration resolver. A session needs exactly three things: where the
// unsorted videos live, which keys drive the three core actions, and which
// destination folder each remaining key sorts into.
//
// Sourced from clipsort.toml (next to the executable, else in the current
// working directory); when no file exists the UI collects the same values
// through the first-run setup view and may persist them back here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::{normalize_label, KeyBindings};

/// File name looked up next to the executable, then in the working directory.
pub const CONFIG_FILE: &str = "clipsort.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("could not parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("unsorted-videos path does not exist: {}", .0.display())]
    MissingSourceDir(PathBuf),

    #[error("unsorted-videos path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid key label {label:?} for {action:?} — use a single character or \"Space\"")]
    BadKeyLabel { action: String, label: String },

    #[error("key {label:?} is bound to both {first:?} and {second:?}")]
    DuplicateKey { label: String, first: String, second: String },

    #[error("destination folder names must not be empty")]
    EmptyFolderName,
}

/// Key labels for the three fixed core actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreButtons {
    pub play_pause: String,
    pub restart:    String,
    pub unsort:     String,
}

impl Default for CoreButtons {
    fn default() -> Self {
        Self {
            play_pause: "Space".into(),
            restart:    "R".into(),
            unsort:     "0".into(),
        }
    }
}

/// Everything the session controller is constructed from.
///
/// `folders_to_sort` maps a destination folder's logical name (snake_case,
/// becomes a Title Cased directory on disk) to its key label. A BTreeMap
/// keeps the file round-trippable and the iteration order stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortConfig {
    pub unsorted_path:   PathBuf,
    pub core_buttons:    CoreButtons,
    pub folders_to_sort: BTreeMap<String, String>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            unsorted_path:   PathBuf::new(),
            core_buttons:    CoreButtons::default(),
            folders_to_sort: BTreeMap::new(),
        }
    }
}

impl SortConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize and write the config to `path` (the save-back of
    /// interactively entered settings).
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).expect("SortConfig serializes to TOML");
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Full validation: source directory, key-label shape, duplicate keys,
    /// folder names. Duplicate key labels are rejected here rather than
    /// resolved last-write-wins at dispatch time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.unsorted_path.exists() {
            return Err(ConfigError::MissingSourceDir(self.unsorted_path.clone()));
        }
        if !self.unsorted_path.is_dir() {
            return Err(ConfigError::NotADirectory(self.unsorted_path.clone()));
        }
        if self.folders_to_sort.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::EmptyFolderName);
        }
        // Building the bindings performs label normalization and duplicate
        // detection; the result is discarded here and rebuilt by the session.
        KeyBindings::from_config(self).map(|_| ())
    }

    /// Normalized key label for a core action, for button captions.
    pub fn core_label(&self, raw: &str) -> String {
        normalize_label(raw).unwrap_or_else(|| raw.to_string())
    }
}

/// Candidate config file locations, in priority order: the executable's
/// directory first (a packaged install), then the working directory
/// (a `cargo run` from a checkout).
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join(CONFIG_FILE));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let p = cwd.join(CONFIG_FILE);
        if !paths.contains(&p) {
            paths.push(p);
        }
    }
    paths
}

/// The path interactively entered settings are saved back to.
pub fn save_path() -> PathBuf {
    candidate_paths()
        .into_iter()
        .next()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Load the config file if one exists. `Ok(None)` means no file was found
/// (the caller falls back to the interactive setup view); any present but
/// unreadable/invalid file is an error, not a silent fallback.
pub fn load() -> Result<Option<SortConfig>, ConfigError> {
    for path in candidate_paths() {
        if !path.exists() {
            continue;
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        return SortConfig::from_toml(&path, &raw).map(Some);
    }
    Ok(None)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
unsorted_path = "/videos/unsorted"

[core_buttons]
play_pause = "Space"
restart    = "R"
unsort     = "0"

[folders_to_sort]
major_seizure = "1"
minor_seizure = "2"
exclude       = "9"
"#;

    #[test]
    fn parses_example_file() {
        let cfg = SortConfig::from_toml(Path::new("clipsort.toml"), EXAMPLE).unwrap();
        assert_eq!(cfg.unsorted_path, PathBuf::from("/videos/unsorted"));
        assert_eq!(cfg.core_buttons.play_pause, "Space");
        assert_eq!(cfg.folders_to_sort.len(), 3);
        assert_eq!(cfg.folders_to_sort["major_seizure"], "1");
    }

    #[test]
    fn core_buttons_default_to_space_r_zero() {
        let b = CoreButtons::default();
        assert_eq!((b.play_pause.as_str(), b.restart.as_str(), b.unsort.as_str()),
                   ("Space", "R", "0"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SortConfig::from_toml(Path::new("x"), EXAMPLE).unwrap();
        cfg.unsorted_path = dir.path().to_path_buf();

        let path = dir.path().join(CONFIG_FILE);
        cfg.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back = SortConfig::from_toml(&path, &raw).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn validate_rejects_missing_source_dir() {
        let mut cfg = SortConfig::default();
        cfg.unsorted_path = PathBuf::from("/definitely/not/a/real/dir");
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingSourceDir(_))));
    }

    #[test]
    fn validate_rejects_duplicate_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SortConfig::default();
        cfg.unsorted_path = dir.path().to_path_buf();
        // "0" collides with the default unsort binding.
        cfg.folders_to_sort.insert("exclude".into(), "0".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::DuplicateKey { .. })));
    }

    #[test]
    fn validate_rejects_bad_key_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SortConfig::default();
        cfg.unsorted_path = dir.path().to_path_buf();
        cfg.folders_to_sort.insert("exclude".into(), "shift".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::BadKeyLabel { .. })));
    }

    #[test]
    fn validate_rejects_empty_folder_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SortConfig::default();
        cfg.unsorted_path = dir.path().to_path_buf();
        cfg.folders_to_sort.insert("  ".into(), "1".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyFolderName)));
    }
}
