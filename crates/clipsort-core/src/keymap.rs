// crates/clipsort-core/src/keymap.rs
//
// One validated dictionary from normalized key label to action, built once
// at configuration time. Dispatch is a plain map lookup — no inverse lookup
// through merged mappings, no last-write-wins.

use std::collections::HashMap;

use crate::commands::SessionCommand;
use crate::config::{ConfigError, SortConfig};

/// Canonical label for the space bar. Every other label is a single
/// uppercased character.
pub const SPACE_LABEL: &str = "Space";

/// What a key press resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PlayPause,
    Restart,
    Unsort,
    /// Sort the current video into the named destination folder.
    SortInto(String),
}

impl Action {
    pub fn to_command(&self) -> SessionCommand {
        match self {
            Action::PlayPause       => SessionCommand::PlayPause,
            Action::Restart         => SessionCommand::Restart,
            Action::Unsort          => SessionCommand::Unsort,
            Action::SortInto(name)  => SessionCommand::Sort(name.clone()),
        }
    }
}

/// Normalize a raw key label: a single character uppercases ("r" → "R"),
/// any spelling of "space" becomes `Space`. Returns None for anything else
/// (multi-character labels, empty strings, modifier names).
pub fn normalize_label(raw: &str) -> Option<String> {
    // A literal space character is checked before trimming eats it.
    if raw == " " {
        return Some(SPACE_LABEL.to_string());
    }
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("space") {
        return Some(SPACE_LABEL.to_string());
    }
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_uppercase().collect()),
        _               => None,
    }
}

/// Validated key label → action map for a whole session.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<String, Action>,
}

impl KeyBindings {
    /// Build the merged core + folder map, rejecting bad labels and
    /// duplicates with the action names involved.
    pub fn from_config(config: &SortConfig) -> Result<Self, ConfigError> {
        let mut map: HashMap<String, Action> = HashMap::new();
        let mut owner: HashMap<String, String> = HashMap::new();

        let mut bind = |raw: &str, action_name: &str, action: Action| -> Result<(), ConfigError> {
            let label = normalize_label(raw).ok_or_else(|| ConfigError::BadKeyLabel {
                action: action_name.to_string(),
                label:  raw.to_string(),
            })?;
            if let Some(first) = owner.get(&label) {
                return Err(ConfigError::DuplicateKey {
                    label,
                    first:  first.clone(),
                    second: action_name.to_string(),
                });
            }
            owner.insert(label.clone(), action_name.to_string());
            map.insert(label, action);
            Ok(())
        };

        let core = &config.core_buttons;
        bind(&core.play_pause, "play_pause", Action::PlayPause)?;
        bind(&core.restart,    "restart",    Action::Restart)?;
        bind(&core.unsort,     "unsort",     Action::Unsort)?;

        for (folder, key) in &config.folders_to_sort {
            bind(key, folder, Action::SortInto(folder.clone()))?;
        }

        Ok(Self { map })
    }

    /// Resolve a pressed key. `raw` is whatever the input layer reports —
    /// a typed character or `Space` — normalized here so "r" and "R" hit
    /// the same binding. Unrecognized keys resolve to None (ignored).
    pub fn resolve(&self, raw: &str) -> Option<&Action> {
        self.map.get(&normalize_label(raw)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortConfig;

    fn config() -> SortConfig {
        let mut cfg = SortConfig::default(); // Space / R / 0
        cfg.folders_to_sort.insert("major_seizure".into(), "1".into());
        cfg.folders_to_sort.insert("minor_seizure".into(), "2".into());
        cfg
    }

    #[test]
    fn normalizes_labels() {
        assert_eq!(normalize_label("space").as_deref(), Some("Space"));
        assert_eq!(normalize_label("SPACE").as_deref(), Some("Space"));
        assert_eq!(normalize_label(" ").as_deref(),     Some("Space"));
        assert_eq!(normalize_label("r").as_deref(),     Some("R"));
        assert_eq!(normalize_label(" 1 ").as_deref(),   Some("1"));
        assert_eq!(normalize_label(""), None);
        assert_eq!(normalize_label("shift"), None);
        assert_eq!(normalize_label("ab"), None);
    }

    #[test]
    fn resolves_core_and_folder_keys() {
        let bindings = KeyBindings::from_config(&config()).unwrap();
        assert_eq!(bindings.resolve("Space"), Some(&Action::PlayPause));
        assert_eq!(bindings.resolve("r"),     Some(&Action::Restart));
        assert_eq!(bindings.resolve("0"),     Some(&Action::Unsort));
        assert_eq!(
            bindings.resolve("1"),
            Some(&Action::SortInto("major_seizure".into()))
        );
        assert_eq!(bindings.resolve("x"), None);
    }

    #[test]
    fn dispatch_is_case_insensitive() {
        let bindings = KeyBindings::from_config(&config()).unwrap();
        assert_eq!(bindings.resolve("R"), bindings.resolve("r"));
    }

    #[test]
    fn duplicate_across_core_and_folders_is_rejected() {
        let mut cfg = config();
        cfg.folders_to_sort.insert("exclude".into(), "r".into()); // collides with restart
        let err = KeyBindings::from_config(&cfg).unwrap_err();
        match err {
            ConfigError::DuplicateKey { label, first, second } => {
                assert_eq!(label, "R");
                assert_eq!(first, "restart");
                assert_eq!(second, "exclude");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_between_folders_is_rejected() {
        let mut cfg = config();
        cfg.folders_to_sort.insert("night_nonseizure".into(), "1".into());
        assert!(matches!(
            KeyBindings::from_config(&cfg),
            Err(ConfigError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn actions_map_to_commands() {
        assert_eq!(Action::PlayPause.to_command(), SessionCommand::PlayPause);
        assert_eq!(
            Action::SortInto("exclude".into()).to_command(),
            SessionCommand::Sort("exclude".into())
        );
    }
}
