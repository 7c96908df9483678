// crates/clipsort-core/src/session.rs
//
// SortSession: the sorting state machine. Owns the pending queue, the
// current index, the undo stack and the folder map, and performs the
// filesystem moves itself. Playback is mirrored only as far as the sort
// precondition needs; the actual player lives in clipsort-media and is
// driven by the UI layer.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{CoreButtons, SortConfig};
use crate::keymap::{normalize_label, KeyBindings};

/// Recognized video extensions, matched case-insensitively.
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no video files found in the provided path")]
    NoVideos,

    #[error("you must play the video before sorting it")]
    NotPlayed,

    #[error("no videos to unsort")]
    NothingToUnsort,

    #[error("unknown destination folder: {0}")]
    UnknownFolder(String),

    #[error("failed to move {file}: {source}")]
    Move { file: String, source: std::io::Error },

    #[error("could not list {}: {source}", .dir.display())]
    Scan { dir: PathBuf, source: std::io::Error },

    #[error("could not create destination folder {}: {source}", .dir.display())]
    CreateFolder { dir: PathBuf, source: std::io::Error },
}

/// Mirror of the playback collaborator's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// One destination folder: logical name from the config, Title Cased
/// directory on disk, and the key that sorts into it.
#[derive(Debug, Clone)]
pub struct SortFolder {
    pub name:    String,
    pub display: String,
    pub key:     String,
    pub path:    PathBuf,
}

/// One successfully sorted video: where it came from and the directory it
/// was moved into. Popping this and moving the file back restores the
/// queue to the state it held before the corresponding sort.
#[derive(Debug, Clone)]
pub struct SortRecord {
    pub source:   PathBuf,
    pub dest_dir: PathBuf,
}

/// Result of a successful sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// More videos remain; the caller schedules the next load.
    NextQueued,
    /// The queue is empty — the session is over.
    Finished,
}

pub struct SortSession {
    source_dir:   PathBuf,
    queue:        Vec<String>,
    current:      usize,
    undo:         Vec<SortRecord>,
    folders:      Vec<SortFolder>,
    bindings:     KeyBindings,
    core_buttons: CoreButtons,

    /// Playback mirror, written by the UI as it drives the player.
    pub playback: PlaybackState,
    /// Whether the current clip has been started at least once — the sort
    /// precondition. Survives end-of-file; cleared when the current entry
    /// changes or playback is deliberately stopped for a move.
    pub clip_started: bool,
    /// Absolute path published as the status line after a load.
    pub loaded_path: Option<PathBuf>,
}

impl SortSession {
    /// Scan the source directory, build the folder map (creating each
    /// destination directory if absent), and validate the key bindings.
    /// An empty queue is fatal: the session never starts.
    pub fn new(config: SortConfig) -> Result<Self, SessionError> {
        let source_dir = config.unsorted_path.clone();
        let queue = scan_videos(&source_dir)?;
        if queue.is_empty() {
            return Err(SessionError::NoVideos);
        }

        let bindings = KeyBindings::from_config(&config)
            // Config was validated before the session is constructed.
            .expect("key bindings validated at config load");

        let mut folders = Vec::with_capacity(config.folders_to_sort.len());
        for (name, key) in &config.folders_to_sort {
            let display = display_name(name);
            let path = source_dir.join(&display);
            if !path.exists() {
                std::fs::create_dir_all(&path).map_err(|source| {
                    SessionError::CreateFolder { dir: path.clone(), source }
                })?;
            }
            folders.push(SortFolder {
                name:    name.clone(),
                display,
                key:     normalize_label(key).unwrap_or_else(|| key.clone()),
                path,
            });
        }

        let core_buttons = CoreButtons {
            play_pause: config.core_label(&config.core_buttons.play_pause),
            restart:    config.core_label(&config.core_buttons.restart),
            unsort:     config.core_label(&config.core_buttons.unsort),
        };

        Ok(Self {
            source_dir,
            queue,
            current: 0,
            undo: Vec::new(),
            folders,
            bindings,
            core_buttons,
            playback:     PlaybackState::Stopped,
            clip_started: false,
            loaded_path:  None,
        })
    }

    // ── Read-only views ──────────────────────────────────────────────────────

    pub fn source_dir(&self) -> &Path          { &self.source_dir }
    pub fn queue(&self) -> &[String]           { &self.queue }
    pub fn current_index(&self) -> usize       { self.current }
    pub fn undo_len(&self) -> usize            { self.undo.len() }
    pub fn folders(&self) -> &[SortFolder]     { &self.folders }
    pub fn bindings(&self) -> &KeyBindings     { &self.bindings }
    pub fn core_buttons(&self) -> &CoreButtons { &self.core_buttons }

    pub fn current_name(&self) -> Option<&str> {
        self.queue.get(self.current).map(String::as_str)
    }

    /// Absolute path of the entry at the current index, if any.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current_name().map(|n| self.source_dir.join(n))
    }

    // ── Playback mirror ──────────────────────────────────────────────────────

    /// Record that the current entry was loaded and playback started.
    pub fn mark_loaded(&mut self, path: PathBuf) {
        self.loaded_path  = Some(path);
        self.playback     = PlaybackState::Playing;
        self.clip_started = true;
    }

    /// Record a deliberate stop (handle released ahead of a move).
    /// The clip must be played again before it can be sorted.
    pub fn mark_stopped(&mut self) {
        self.playback     = PlaybackState::Stopped;
        self.clip_started = false;
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// The sort precondition: a current entry exists and its clip has been
    /// started at least once. Checked before playback is touched so a
    /// violation leaves the player running.
    pub fn check_sortable(&self) -> Result<(), SessionError> {
        if self.current >= self.queue.len() || !self.clip_started {
            return Err(SessionError::NotPlayed);
        }
        Ok(())
    }

    /// Move the current video into `folder_name`'s directory.
    ///
    /// The caller has already stopped playback and waited for the file
    /// handle to be released. On failure the queue, index and undo stack
    /// are exactly as they were — as if sort had never been called.
    pub fn sort_current(&mut self, folder_name: &str) -> Result<SortOutcome, SessionError> {
        let name = self
            .queue
            .get(self.current)
            .cloned()
            .ok_or(SessionError::NotPlayed)?;
        let folder = self
            .folders
            .iter()
            .find(|f| f.name == folder_name)
            .ok_or_else(|| SessionError::UnknownFolder(folder_name.to_string()))?;

        let source = self.source_dir.join(&name);
        let dest   = folder.path.join(&name);
        move_file(&source, &dest)
            .map_err(|e| SessionError::Move { file: name.clone(), source: e })?;

        self.undo.push(SortRecord { source, dest_dir: folder.path.clone() });
        self.queue.remove(self.current);
        // The index is not decremented — the next entry slides into place.
        self.loaded_path = None;

        if self.queue.is_empty() {
            Ok(SortOutcome::Finished)
        } else {
            Ok(SortOutcome::NextQueued)
        }
    }

    /// Undo the most recent sort: move its file back into the source
    /// directory and reinsert it at the current index.
    ///
    /// If the move back fails the popped record is pushed back onto the
    /// stack so the operation can be retried.
    pub fn unsort(&mut self) -> Result<(), SessionError> {
        let record = self.undo.pop().ok_or(SessionError::NothingToUnsort)?;

        let name = record
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let from = record.dest_dir.join(&name);

        if let Err(e) = move_file(&from, &record.source) {
            self.undo.push(record);
            return Err(SessionError::Move { file: name, source: e });
        }

        let at = self.current.min(self.queue.len());
        self.queue.insert(at, name);
        self.current = self.current.saturating_sub(1);
        Ok(())
    }
}

// ── Filesystem helpers ────────────────────────────────────────────────────────

/// List the video files in `dir`, sorted case-insensitively by name so the
/// queue order is stable across platforms.
fn scan_videos(dir: &Path) -> Result<Vec<String>, SessionError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|source| SessionError::Scan { dir: dir.to_path_buf(), source })?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_video = path
            .extension()
            .map(|e| {
                let e = e.to_string_lossy().to_lowercase();
                VIDEO_EXTENSIONS.contains(&e.as_str())
            })
            .unwrap_or(false);
        if !is_video {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort_by_key(|n| n.to_lowercase());
    Ok(names)
}

/// Move a file, refusing to clobber an existing destination. Rename is the
/// normal path (destinations live under the source directory); the
/// copy+delete fallback covers mounts where rename crosses a device.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if to.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }
    match std::fs::rename(from, to) {
        Ok(())             => Ok(()),
        Err(rename_err) => {
            if !from.exists() {
                return Err(rename_err);
            }
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}

/// Directory display name for a folder's logical name: underscores become
/// spaces and each word is capitalized ("major_seizure" → "Major Seizure").
pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"video bytes").unwrap();
    }

    fn config_for(dir: &TempDir) -> SortConfig {
        let mut cfg = SortConfig::default(); // Space / R / 0
        cfg.unsorted_path = dir.path().to_path_buf();
        cfg.folders_to_sort.insert("major_seizure".into(), "1".into());
        cfg.folders_to_sort.insert("minor_seizure".into(), "2".into());
        cfg
    }

    fn session_with(names: &[&str]) -> (TempDir, SortSession) {
        let dir = tempfile::tempdir().unwrap();
        for n in names {
            touch(dir.path(), n);
        }
        let session = SortSession::new(config_for(&dir)).unwrap();
        (dir, session)
    }

    /// Simulate the UI loading and playing the current entry.
    fn play_current(session: &mut SortSession) {
        let path = session.current_path().expect("an entry to load");
        session.mark_loaded(path);
    }

    /// Simulate the UI stopping the player ahead of a move.
    fn sort_now(session: &mut SortSession, folder: &str) -> Result<SortOutcome, SessionError> {
        session.check_sortable()?;
        session.mark_stopped();
        session.sort_current(folder)
    }

    #[test]
    fn scan_filters_by_extension_and_sorts() {
        let (_dir, session) =
            session_with(&["b.avi", "notes.txt", "c.mov", "a.mp4"]);
        assert_eq!(session.queue(), &["a.mp4", "b.avi", "c.mov"]);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn scan_is_case_insensitive_on_extension() {
        let (_dir, session) = session_with(&["D.MP4", "a.mp4"]);
        assert_eq!(session.queue(), &["a.mp4", "D.MP4"]);
    }

    #[test]
    fn empty_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        assert!(matches!(
            SortSession::new(config_for(&dir)),
            Err(SessionError::NoVideos)
        ));
    }

    #[test]
    fn destination_directories_are_created_title_cased() {
        let (dir, session) = session_with(&["a.mp4"]);
        assert!(dir.path().join("Major Seizure").is_dir());
        assert!(dir.path().join("Minor Seizure").is_dir());
        assert_eq!(session.folders()[0].display, "Major Seizure");
    }

    #[test]
    fn sort_before_any_play_is_rejected_without_mutation() {
        let (dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        let err = sort_now(&mut session, "major_seizure").unwrap_err();
        assert!(matches!(err, SessionError::NotPlayed));
        assert_eq!(session.queue(), &["a.mp4", "b.avi"]);
        assert_eq!(session.undo_len(), 0);
        assert!(dir.path().join("a.mp4").exists());
    }

    #[test]
    fn sort_moves_file_and_advances_queue() {
        let (dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        play_current(&mut session);

        let outcome = sort_now(&mut session, "major_seizure").unwrap();
        assert_eq!(outcome, SortOutcome::NextQueued);
        assert_eq!(session.queue(), &["b.avi"]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.undo_len(), 1);
        assert!(!dir.path().join("a.mp4").exists());
        assert!(dir.path().join("Major Seizure").join("a.mp4").exists());
    }

    #[test]
    fn sorting_every_entry_finishes_the_session() {
        let (dir, mut session) = session_with(&["a.mp4", "b.avi", "c.mov"]);
        let folders = ["major_seizure", "minor_seizure", "major_seizure"];

        for (i, folder) in folders.iter().enumerate() {
            play_current(&mut session);
            let outcome = sort_now(&mut session, folder).unwrap();
            if i == folders.len() - 1 {
                assert_eq!(outcome, SortOutcome::Finished);
            } else {
                assert_eq!(outcome, SortOutcome::NextQueued);
            }
        }

        assert!(session.queue().is_empty());
        assert_eq!(session.undo_len(), 3);
        let leftover = scan_videos(dir.path()).unwrap();
        assert!(leftover.is_empty());
        assert!(dir.path().join("Major Seizure").join("a.mp4").exists());
        assert!(dir.path().join("Minor Seizure").join("b.avi").exists());
        assert!(dir.path().join("Major Seizure").join("c.mov").exists());
    }

    #[test]
    fn sort_then_unsort_is_identity() {
        let (dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        play_current(&mut session);

        sort_now(&mut session, "minor_seizure").unwrap();
        session.unsort().unwrap();

        assert_eq!(session.queue(), &["a.mp4", "b.avi"]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.undo_len(), 0);
        assert!(dir.path().join("a.mp4").exists());
        assert!(!dir.path().join("Minor Seizure").join("a.mp4").exists());
    }

    #[test]
    fn unsort_is_not_idempotent() {
        let (_dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        play_current(&mut session);
        sort_now(&mut session, "major_seizure").unwrap();

        session.unsort().unwrap();
        assert!(matches!(
            session.unsort(),
            Err(SessionError::NothingToUnsort)
        ));
    }

    #[test]
    fn unsort_with_empty_stack_is_a_reported_noop() {
        let (_dir, mut session) = session_with(&["a.mp4"]);
        let err = session.unsort().unwrap_err();
        assert!(matches!(err, SessionError::NothingToUnsort));
        assert_eq!(session.queue(), &["a.mp4"]);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn sort_failure_leaves_state_untouched() {
        let (dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        play_current(&mut session);
        // Pull the file out from under the session to force a move failure.
        fs::remove_file(dir.path().join("a.mp4")).unwrap();

        let err = sort_now(&mut session, "major_seizure").unwrap_err();
        assert!(matches!(err, SessionError::Move { .. }));
        assert_eq!(session.queue(), &["a.mp4", "b.avi"]);
        assert_eq!(session.undo_len(), 0);
    }

    #[test]
    fn failed_unsort_keeps_the_record_for_retry() {
        let (dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        play_current(&mut session);
        sort_now(&mut session, "major_seizure").unwrap();

        // Sorted file vanishes (external meddling) — move back must fail.
        fs::remove_file(dir.path().join("Major Seizure").join("a.mp4")).unwrap();
        let err = session.unsort().unwrap_err();
        assert!(matches!(err, SessionError::Move { .. }));

        // The record survives, so the operation stays retryable.
        assert_eq!(session.undo_len(), 1);
        assert_eq!(session.queue(), &["b.avi"]);
    }

    #[test]
    fn key_bindings_drive_sort_and_unsort() {
        use crate::commands::SessionCommand;
        use crate::keymap::Action;

        let (dir, mut session) = session_with(&["a.mp4", "b.avi"]);
        play_current(&mut session);

        let action = session.bindings().resolve("1").cloned().unwrap();
        assert_eq!(action, Action::SortInto("major_seizure".into()));
        if let SessionCommand::Sort(folder) = action.to_command() {
            sort_now(&mut session, &folder).unwrap();
        }
        assert!(dir.path().join("Major Seizure").join("a.mp4").exists());

        let action = session.bindings().resolve("0").cloned().unwrap();
        assert_eq!(action, Action::Unsort);
        session.unsort().unwrap();
        assert!(dir.path().join("a.mp4").exists());
        assert_eq!(session.queue(), &["a.mp4", "b.avi"]);
    }

    #[test]
    fn move_refuses_to_clobber_existing_destination() {
        let (dir, mut session) = session_with(&["a.mp4"]);
        play_current(&mut session);
        // A same-named file already sits in the destination folder.
        touch(&dir.path().join("Major Seizure"), "a.mp4");

        let err = sort_now(&mut session, "major_seizure").unwrap_err();
        assert!(matches!(err, SessionError::Move { .. }));
        assert_eq!(session.queue(), &["a.mp4"]);
    }

    #[test]
    fn display_names_title_case_underscored_words() {
        assert_eq!(display_name("major_seizure"), "Major Seizure");
        assert_eq!(display_name("exclude"), "Exclude");
        assert_eq!(display_name("day_nonsleeping"), "Day Nonsleeping");
        assert_eq!(display_name("NIGHT_nonseizure"), "Night Nonseizure");
    }
}
