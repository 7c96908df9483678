// crates/clipsort-core/src/commands.rs
//
// Every user action in ClipSort is expressed as a SessionCommand.
// UI modules emit these; app.rs processes them after the UI pass.
// Button clicks and key presses converge on the same four variants.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Toggle playback; loads the current queue entry when stopped.
    PlayPause,
    /// Seek the loaded clip back to zero, starting playback if needed.
    Restart,
    /// Move the current video into the named destination folder.
    Sort(String),
    /// Undo the most recent sort, moving its file back.
    Unsort,
}
