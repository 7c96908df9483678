// crates/clipsort-media/src/lib.rs
//
// The playback collaborator. No egui dependency — communicates with
// clipsort-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from player.rs (the side-job thread or a new PlayerWorker method)

pub mod audio;
pub mod decode;
pub mod player;
pub mod probe;

// Re-export the main public API so clipsort-ui imports are simple.
pub use player::PlayerWorker;
pub use clipsort_core::media_types::{PlaybackFrame, PlayerEvent};

/// Initialize FFmpeg. Call once from main before any PlayerWorker exists.
pub fn init() -> anyhow::Result<()> {
    ffmpeg_the_third::init()?;
    Ok(())
}
