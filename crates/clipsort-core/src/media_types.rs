// crates/clipsort-core/src/media_types.rs
//
// Types that flow across the channels between clipsort-media and
// clipsort-ui. No egui, no ffmpeg — just plain data.
//
// `gen` is the load generation: a fresh Uuid minted each time a video is
// loaded. Results from a superseded load carry the old generation and are
// discarded (or cleaned up) by the receiver.

use std::path::PathBuf;
use uuid::Uuid;

/// Out-of-band results sent from the player's background threads to the UI.
pub enum PlayerEvent {
    /// Probed duration of the loaded file, in seconds.
    Duration   { gen: Uuid, seconds: f64 },
    /// Temp WAV extracted for rodio playback.
    AudioReady { gen: Uuid, wav: PathBuf },
    /// The decode thread reached end of stream and released the file.
    Eof        { gen: Uuid },
    Error      { gen: Uuid, msg: String },
}

/// A decoded frame from the playback pipeline.
pub struct PlaybackFrame {
    pub gen:       Uuid,
    pub timestamp: f64,
    pub width:     u32,
    pub height:    u32,
    pub data:      Vec<u8>, // RGBA
}
