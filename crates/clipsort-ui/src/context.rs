// crates/clipsort-ui/src/context.rs
//
// AppContext owns all runtime handles that are NOT part of the session
// state. SortingView holds one of these plus a SortSession and the panel
// modules — nothing else.
//
// Sub-struct layout:
//   AppContext
//     ├── player                — the decode worker + its channel handles
//     ├── playback: PlaybackContext — clock, frame slot, preview texture
//     ├── audio: AudioContext   — rodio OutputStream + the one active Sink
//     └── pending_load          — deferred reload deadline after a sort

use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;
use rodio::{OutputStream, Sink};
use uuid::Uuid;

use clipsort_core::media_types::{PlaybackFrame, PlayerEvent};
use clipsort_core::session::{PlaybackState, SortSession};
use clipsort_media::audio::cleanup_audio_temp;
use clipsort_media::PlayerWorker;

use crate::clipsort_log;

// ── PlaybackContext ───────────────────────────────────────────────────────────
// The UI-side half of playback: the wall clock that frames are gated
// against, the one-slot pending frame buffer, and the preview texture.

pub struct PlaybackContext {
    /// Generation of the load currently on screen. Frames and events
    /// carrying any other generation are stale and get dropped.
    pub media_gen:     Option<Uuid>,
    /// Wall-clock playback position, advanced each frame while Playing.
    pub current_time:  f64,
    /// Probed duration of the loaded clip, for the monitor readout.
    pub duration:      Option<f64>,
    /// Next-to-display frame, held until its PTS is due. Prevents the
    /// drain-all pattern from racing ahead of wall-clock time.
    pub pending_frame: Option<PlaybackFrame>,
    /// The decoded frame currently shown by the monitor.
    pub frame_tex:     Option<egui::TextureHandle>,
}

impl PlaybackContext {
    fn new() -> Self {
        Self {
            media_gen:     None,
            current_time:  0.0,
            duration:      None,
            pending_frame: None,
            frame_tex:     None,
        }
    }

    /// Reset for a fresh load.
    pub fn begin(&mut self, gen: Uuid) {
        self.media_gen     = Some(gen);
        self.current_time  = 0.0;
        self.duration      = None;
        self.pending_frame = None;
        self.frame_tex     = None;
    }

    /// Reset to the nothing-loaded state.
    pub fn clear(&mut self) {
        self.media_gen     = None;
        self.current_time  = 0.0;
        self.duration      = None;
        self.pending_frame = None;
        self.frame_tex     = None;
    }
}

// ── AudioContext ──────────────────────────────────────────────────────────────

pub struct AudioContext {
    /// OutputStream MUST stay alive for the whole session — dropping it
    /// stops all audio. Initialized lazily by AudioModule::tick because
    /// WASAPI needs the Win32 message loop running first in GUI-subsystem
    /// (double-click) launches.
    pub stream: Option<OutputStream>,
    /// The one active sink, feeding off the extracted temp WAV.
    pub sink:   Option<Sink>,
    /// Extracted WAV for the tagged load generation, once AudioReady lands.
    pub wav:    Option<(Uuid, PathBuf)>,
}

impl AudioContext {
    fn new() -> Self {
        Self { stream: None, sink: None, wav: None }
    }

    /// Drop the sink and delete the temp WAV. Called on every load change,
    /// on stop-before-move, and on exit.
    pub fn reset(&mut self) {
        self.sink = None;
        if let Some((_, wav)) = self.wav.take() {
            cleanup_audio_temp(&wav);
        }
    }
}

// ── AppContext ────────────────────────────────────────────────────────────────

pub struct AppContext {
    pub player:       PlayerWorker,
    pub playback:     PlaybackContext,
    pub audio:        AudioContext,
    /// Deadline for the deferred load_current after a successful sort —
    /// tolerates filesystem-event propagation lag instead of reloading
    /// synchronously in the same tick as the move.
    pub pending_load: Option<Instant>,
}

impl AppContext {
    pub fn new(player: PlayerWorker) -> Self {
        Self {
            player,
            playback:     PlaybackContext::new(),
            audio:        AudioContext::new(),
            pending_load: None,
        }
    }

    /// Drain the player's event channel into state. Called once per frame
    /// from SortingView::poll_media, before frame promotion.
    ///
    /// This is the single translation layer between raw PlayerWorker
    /// output and UI-visible state — durations, WAV paths and EOF all
    /// land here, gated on the current load generation.
    pub fn ingest_player_events(&mut self, session: &mut SortSession, ctx: &egui::Context) {
        while let Ok(event) = self.player.event_rx.try_recv() {
            match event {
                PlayerEvent::Duration { gen, seconds } => {
                    if self.playback.media_gen == Some(gen) {
                        self.playback.duration = Some(seconds);
                        ctx.request_repaint();
                    }
                }

                PlayerEvent::AudioReady { gen, wav } => {
                    if self.playback.media_gen == Some(gen) {
                        self.audio.wav = Some((gen, wav));
                    } else {
                        // Superseded load — the WAV has no consumer.
                        cleanup_audio_temp(&wav);
                    }
                }

                PlayerEvent::Eof { gen } => {
                    if self.playback.media_gen == Some(gen) {
                        // The decode thread already released the file. The
                        // clip stays sortable — it was watched to the end.
                        session.playback = PlaybackState::Stopped;
                        ctx.request_repaint();
                    }
                }

                PlayerEvent::Error { gen, msg } => {
                    clipsort_log!("[player] {gen}: {msg}");
                    if self.playback.media_gen == Some(gen) {
                        session.playback = PlaybackState::Stopped;
                    }
                }
            }
        }
    }
}
