// crates/clipsort-ui/src/modules/audio_module.rs
//
// AudioModule owns the one rodio sink. Non-rendering — tick() is called
// every frame from app.rs after commands are processed.
//
// The sink plays the temp WAV extracted by clipsort-media, not the source
// file: keeping the sink off the source file means only the decode worker
// ever holds a handle the sort path has to wait on.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStreamBuilder, Sink};

use clipsort_core::session::{PlaybackState, SortSession};

use crate::clipsort_log;
use crate::context::AppContext;

/// Ticks to wait after stream creation before sinks are allowed.
/// In Windows GUI-subsystem mode WASAPI registers its audio session
/// asynchronously after OutputStreamBuilder succeeds; a sink created on
/// the same tick is silently dropped. 5 ticks ≈ 83 ms at 60 fps.
const STREAM_WARMUP_TICKS: u8 = 5;

pub struct AudioModule {
    warmup_ticks: u8,
}

impl AudioModule {
    pub fn new() -> Self {
        Self { warmup_ticks: 0 }
    }

    pub fn tick(&mut self, session: &SortSession, context: &mut AppContext) {
        // Lazy stream init — see AudioContext::stream.
        if context.audio.stream.is_none() {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    context.audio.stream = Some(stream);
                    self.warmup_ticks = STREAM_WARMUP_TICKS;
                }
                Err(e) => {
                    clipsort_log!("[audio] stream init failed: {e}");
                    return;
                }
            }
        }

        if self.warmup_ticks > 0 {
            self.warmup_ticks -= 1;
            return;
        }
        let Some(stream) = &context.audio.stream else { return };

        match session.playback {
            PlaybackState::Playing => {
                let wav_for_current = match (&context.audio.wav, context.playback.media_gen) {
                    (Some((wav_gen, path)), Some(gen)) if *wav_gen == gen => Some(path.clone()),
                    _ => None,
                };

                if context.audio.sink.is_none() {
                    // Extraction may land mid-clip; seek the fresh sink to
                    // the current position so audio joins in sync.
                    let Some(wav) = wav_for_current else { return };
                    let seek_t = context.playback.current_time.max(0.0);
                    match File::open(&wav) {
                        Ok(file) => match Decoder::new(BufReader::new(file)) {
                            Ok(decoder) => {
                                let sink = Sink::connect_new(stream.mixer());
                                sink.append(decoder);
                                let _ = sink.try_seek(Duration::from_secs_f64(seek_t));
                                sink.play();
                                context.audio.sink = Some(sink);
                            }
                            Err(e) => {
                                clipsort_log!("[audio] decoder failed: {e}");
                                context.audio.wav = None;
                            }
                        },
                        Err(e) => {
                            clipsort_log!("[audio] open {} failed: {e}", wav.display());
                            context.audio.wav = None;
                        }
                    }
                } else if let Some(sink) = &context.audio.sink {
                    if sink.is_paused() {
                        sink.play();
                    }
                }
            }

            PlaybackState::Paused => {
                if let Some(sink) = &context.audio.sink {
                    if !sink.is_paused() {
                        sink.pause();
                    }
                }
            }

            PlaybackState::Stopped => {
                // The sink is dropped by the stop/load paths; a sink that
                // outlived its clip (EOF) just runs out on its own.
            }
        }
    }
}
