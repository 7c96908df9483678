// crates/clipsort-media/src/probe.rs
//
// In-process FFmpeg duration probe for the status line.

use std::path::PathBuf;

use crossbeam_channel::Sender;
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use clipsort_core::media_types::PlayerEvent;

pub fn probe_duration(path: &PathBuf, gen: Uuid, tx: &Sender<PlayerEvent>) {
    match input(path) {
        Ok(ctx) => {
            let dur = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
            if dur > 0.0 {
                eprintln!("[media] duration {dur:.2}s ← {}", path.display());
                let _ = tx.send(PlayerEvent::Duration { gen, seconds: dur });
                return;
            }
            // Fall back to stream duration.
            if let Some(stream) = ctx.streams().best(Type::Video)
                .or_else(|| ctx.streams().best(Type::Audio))
            {
                let tb = stream.time_base();
                let d = stream.duration() as f64 * tb.numerator() as f64
                    / tb.denominator() as f64;
                if d > 0.0 {
                    let _ = tx.send(PlayerEvent::Duration { gen, seconds: d });
                    return;
                }
            }
            let _ = tx.send(PlayerEvent::Error { gen, msg: "duration unknown".into() });
        }
        Err(e) => {
            eprintln!("[media] probe_duration open failed: {e}");
            let _ = tx.send(PlayerEvent::Error { gen, msg: e.to_string() });
        }
    }
}
