// crates/clipsort-ui/src/modules/player_module.rs
//
// PlayerModule owns the PTS-gated promotion of decoded frames into the
// preview texture. Non-rendering — poll_frames() is called every frame
// from app.rs before the panels are laid out.

use eframe::egui;

use crate::context::AppContext;

pub struct PlayerModule;

impl PlayerModule {
    /// PTS-gated frame consumption.
    ///
    /// The decode thread pre-fills a bounded channel as fast as FFmpeg can
    /// go. Draining it all and showing the last frame would play the clip
    /// at decode speed. Instead a one-slot pending buffer holds the next
    /// frame and only promotes it to the preview texture once the
    /// wall-clock position has caught up with its PTS.
    pub fn poll_frames(context: &mut AppContext, ctx: &egui::Context) {
        let AppContext { player, playback, .. } = context;

        let Some(gen) = playback.media_gen else {
            // Nothing loaded — drain and drop whatever is queued.
            while player.frame_rx.try_recv().is_ok() {}
            return;
        };

        // Discard a pending frame from a superseded load.
        if playback.pending_frame.as_ref().map(|f| f.gen != gen).unwrap_or(false) {
            playback.pending_frame = None;
        }

        // Step 1: fill the pending slot, skipping stale-generation frames.
        if playback.pending_frame.is_none() {
            while let Ok(f) = player.frame_rx.try_recv() {
                if f.gen == gen {
                    playback.pending_frame = Some(f);
                    break;
                }
            }
        }

        // Step 2: fast-forward past overdue frames so a hiccup doesn't
        // leave the preview permanently behind the clock.
        let t = playback.current_time;
        while playback.pending_frame.as_ref()
            .map(|f| f.timestamp < t - (1.0 / 30.0))
            .unwrap_or(false)
        {
            match player.frame_rx.try_recv() {
                Ok(newer) if newer.gen == gen => playback.pending_frame = Some(newer),
                Ok(_stale)                    => {}
                Err(_)                        => break,
            }
        }

        // Step 3: promote the pending frame when its PTS is due
        // (at most one frame tick early).
        let frame_due = playback.pending_frame.as_ref()
            .map(|f| f.timestamp <= t + (1.0 / 60.0))
            .unwrap_or(false);

        if frame_due {
            if let Some(f) = playback.pending_frame.take() {
                let tex = ctx.load_texture(
                    format!("frame-{}", f.gen),
                    egui::ColorImage::from_rgba_unmultiplied(
                        [f.width as usize, f.height as usize], &f.data,
                    ),
                    egui::TextureOptions::LINEAR,
                );
                playback.frame_tex = Some(tex);
                ctx.request_repaint();
                // Pre-pull the next frame so it's ready for the next tick.
                if let Ok(next) = player.frame_rx.try_recv() {
                    if next.gen == gen {
                        playback.pending_frame = Some(next);
                    }
                }
            }
        }
    }
}
