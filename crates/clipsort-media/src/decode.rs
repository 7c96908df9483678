// crates/clipsort-media/src/decode.rs
//
// LiveDecoder: stateful per-clip decoder. A triage session always plays a
// clip from the start, so there is no seek path — open, then pull frames
// sequentially until EOF or the decoder is dropped (which releases the
// file handle).

use std::path::PathBuf;

use anyhow::Result;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

/// Preview frames are scaled to this width; height follows the source
/// aspect, rounded down to even.
const PREVIEW_W: u32 = 640;

pub struct LiveDecoder {
    pub path:  PathBuf,
    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    video_idx: usize,
    last_pts:  i64,
    tb_num:    i32,
    tb_den:    i32,
    out_w:     u32,
    out_h:     u32,
    scaler:    SwsContext,
}

impl LiveDecoder {
    pub fn open(path: &PathBuf) -> Result<Self> {
        let ictx = input(path)?;
        let video_idx = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream"))?
            .index();

        let (tb_num, tb_den, raw_w, raw_h) = {
            let stream = ictx.stream(video_idx).unwrap();
            let tb = stream.time_base();
            let (w, h) = unsafe {
                let p = stream.parameters().as_ptr();
                ((*p).width as u32, (*p).height as u32)
            };
            (tb.numerator(), tb.denominator(), w, h)
        };

        // Second context for decoder params (avoids borrow conflict with ictx).
        let ictx2   = input(path)?;
        let stream2 = ictx2.stream(video_idx).unwrap();
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video()?;

        let out_w = PREVIEW_W.min(raw_w.max(2));
        let out_h = ((out_w as u64 * raw_h.max(2) as u64 / raw_w.max(2) as u64) as u32)
            .max(2) & !1;

        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        Ok(Self {
            path: path.clone(),
            ictx,
            decoder,
            video_idx,
            last_pts: 0,
            tb_num,
            tb_den,
            out_w,
            out_h,
            scaler,
        })
    }

    fn pts_to_secs(&self, pts: i64) -> f64 {
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Decode the next frame sequentially. Returns `(pixels, w, h, ts_secs)`
    /// or None at EOF.
    pub fn next_frame(&mut self) -> Option<(Vec<u8>, u32, u32, f64)> {
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                let ts_secs = self.pts_to_secs(pts);

                let mut out = ffmpeg::util::frame::video::Video::empty();
                if self.scaler.run(&decoded, &mut out).is_err() { return None; }

                // Destripe: copy only visible pixels, not stride padding.
                let stride = out.stride(0);
                let raw    = out.data(0);
                let data: Vec<u8> = (0..self.out_h as usize)
                    .flat_map(|row| {
                        let s = row * stride;
                        &raw[s..s + self.out_w as usize * 4]
                    })
                    .copied()
                    .collect();
                return Some((data, self.out_w, self.out_h, ts_secs));
            }
        }
        None
    }
}
