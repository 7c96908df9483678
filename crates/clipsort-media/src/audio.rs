// crates/clipsort-media/src/audio.rs
//
// Audio extraction (WAV for the UI's rodio sink) and temp file cleanup.
//
// Decoding happens in-process via ffmpeg-the-third — no child process, no
// PATH dependency, works identically in every launch mode. The extraction
// holds its own read handle on the source file, so it takes a cancel flag:
// a sort must be able to abort it and get the handle released before the
// filesystem move is attempted.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

use clipsort_core::media_types::PlayerEvent;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Output sample rate for extracted WAV files. Matches the rodio sink rate.
const OUT_RATE: u32 = 44_100;

/// Output format: packed (interleaved) f32 le. rodio / symphonia expects
/// interleaved stereo, not planar. WAV format tag 3 = IEEE_FLOAT.
const OUT_FMT: Sample = Sample::F32(SampleType::Packed);

const OUT_LAYOUT: ChannelLayout = ChannelLayout::STEREO;

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode audio from `path`, resample to 44100 Hz stereo f32le, write a WAV
/// temp file, and send the path back via `tx` as `PlayerEvent::AudioReady`.
///
/// Soft-fails on any error (logs, sends nothing on tx) so the UI degrades
/// gracefully to silence. A raised cancel flag aborts between packets; the
/// partial WAV is deleted and no event is sent.
pub fn extract_audio(path: &PathBuf, gen: Uuid, cancel: &AtomicBool, tx: &Sender<PlayerEvent>) {
    let wav_path = std::env::temp_dir().join(format!("clipsort_audio_{gen}.wav"));

    match decode_to_wav(path, &wav_path, cancel) {
        Ok(bytes) => {
            eprintln!("[media] audio WAV written ({bytes} bytes) ← {}", path.display());
            let _ = tx.send(PlayerEvent::AudioReady { gen, wav: wav_path });
        }
        Err(Cancelled) => {
            let _ = std::fs::remove_file(&wav_path);
        }
        Err(Failed(msg)) => {
            eprintln!("[media] audio extract failed for '{}': {msg}", path.display());
            let _ = std::fs::remove_file(&wav_path);
        }
    }
}

/// Delete a temp WAV that was extracted for a clip. Only touches files
/// matching the `clipsort_audio_<uuid>.wav` pattern in the OS temp dir.
pub fn cleanup_audio_temp(path: &std::path::Path) {
    let in_temp = path.parent()
        .map(|p| p == std::env::temp_dir())
        .unwrap_or(false);
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if in_temp && name.starts_with("clipsort_audio_") && name.ends_with(".wav") {
        if let Err(e) = std::fs::remove_file(path) {
            eprintln!("[media] cleanup_audio_temp: {e}");
        }
    }
}

// ── Internal implementation ───────────────────────────────────────────────────

enum ExtractError {
    Cancelled,
    Failed(String),
}
use ExtractError::{Cancelled, Failed};

impl From<String> for ExtractError {
    fn from(msg: String) -> Self { Failed(msg) }
}

/// Decode all audio from `src`, resample, and write a WAV to `dst`.
/// Returns the total number of bytes written on success.
fn decode_to_wav(src: &PathBuf, dst: &PathBuf, cancel: &AtomicBool) -> Result<u64, ExtractError> {
    let mut ictx = input(src).map_err(|e| format!("open: {e}"))?;

    let audio_stream_idx = ictx
        .streams()
        .best(MediaType::Audio)
        .ok_or_else(|| Failed("no audio stream".into()))?
        .index();

    let stream = ictx.stream(audio_stream_idx).unwrap();
    let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .map_err(|e| format!("codec context: {e}"))?;
    let mut decoder = dec_ctx.decoder().audio()
        .map_err(|e| format!("audio decoder: {e}"))?;

    // The resampler is built lazily on the first decoded frame so we know
    // the real source format/layout/rate before constructing the SwrContext.
    let mut resampler: Option<resampling::Context> = None;
    let mut pcm: Vec<f32> = Vec::new();

    for result in ictx.packets() {
        if cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        let (stream, packet) = match result {
            Ok(p)  => p,
            Err(_) => continue,
        };
        if stream.index() != audio_stream_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }

        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            append_resampled(&frame, &mut resampler, &mut pcm);
        }
    }

    // Flush decoder.
    let _ = decoder.send_eof();
    let mut frame = AudioFrame::empty();
    while decoder.receive_frame(&mut frame).is_ok() {
        append_resampled(&frame, &mut resampler, &mut pcm);
    }

    if pcm.is_empty() {
        return Err(Failed("no audio samples decoded".into()));
    }

    let bytes = write_wav(dst, &pcm).map_err(|e| format!("write WAV: {e}"))?;
    Ok(bytes)
}

/// Resample `frame` to OUT_FMT/OUT_LAYOUT/OUT_RATE and append the resulting
/// interleaved f32 samples to `out`. Builds `resampler` on first use.
fn append_resampled(
    frame:     &AudioFrame,
    resampler: &mut Option<resampling::Context>,
    out:       &mut Vec<f32>,
) {
    let src_channels = frame.ch_layout().channels();
    let needs_resample = frame.format() != OUT_FMT
        || frame.rate()                != OUT_RATE
        || src_channels                != 2;

    if needs_resample {
        let rs = resampler.get_or_insert_with(|| {
            // Mono sources must be declared as MONO so swr doesn't
            // misinterpret the channel count.
            let src_layout = if src_channels >= 2 {
                frame.ch_layout()
            } else {
                ChannelLayout::MONO
            };
            resampling::Context::get2(
                frame.format(), src_layout, frame.rate(),
                OUT_FMT,        OUT_LAYOUT, OUT_RATE,
            ).expect("create audio resampler for WAV extraction")
        });

        let mut resampled = AudioFrame::empty();
        if rs.run(frame, &mut resampled).is_ok() && resampled.samples() > 0 {
            append_packed_f32(&resampled, out);
        }
    } else {
        append_packed_f32(frame, out);
    }
}

/// Copy the packed f32 samples from `frame` into `out`.
/// OUT_FMT is Packed (interleaved), so all channel data is in plane 0.
fn append_packed_f32(frame: &AudioFrame, out: &mut Vec<f32>) {
    let data = frame.data(0);
    out.extend(
        data.chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
    );
}

/// Write interleaved stereo f32le PCM to a WAV file at `path`.
/// Returns total bytes written (header + data).
fn write_wav(path: &PathBuf, samples: &[f32]) -> std::io::Result<u64> {
    const CHANNELS:     u16 = 2;
    const BITS:         u16 = 32;
    const FORMAT_FLOAT: u16 = 3; // IEEE_FLOAT
    const BLOCK_ALIGN:  u16 = CHANNELS * (BITS / 8);

    let data_size = (samples.len() * 4) as u32;
    let byte_rate = OUT_RATE * BLOCK_ALIGN as u32;

    let mut file = std::fs::File::create(path)?;
    let mut w    = std::io::BufWriter::new(&mut file);

    w.write_all(b"RIFF")?;
    w.write_all(&(36u32 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")?;

    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&FORMAT_FLOAT.to_le_bytes())?;
    w.write_all(&CHANNELS.to_le_bytes())?;
    w.write_all(&OUT_RATE.to_le_bytes())?;
    w.write_all(&byte_rate.to_le_bytes())?;
    w.write_all(&BLOCK_ALIGN.to_le_bytes())?;
    w.write_all(&BITS.to_le_bytes())?;

    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for s in samples {
        w.write_all(&s.to_le_bytes())?;
    }
    w.flush()?;

    Ok((44 + data_size) as u64)
}
