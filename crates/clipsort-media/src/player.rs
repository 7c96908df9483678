// crates/clipsort-media/src/player.rs
//
// PlayerWorker: owns the decode thread and the per-load side jobs
// (duration probe + audio extraction). All public API that clipsort-ui
// calls lives here.
//
// The contract the sorting controller relies on: after stop_sync()
// returns Ok, no thread owned by this worker holds a handle on the
// loaded file, so a filesystem move of that file is safe.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use uuid::Uuid;

use clipsort_core::media_types::{PlaybackFrame, PlayerEvent};

use crate::audio::extract_audio;
use crate::decode::LiveDecoder;
use crate::probe::probe_duration;

/// Frame channel capacity. The decode thread fills it ahead of the UI and
/// blocks when full — backpressure is the rate limiter, no sleeps. 32
/// frames is roughly a second of lookahead at typical preview rates.
const FRAME_LOOKAHEAD: usize = 32;

enum DecodeCmd {
    Open { gen: Uuid, path: PathBuf },
    /// Drop the decoder (closing the file handle), then acknowledge.
    Stop { ack: Sender<()> },
    Shutdown,
}

/// A per-load background thread: probes duration, then extracts audio.
/// Both open their own read handle on the source file, hence the cancel
/// flag and the join in stop_sync().
struct SideJob {
    cancel: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

pub struct PlayerWorker {
    /// Decoded preview frames, PTS-tagged. Drained by the UI every frame.
    pub frame_rx: Receiver<PlaybackFrame>,
    /// Duration / audio / EOF / error results.
    pub event_rx: Receiver<PlayerEvent>,
    event_tx:     Sender<PlayerEvent>,
    cmd_tx:       Sender<DecodeCmd>,
    side_job:     Option<SideJob>,
}

impl PlayerWorker {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx)     = bounded::<DecodeCmd>(4);
        let (frame_tx, frame_rx) = bounded::<PlaybackFrame>(FRAME_LOOKAHEAD);
        let (event_tx, event_rx) = bounded::<PlayerEvent>(64);

        let thread_events = event_tx.clone();
        thread::spawn(move || decode_loop(cmd_rx, frame_tx, thread_events));

        Self {
            frame_rx,
            event_rx,
            event_tx,
            cmd_tx,
            side_job: None,
        }
    }

    /// Load `path` and start decoding from the beginning. Any previous clip
    /// is dropped; stale frames are flushed so the first frame the UI sees
    /// belongs to `gen`.
    pub fn open(&mut self, gen: Uuid, path: PathBuf) {
        self.cancel_side_job();
        while self.frame_rx.try_recv().is_ok() {}
        let _ = self.cmd_tx.send(DecodeCmd::Open { gen, path: path.clone() });

        // Side jobs run on one thread so at most one extra handle is open
        // per load, and stop_sync has a single join point.
        let tx     = self.event_tx.clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag   = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            probe_duration(&path, gen, &tx);
            if flag.load(Ordering::Relaxed) {
                return;
            }
            extract_audio(&path, gen, &flag, &tx);
        });
        self.side_job = Some(SideJob { cancel, handle });
    }

    /// Stop decoding and block until the file handle is released — both the
    /// decoder's and the side job's. Must complete before the caller moves
    /// the file; a held handle can make the move fail on some platforms.
    pub fn stop_sync(&mut self, timeout: Duration) -> anyhow::Result<()> {
        self.cancel_side_job();

        let (ack_tx, ack_rx) = bounded(1);
        self.cmd_tx
            .send(DecodeCmd::Stop { ack: ack_tx })
            .context("player thread is gone")?;
        ack_rx
            .recv_timeout(timeout)
            .context("player did not release the file in time")?;

        while self.frame_rx.try_recv().is_ok() {}
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.cancel_side_job();
        let _ = self.cmd_tx.try_send(DecodeCmd::Shutdown);
    }

    fn cancel_side_job(&mut self) {
        if let Some(job) = self.side_job.take() {
            job.cancel.store(true, Ordering::Relaxed);
            let _ = job.handle.join();
        }
    }
}

// ── Decode thread ─────────────────────────────────────────────────────────────

fn decode_loop(
    cmd_rx:   Receiver<DecodeCmd>,
    frame_tx: Sender<PlaybackFrame>,
    events:   Sender<PlayerEvent>,
) {
    let mut active: Option<(Uuid, LiveDecoder)> = None;

    loop {
        // Idle: block until a command arrives. Active: only peek, so the
        // decode below keeps running.
        let cmd = if active.is_some() {
            match cmd_rx.try_recv() {
                Ok(c)                         => Some(c),
                Err(TryRecvError::Empty)        => None,
                Err(TryRecvError::Disconnected) => return,
            }
        } else {
            match cmd_rx.recv() {
                Ok(c)  => Some(c),
                Err(_) => return,
            }
        };

        if let Some(cmd) = cmd {
            match cmd {
                DecodeCmd::Open { gen, path } => {
                    // Replacing `active` drops the previous decoder first.
                    active = None;
                    match LiveDecoder::open(&path) {
                        Ok(d)  => active = Some((gen, d)),
                        Err(e) => {
                            eprintln!("[player] open: {e}");
                            let _ = events.send(PlayerEvent::Error { gen, msg: e.to_string() });
                        }
                    }
                }
                DecodeCmd::Stop { ack } => {
                    active = None;
                    let _ = ack.send(());
                }
                DecodeCmd::Shutdown => return,
            }
            continue;
        }

        let next = {
            let (gen, dec) = active.as_mut().expect("active checked above");
            dec.next_frame().map(|(data, width, height, timestamp)| PlaybackFrame {
                gen: *gen,
                timestamp,
                width,
                height,
                data,
            })
        };

        match next {
            Some(frame) => {
                // The frame channel may be full (UI paused and not draining).
                // select! keeps Stop responsive while we wait for a slot —
                // otherwise stop_sync would deadlock against a full channel.
                select! {
                    send(frame_tx, frame) -> res => {
                        if res.is_err() { return; }
                    }
                    recv(cmd_rx) -> cmd => match cmd {
                        Ok(DecodeCmd::Open { gen, path }) => {
                            active = None;
                            match LiveDecoder::open(&path) {
                                Ok(d)  => active = Some((gen, d)),
                                Err(e) => {
                                    eprintln!("[player] open: {e}");
                                    let _ = events.send(PlayerEvent::Error { gen, msg: e.to_string() });
                                }
                            }
                        }
                        Ok(DecodeCmd::Stop { ack }) => {
                            active = None;
                            let _ = ack.send(());
                        }
                        Ok(DecodeCmd::Shutdown) | Err(_) => return,
                    }
                }
            }
            None => {
                // EOF: release the file handle right away so a sort after
                // watching to the end needs no explicit stop.
                let (gen, _) = active.take().expect("active checked above");
                let _ = events.send(PlayerEvent::Eof { gen });
            }
        }
    }
}
