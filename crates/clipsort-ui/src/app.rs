// crates/clipsort-ui/src/app.rs (clipsort-ui)

use std::time::{Duration, Instant};

use eframe::egui;
use egui::RichText;
use uuid::Uuid;

use clipsort_core::commands::SessionCommand;
use clipsort_core::config;
use clipsort_core::session::{PlaybackState, SortOutcome, SortSession};
use clipsort_media::PlayerWorker;

use crate::clipsort_log;
use crate::context::AppContext;
use crate::dialogs;
use crate::modules::{
    audio_module::AudioModule,
    controls::ControlsModule,
    monitor::MonitorModule,
    player_module::PlayerModule,
    SessionModule,
};
use crate::setup::{SetupOutcome, SetupView};
use crate::theme::{configure_style, ACCENT};

/// Settle delay between a successful sort's move and loading the next
/// entry — some platforms report the move a beat late.
const RELOAD_DELAY: Duration = Duration::from_millis(100);

/// How long a sort waits for the player to release the file handle.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

// ── App ───────────────────────────────────────────────────────────────────────

enum AppView {
    /// First run, no config file — collect settings interactively.
    Setup(SetupView),
    Sorting(Box<SortingView>),
}

pub struct ClipSortApp {
    view: AppView,
}

impl ClipSortApp {
    /// `boot` is the session built from a saved config file, if one was
    /// found; without it the app opens on the setup view.
    pub fn new(cc: &eframe::CreationContext<'_>, boot: Option<SortSession>) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode — prevents egui overwriting our theme on OS
        // light/dark changes.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let view = match boot {
            Some(session) => AppView::Sorting(Box::new(SortingView::new(session))),
            None          => AppView::Setup(SetupView::new()),
        };
        Self { view }
    }
}

impl eframe::App for ClipSortApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match &mut self.view {
            AppView::Setup(setup) => {
                if let SetupOutcome::Start { config, save } = setup.ui(ctx) {
                    if save {
                        let path = config::save_path();
                        if let Err(e) = config.save(&path) {
                            dialogs::error("Save Failed", &e.to_string());
                        } else {
                            clipsort_log!("[config] saved defaults to {}", path.display());
                        }
                    }
                    match SortSession::new(config) {
                        Ok(session) => {
                            self.view = AppView::Sorting(Box::new(SortingView::new(session)));
                        }
                        // Stay in setup so the user can pick another folder.
                        Err(e) => dialogs::error("Cannot Start", &e.to_string()),
                    }
                }
            }
            AppView::Sorting(view) => view.update(ctx),
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let AppView::Sorting(view) = &mut self.view {
            view.context.player.shutdown();
            view.context.audio.reset();
        }
    }
}

// ── SortingView ───────────────────────────────────────────────────────────────

pub struct SortingView {
    session:      SortSession,
    pub context:  AppContext,
    monitor:      MonitorModule,
    controls:     ControlsModule,
    audio:        AudioModule,
    /// Commands emitted by modules and key presses each frame, processed
    /// after the UI pass.
    pending_cmds: Vec<SessionCommand>,
}

impl SortingView {
    pub fn new(session: SortSession) -> Self {
        Self {
            session,
            context:      AppContext::new(PlayerWorker::new()),
            monitor:      MonitorModule::new(),
            controls:     ControlsModule,
            audio:        AudioModule::new(),
            pending_cmds: Vec::new(),
        }
    }

    pub fn update(&mut self, ctx: &egui::Context) {
        self.handle_keys(ctx);
        self.poll_media(ctx);

        egui::TopBottomPanel::top("status_bar")
            .exact_height(34.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(RichText::new("🎬 ClipSort").strong().size(15.0).color(ACCENT));
                    ui.separator();
                    let status = match &self.session.loaded_path {
                        Some(path) => format!("Video Path: {}", path.display()),
                        None       => "Click play to start sorting".to_string(),
                    };
                    ui.label(RichText::new(status).size(12.0).weak());
                });
            });

        egui::TopBottomPanel::bottom("controls_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.controls.ui(ui, &self.session, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            // Hand the monitor the current live frame and clock; the
            // module trait only carries the session.
            self.monitor.current_frame = self.context.playback.frame_tex.clone();
            self.monitor.position      = self.context.playback.current_time;
            self.monitor.duration      = self.context.playback.duration;
            self.monitor.ui(ui, &self.session, &mut self.pending_cmds);
        });

        // ── Process commands emitted this frame ───────────────────────────────
        let cmds: Vec<SessionCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, ctx);
        }

        // ── Tick the non-rendering audio module ───────────────────────────────
        self.audio.tick(&self.session, &mut self.context);

        // ── Advance the playback clock ────────────────────────────────────────
        if self.session.playback == PlaybackState::Playing {
            let dt = ctx.input(|i| i.stable_dt as f64);
            self.context.playback.current_time += dt;
            ctx.request_repaint();
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Resolve key presses through the session's validated bindings.
    /// Unrecognized keys fall through untouched.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        let pressed: Vec<String> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key: egui::Key::Space,
                        pressed: true,
                        repeat: false,
                        ..
                    } => Some("Space".to_string()),
                    // The space key also arrives as Text(" ") — skip it so
                    // one press doesn't toggle play/pause twice.
                    egui::Event::Text(t) if t != " " => Some(t.clone()),
                    _ => None,
                })
                .collect()
        });
        for label in pressed {
            let cmd = self.session.bindings().resolve(&label).map(|a| a.to_command());
            if let Some(cmd) = cmd {
                self.pending_cmds.push(cmd);
            }
        }
    }

    // ── Media polling ─────────────────────────────────────────────────────────

    fn poll_media(&mut self, ctx: &egui::Context) {
        self.context.ingest_player_events(&mut self.session, ctx);
        PlayerModule::poll_frames(&mut self.context, ctx);

        // Deferred reload after a successful sort.
        if let Some(deadline) = self.context.pending_load {
            let now = Instant::now();
            if now >= deadline {
                self.context.pending_load = None;
                self.load_current();
            } else {
                ctx.request_repaint_after(deadline - now);
            }
        }
    }

    // ── Command processing ────────────────────────────────────────────────────

    fn process_command(&mut self, cmd: SessionCommand, ctx: &egui::Context) {
        match cmd {
            SessionCommand::PlayPause => self.play_pause(),
            SessionCommand::Restart   => self.restart(),
            SessionCommand::Sort(folder) => self.sort_into(&folder, ctx),
            SessionCommand::Unsort    => self.unsort(),
        }
    }

    fn play_pause(&mut self) {
        match self.session.playback {
            PlaybackState::Playing => {
                // AudioModule pauses the sink on its next tick.
                self.session.playback = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.session.playback = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                // Covers both the very first play and play-after-EOF
                // (which reloads the clip from the start).
                if self.session.current_name().is_some() {
                    self.load_current();
                }
            }
        }
    }

    fn restart(&mut self) {
        // Only meaningful once a clip is loaded. Reloading plays from
        // zero; it also starts playback when stopped or paused, which is
        // exactly the restart contract.
        if self.session.loaded_path.is_some() {
            self.load_current();
        }
    }

    fn sort_into(&mut self, folder: &str, ctx: &egui::Context) {
        // Precondition first, so a violation leaves playback running.
        if let Err(e) = self.session.check_sortable() {
            dialogs::error("Cannot Sort", &e.to_string());
            return;
        }

        // Release every handle on the source file before moving it — a
        // held handle can make the move fail on some platforms.
        if let Err(e) = self.stop_playback() {
            dialogs::error("Cannot Sort", &format!("{e:#}"));
            return;
        }

        match self.session.sort_current(folder) {
            Ok(SortOutcome::Finished) => {
                clipsort_log!("[session] queue empty — done");
                dialogs::info("Done", "No more videos to sort.");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Ok(SortOutcome::NextQueued) => {
                self.context.pending_load = Some(Instant::now() + RELOAD_DELAY);
                ctx.request_repaint_after(RELOAD_DELAY);
            }
            // Queue, index and undo stack are untouched on failure.
            Err(e) => dialogs::error("Sort Failed", &e.to_string()),
        }
    }

    fn unsort(&mut self) {
        match self.session.unsort() {
            Ok(()) => {
                clipsort_log!(
                    "[session] unsorted back to {:?}",
                    self.session.current_name()
                );
                // Reload and play the restored entry right away.
                self.load_current();
            }
            Err(e) => dialogs::error("Cannot Unsort", &e.to_string()),
        }
    }

    // ── Player plumbing ───────────────────────────────────────────────────────

    /// Load and play the entry at the current index, publishing its path
    /// as the status line. Out-of-bounds is a silent no-op; callers check
    /// bounds first.
    fn load_current(&mut self) {
        let Some(path) = self.session.current_path() else { return };
        let gen = Uuid::new_v4();

        self.context.pending_load = None;
        self.context.audio.reset();
        self.context.playback.begin(gen);
        self.context.player.open(gen, path.clone());

        clipsort_log!("[session] loading {}", path.display());
        self.session.mark_loaded(path);
    }

    /// Stop decode and audio and wait until the source file's handles are
    /// released. Must succeed before any move of that file is attempted.
    fn stop_playback(&mut self) -> anyhow::Result<()> {
        self.context.player.stop_sync(STOP_TIMEOUT)?;
        self.context.audio.reset();
        self.context.playback.clear();
        self.session.mark_stopped();
        Ok(())
    }
}
