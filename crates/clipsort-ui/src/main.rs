#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod dialogs;
mod helpers;
mod modules;
mod setup;
mod theme;

use clipsort_core::config;
use clipsort_core::session::SortSession;

fn main() -> eframe::Result {
    clipsort_media::init().expect("FFmpeg init failed");

    // Resolve configuration before the window opens: a saved config file
    // yields a ready session (its destination folders created, its queue
    // scanned); no file means the app starts on the setup view instead.
    let boot = match bootstrap() {
        Ok(boot) => boot,
        Err(msg) => {
            dialogs::error("ClipSort", &msg);
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("🎬 ClipSort")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ClipSort",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::ClipSortApp::new(cc, boot)))),
    )
}

/// Build a session from the saved config file, if one exists.
///
/// A present-but-invalid file is fatal (the user edits the file), as is an
/// empty queue — both are reported via dialog and the session never starts.
fn bootstrap() -> Result<Option<SortSession>, String> {
    let Some(config) = config::load().map_err(|e| e.to_string())? else {
        return Ok(None);
    };
    config.validate().map_err(|e| e.to_string())?;
    SortSession::new(config).map(Some).map_err(|e| e.to_string())
}
