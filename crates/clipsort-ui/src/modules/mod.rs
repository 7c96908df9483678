// crates/clipsort-ui/src/modules/mod.rs
//
// Module registry. The two panels (monitor, controls) implement
// SessionModule; PlayerModule and AudioModule are non-rendering and are
// driven directly from app.rs each frame.
//
// To add a new panel:
//   1. Create modules/mypanel.rs implementing SessionModule
//   2. Add `pub mod mypanel;` below
//   3. Call it from the panel layout in app.rs

pub mod audio_module;
pub mod controls;
pub mod monitor;
pub mod player_module;

use clipsort_core::commands::SessionCommand;
use clipsort_core::session::SortSession;
use egui::Ui;

/// Every rendered panel implements this trait.
/// Modules read session state and emit commands — they never mutate
/// state directly.
pub trait SessionModule {
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, session: &SortSession, cmd: &mut Vec<SessionCommand>);
}
