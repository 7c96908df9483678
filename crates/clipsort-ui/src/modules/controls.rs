// crates/clipsort-ui/src/modules/controls.rs
//
// One button per action: the three core actions, then one per destination
// folder. Folder buttons are generated from the session's folder map, with
// each handler capturing its folder name by value — no late binding.

use clipsort_core::commands::SessionCommand;
use clipsort_core::session::SortSession;
use egui::{RichText, Ui};

use super::SessionModule;
use crate::theme::{ACCENT, DARK_TEXT_DIM};

const BTN_H: f32 = 30.0;

pub struct ControlsModule;

impl SessionModule for ControlsModule {
    fn name(&self) -> &str { "Controls" }

    fn ui(&mut self, ui: &mut Ui, session: &SortSession, cmd: &mut Vec<SessionCommand>) {
        ui.add_space(6.0);

        // ── Core actions ─────────────────────────────────────────────────────
        let core = session.core_buttons();
        ui.horizontal(|ui| {
            if action_button(ui, &caption("Play / Pause", &core.play_pause)) {
                cmd.push(SessionCommand::PlayPause);
            }
            if action_button(ui, &caption("Restart", &core.restart)) {
                cmd.push(SessionCommand::Restart);
            }
            if action_button(ui, &caption("Unsort", &core.unsort)) {
                cmd.push(SessionCommand::Unsort);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(format!("{} to go", session.queue().len()))
                    .size(11.0).color(DARK_TEXT_DIM));
                if session.undo_len() > 0 {
                    ui.label(RichText::new(format!("{} sorted", session.undo_len()))
                        .size(11.0).color(ACCENT));
                }
            });
        });

        ui.separator();

        // ── Destination folders ──────────────────────────────────────────────
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);
            for folder in session.folders() {
                if action_button(ui, &caption(&folder.display, &folder.key)) {
                    cmd.push(SessionCommand::Sort(folder.name.clone()));
                }
            }
        });

        ui.add_space(6.0);
    }
}

fn action_button(ui: &mut Ui, label: &str) -> bool {
    ui.add(egui::Button::new(RichText::new(label).size(12.0))
        .min_size(egui::vec2(0.0, BTN_H)))
        .clicked()
}

/// Button caption: the action's display name plus its bound key.
fn caption(name: &str, key: &str) -> String {
    format!("{name} ({key})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captions_show_name_and_key() {
        assert_eq!(caption("Play / Pause", "Space"), "Play / Pause (Space)");
        assert_eq!(caption("Major Seizure", "1"), "Major Seizure (1)");
    }
}
