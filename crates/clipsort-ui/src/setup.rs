// crates/clipsort-ui/src/setup.rs
//
// First-run setup view: the interactive equivalent of clipsort.toml.
// Collects the unsorted-videos path, the core-action keys and the
// folder/key table; optionally persists them back to the config file.

use std::path::PathBuf;

use clipsort_core::config::{CoreButtons, SortConfig};
use egui::{Grid, RichText, TextEdit, Ui};
use rfd::FileDialog;

use crate::dialogs;
use crate::theme::{ACCENT, DARK_TEXT_DIM};

pub enum SetupOutcome {
    Stay,
    /// Validated config, ready to start a session. `save` mirrors the
    /// "save as defaults" checkbox.
    Start { config: SortConfig, save: bool },
}

struct FolderRow {
    name: String,
    key:  String,
}

pub struct SetupView {
    path_text:     String,
    play_pause:    String,
    restart:       String,
    unsort:        String,
    folders:       Vec<FolderRow>,
    save_defaults: bool,
}

impl SetupView {
    pub fn new() -> Self {
        let core = CoreButtons::default();
        Self {
            path_text:     String::new(),
            play_pause:    core.play_pause,
            restart:       core.restart,
            unsort:        core.unsort,
            folders:       vec![FolderRow { name: String::new(), key: String::new() }],
            save_defaults: false,
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> SetupOutcome {
        let mut outcome = SetupOutcome::Stay;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(12.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("🎬 ClipSort").strong().size(20.0).color(ACCENT));
                    ui.label(RichText::new("Configure keybindings, folders, and video path")
                        .size(12.0).color(DARK_TEXT_DIM));
                });
                ui.add_space(12.0);
                ui.separator();

                // ── Source folder ────────────────────────────────────────────
                ui.add_space(8.0);
                ui.label(RichText::new("Path to unsorted videos").size(12.0).strong());
                ui.horizontal(|ui| {
                    ui.add(TextEdit::singleline(&mut self.path_text)
                        .hint_text("/path/to/unsorted")
                        .desired_width(ui.available_width() - 90.0));
                    if ui.button("Browse…").clicked() {
                        if let Some(dir) = FileDialog::new().pick_folder() {
                            self.path_text = dir.display().to_string();
                        }
                    }
                });

                // ── Core keys ────────────────────────────────────────────────
                ui.add_space(10.0);
                ui.label(RichText::new("Core keys").size(12.0).strong());
                Grid::new("core_keys").num_columns(2).spacing([10.0, 6.0]).show(ui, |ui| {
                    ui.label("Play / Pause");
                    ui.add(TextEdit::singleline(&mut self.play_pause).desired_width(80.0));
                    ui.end_row();
                    ui.label("Restart");
                    ui.add(TextEdit::singleline(&mut self.restart).desired_width(80.0));
                    ui.end_row();
                    ui.label("Unsort");
                    ui.add(TextEdit::singleline(&mut self.unsort).desired_width(80.0));
                    ui.end_row();
                });

                // ── Sorting categories ───────────────────────────────────────
                ui.add_space(10.0);
                ui.label(RichText::new("Sorting categories").size(12.0).strong());
                ui.label(RichText::new("Folder name (snake_case) and the key that sorts into it")
                    .size(10.0).color(DARK_TEXT_DIM));
                self.folder_rows(ui);
                if ui.button("＋ Add sorting category").clicked() {
                    self.folders.push(FolderRow { name: String::new(), key: String::new() });
                }

                // ── Start ────────────────────────────────────────────────────
                ui.add_space(12.0);
                ui.checkbox(&mut self.save_defaults, "Save these settings as defaults");
                ui.add_space(6.0);
                if ui.add(egui::Button::new(RichText::new("Start sorting").size(13.0))
                    .min_size(egui::vec2(140.0, 32.0)))
                    .clicked()
                {
                    let config = self.build_config();
                    match config.validate() {
                        Ok(())  => outcome = SetupOutcome::Start { config, save: self.save_defaults },
                        Err(e)  => dialogs::error("Invalid Settings", &e.to_string()),
                    }
                }
                ui.add_space(12.0);
            });
        });

        outcome
    }

    fn folder_rows(&mut self, ui: &mut Ui) {
        let mut remove: Option<usize> = None;
        Grid::new("folder_rows").num_columns(3).spacing([10.0, 6.0]).show(ui, |ui| {
            for (i, row) in self.folders.iter_mut().enumerate() {
                ui.add(TextEdit::singleline(&mut row.name)
                    .hint_text("folder_name")
                    .desired_width(200.0));
                ui.add(TextEdit::singleline(&mut row.key)
                    .hint_text("key")
                    .desired_width(60.0));
                if ui.button("✕").clicked() {
                    remove = Some(i);
                }
                ui.end_row();
            }
        });
        if let Some(i) = remove {
            self.folders.remove(i);
        }
    }

    /// Collect the form into a SortConfig. Rows with an empty folder name
    /// are ignored; everything else is validated by the caller.
    fn build_config(&self) -> SortConfig {
        let mut config = SortConfig {
            unsorted_path: PathBuf::from(self.path_text.trim()),
            core_buttons: CoreButtons {
                play_pause: self.play_pause.trim().to_string(),
                restart:    self.restart.trim().to_string(),
                unsort:     self.unsort.trim().to_string(),
            },
            folders_to_sort: Default::default(),
        };
        for row in &self.folders {
            let name = row.name.trim();
            if name.is_empty() {
                continue;
            }
            config.folders_to_sort.insert(name.to_string(), row.key.trim().to_string());
        }
        config
    }
}
