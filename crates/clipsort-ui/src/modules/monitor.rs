// crates/clipsort-ui/src/modules/monitor.rs

use clipsort_core::commands::SessionCommand;
use clipsort_core::helpers::time::{format_duration, format_time};
use clipsort_core::session::{PlaybackState, SortSession};
use egui::{Color32, Pos2, Rect, RichText, Sense, Stroke, Ui, Vec2};

use super::SessionModule;
use crate::theme::{ACCENT, DARK_BORDER, DARK_TEXT_DIM};

/// Info line height under the canvas.
const INFO_H: f32 = 22.0;

/// Fallback canvas ratio before the first decoded frame reports its size.
const DEFAULT_RATIO: f32 = 16.0 / 9.0;

pub struct MonitorModule {
    /// The live decoded frame, set by app.rs each frame before ui() is
    /// called (the trait signature only carries the session).
    pub current_frame: Option<egui::TextureHandle>,
    /// Playback position and probed duration, set the same way.
    pub position: f64,
    pub duration: Option<f64>,
}

impl MonitorModule {
    pub fn new() -> Self {
        Self {
            current_frame: None,
            position:      0.0,
            duration:      None,
        }
    }
}

impl SessionModule for MonitorModule {
    fn name(&self) -> &str { "Monitor" }

    fn ui(&mut self, ui: &mut Ui, session: &SortSession, _cmd: &mut Vec<SessionCommand>) {
        ui.vertical(|ui| {
            // ── Video canvas ─────────────────────────────────────────────────
            // Full width allocated, canvas drawn centered inside it.
            let ratio = self.current_frame.as_ref()
                .map(|tex| {
                    let size = tex.size_vec2();
                    if size.y > 0.0 { size.x / size.y } else { DEFAULT_RATIO }
                })
                .unwrap_or(DEFAULT_RATIO);

            let panel_w = ui.available_width();
            let panel_h = (ui.available_height() - INFO_H - 8.0).max(80.0);

            let (canvas_w, canvas_h) = {
                let h = panel_w / ratio;
                if h <= panel_h { (panel_w, h) } else { (panel_h * ratio, panel_h) }
            };

            let (outer_rect, _) = ui.allocate_exact_size(
                Vec2::new(panel_w, canvas_h.max(80.0)), Sense::hover());
            let canvas = Rect::from_center_size(
                outer_rect.center(), Vec2::new(canvas_w, canvas_h));
            let painter = ui.painter();

            if session.playback == PlaybackState::Playing {
                painter.rect_stroke(canvas.expand(2.0), 4.0,
                    Stroke::new(1.5, ACCENT.gamma_multiply(0.55)),
                    egui::StrokeKind::Outside);
            } else {
                painter.rect_stroke(canvas.expand(1.0), 4.0,
                    Stroke::new(1.0, DARK_BORDER),
                    egui::StrokeKind::Outside);
            }
            painter.rect_filled(canvas, 3.0, Color32::BLACK);

            if let Some(tex) = &self.current_frame {
                painter.image(tex.id(), canvas,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE);
            } else if let Some(path) = &session.loaded_path {
                // Loaded but no frame yet — name + spinner while the
                // decoder warms up.
                let name = path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                painter.text(
                    canvas.center() - egui::vec2(0.0, 20.0),
                    egui::Align2::CENTER_CENTER,
                    name,
                    egui::FontId::proportional(13.0),
                    Color32::from_gray(70));
                let t  = ui.input(|i| i.time) as f32;
                let cx = canvas.center() + egui::vec2(0.0, 20.0);
                let r  = 12.0_f32;
                painter.circle_stroke(cx, r, Stroke::new(1.5, Color32::from_gray(35)));
                let a = t * 3.5;
                painter.line_segment(
                    [cx, cx + egui::vec2(a.cos() * r, a.sin() * r)],
                    Stroke::new(2.0, ACCENT));
                ui.ctx().request_repaint();
            } else {
                painter.text(canvas.center(), egui::Align2::CENTER_CENTER,
                    "NO SIGNAL", egui::FontId::monospace(14.0), Color32::from_gray(40));
                let mut y = canvas.min.y;
                while y < canvas.max.y {
                    painter.line_segment(
                        [Pos2::new(canvas.min.x, y), Pos2::new(canvas.max.x, y)],
                        Stroke::new(0.5, Color32::from_rgba_unmultiplied(255, 255, 255, 3)));
                    y += 4.0;
                }
            }

            ui.add_space(4.0);

            // ── Timecode readout ─────────────────────────────────────────────
            if session.loaded_path.is_some() {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format_time(self.position))
                        .monospace().size(12.0).color(ACCENT));
                    if let Some(dur) = self.duration {
                        ui.label(RichText::new(format!("/ {}", format_duration(dur)))
                            .monospace().size(12.0).color(DARK_TEXT_DIM));
                    }
                    let state = match session.playback {
                        PlaybackState::Playing => "▶",
                        PlaybackState::Paused  => "⏸",
                        PlaybackState::Stopped => "⏹",
                    };
                    ui.label(RichText::new(state).size(12.0).color(DARK_TEXT_DIM));
                });
            }
        });
    }
}
