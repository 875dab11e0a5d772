//! Header bar with field counters

use eframe::egui;

use super::{color32, NeonViewer};
use crate::theme::colors;

impl NeonViewer {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        let Some(sim) = self.sim.as_ref() else {
            ui.label(egui::RichText::new("No surface").color(color32(colors::TEXT_MUTED)));
            return;
        };
        let stats = sim.last_stats();
        let (raster_w, raster_h) = sim.surface().raster();
        let tracking = sim.pointer().is_tracking();

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("neon field").color(color32(colors::DOT)));

            // RIGHT: stats (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let muted = |text: String| egui::RichText::new(text).color(color32(colors::TEXT_MUTED));

                ui.label(muted(format!("{}x{} px", raster_w, raster_h)));
                ui.label(muted("/".into()));
                ui.label(muted(format!("{} links", stats.links)));
                ui.label(muted("/".into()));
                ui.label(muted(format!("{} particles", stats.dots)));
                ui.label(muted("/".into()));
                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(color32(colors::TEXT_SECONDARY)),
                );

                ui.add_space(10.0);

                let (pointer_color, pointer_text) = if tracking {
                    (color32(colors::LINK), "Pointer")
                } else {
                    (color32(colors::TEXT_MUTED), "Idle")
                };
                ui.colored_label(pointer_color, pointer_text);
            });
        });
    }
}
