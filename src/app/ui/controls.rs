use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::ColorMode;
use crate::layout::{LayoutMode, UnmappedCategoryPolicy};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Swarm Controls");
        ui.add_space(6.0);

        ui.label("Search posts");
        ui.text_edit_singleline(&mut self.search);
        if let Some(matches) = self.cached_search_matches() {
            ui.small(format!("{} matching posts", matches.len()));
        }

        ui.separator();
        ui.label(RichText::new("Color by").strong());
        ui.horizontal(|ui| {
            for mode in ColorMode::ALL {
                if ui
                    .selectable_label(self.session.color_mode() == mode, mode.label())
                    .clicked()
                {
                    self.session.on_color_mode_change(mode);
                }
            }
        });

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        let mut mode_changed = false;
        ui.horizontal(|ui| {
            for mode in LayoutMode::ALL {
                mode_changed |= ui
                    .selectable_value(&mut self.draft.mode, mode, mode.label())
                    .changed();
            }
        });

        egui::CollapsingHeader::new("Forces")
            .default_open(true)
            .show(ui, |ui| self.draw_force_sliders(ui));

        egui::CollapsingHeader::new("Solver")
            .default_open(false)
            .show(ui, |ui| self.draw_solver_settings(ui));

        ui.add_space(6.0);
        let mut rerun = mode_changed;
        ui.horizontal(|ui| {
            rerun |= ui
                .add_enabled(!self.is_solving(), egui::Button::new("Re-run layout"))
                .clicked();
            if ui.button("Reset").clicked() {
                self.draft = self.defaults.clone();
                rerun = true;
            }
        });
        if rerun {
            self.request_layout();
        }

        if self.is_solving() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Solving layout...");
            });
        }
        if let Some(error) = &self.layout_error {
            ui.label(RichText::new(error.as_str()).color(Color32::from_rgb(235, 110, 100)));
        }
    }

    fn draw_force_sliders(&mut self, ui: &mut Ui) {
        let draft = &mut self.draft;
        ui.add(egui::Slider::new(&mut draft.attraction_strength, 0.0..=3.0).text("Attraction"));
        ui.add(egui::Slider::new(&mut draft.centering_strength, 0.0..=1.0).text("Centering"));
        ui.add(egui::Slider::new(&mut draft.repulsion_strength, 0.0..=80.0).text("Repulsion"));
        ui.add(egui::Slider::new(&mut draft.collision_radius, 1.0..=20.0).text("Collision radius"));
    }

    fn draw_solver_settings(&mut self, ui: &mut Ui) {
        let draft = &mut self.draft;
        ui.add(egui::Slider::new(&mut draft.step_count, 0..=1000).text("Steps"));
        ui.add(
            egui::Slider::new(&mut draft.damping_factor, 0.001..=0.2)
                .logarithmic(true)
                .text("Damping"),
        );
        ui.add(egui::Slider::new(&mut draft.velocity_decay, 0.05..=0.95).text("Velocity decay"));
        ui.add(egui::Slider::new(&mut draft.settle_passes, 0..=256).text("Settle passes"));
        ui.horizontal(|ui| {
            ui.label("Seed");
            ui.add(egui::DragValue::new(&mut draft.seed));
        });
        ui.horizontal(|ui| {
            ui.label("Unmapped categories");
            ui.selectable_value(
                &mut draft.unmapped_category,
                UnmappedCategoryPolicy::Fallback,
                "Unknown region",
            );
            ui.selectable_value(
                &mut draft.unmapped_category,
                UnmappedCategoryPolicy::Reject,
                "Reject",
            );
        });
    }
}
