use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        self.poll_layout(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("sentiment-swarm");
                    ui.separator();
                    ui.label(format!("file: {}", self.source));
                    match self.truncated_from {
                        Some(total) => ui.label(format!(
                            "posts: {} of {total}",
                            self.session.records().len()
                        )),
                        None => ui.label(format!("posts: {}", self.session.records().len())),
                    };
                    ui.label(format!("categories: {}", self.categories.len()));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload file"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Fit view").clicked() {
                        self.fit_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                            ui.label("loading...");
                        }
                        ui.label(format!("selected: {}", self.session.selection().len()));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_canvas(ui));
    }
}
