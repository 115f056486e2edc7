use eframe::egui::{self, RichText, Ui};

use crate::data::RecordId;
use crate::util::format_score;

use super::super::ViewModel;

struct SelectedRow {
    id: RecordId,
    text: String,
    caption: String,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selected Posts");
        ui.add_space(6.0);

        if self.session.selection().is_empty() {
            ui.label("Click a point to read its post.");
            return;
        }

        let rows = self
            .session
            .selected_records()
            .into_iter()
            .map(|record| SelectedRow {
                id: record.id,
                text: record.raw_text.clone(),
                caption: format!(
                    "{}  |  sentiment {}  |  subjectivity {}",
                    record.category,
                    format_score(record.sentiment),
                    format_score(record.subjectivity)
                ),
            })
            .collect::<Vec<_>>();

        ui.horizontal(|ui| {
            ui.label(format!("{} selected, newest first", rows.len()));
            if ui.button("Clear selection").clicked() {
                self.session.clear_selection();
            }
        });
        ui.separator();

        let mut deselect = None;
        egui::ScrollArea::vertical()
            .id_salt("selected_posts_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for row in &rows {
                    ui.label(RichText::new(row.text.as_str()).strong());
                    ui.horizontal(|ui| {
                        ui.small(row.caption.as_str());
                        if ui.small_button("Deselect").clicked() {
                            deselect = Some(row.id);
                        }
                    });
                    ui.separator();
                }
            });

        if let Some(id) = deselect {
            self.session.on_point_click(id);
        }
    }
}
