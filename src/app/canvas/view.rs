use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, pos2, vec2};

use crate::layout::{LayoutMode, lane_rect};
use crate::util::{format_score, short_text};

use super::super::ViewModel;
use super::super::render_utils::{blend_color, dim_color, draw_background};
use super::legend::draw_legend;

const SELECTED_RING: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_RING: Color32 = Color32::from_rgb(103, 196, 255);
const LABEL_COLOR: Color32 = Color32::from_gray(214);

impl ViewModel {
    fn draw_category_guides(&self, painter: &Painter, rect: Rect) {
        if self.config.mode == LayoutMode::PerCategory && self.labels.len() > 1 {
            let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(90, 102, 116, 90));
            for slot in 1..self.labels.len() {
                let lane = lane_rect(slot, self.labels.len(), &self.config);
                painter.line_segment(
                    [
                        self.to_screen(rect, lane.left_top()),
                        self.to_screen(rect, lane.left_bottom()),
                    ],
                    stroke,
                );
            }
        }

        for label in &self.labels {
            let anchor = self.to_screen(rect, label.position);
            let (anchor, align) = match self.config.mode {
                LayoutMode::Global => (anchor + vec2(8.0, 0.0), Align2::LEFT_CENTER),
                LayoutMode::PerCategory => (anchor + vec2(0.0, 8.0), Align2::CENTER_TOP),
            };
            painter.text(
                anchor,
                align,
                label.category.as_str(),
                FontId::proportional(14.0),
                LABEL_COLOR,
            );
        }
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.fit_requested {
            self.fit_to(rect);
        }
        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);

        let canvas = Rect::from_min_max(
            self.to_screen(rect, Pos2::ZERO),
            self.to_screen(rect, pos2(self.config.width, self.config.height)),
        );
        draw_background(&painter, rect, self.pan, self.zoom, canvas);

        if self.session.records().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "This file contains no posts.",
                FontId::proportional(16.0),
                LABEL_COLOR,
            );
            draw_legend(&painter, rect, self.session.color_mode());
            return;
        }

        self.draw_category_guides(&painter, rect);

        let search_matches = self.cached_search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let views = self.session.point_views();
        let radius = self.point_radius();
        let screen_positions = views
            .iter()
            .map(|view| self.to_screen(rect, view.position))
            .collect::<Vec<_>>();
        let visible = Self::visible_indices(rect, &screen_positions, radius);
        let hovered = Self::hovered_index(ui, &visible, &screen_positions, radius);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        // Highlighted points go last so their rings are never covered.
        let draw_order = visible
            .iter()
            .copied()
            .filter(|&index| !views[index].highlighted)
            .chain(
                visible
                    .iter()
                    .copied()
                    .filter(|&index| views[index].highlighted),
            );

        let revision = self.session.revision();
        let mut selection_animating = false;
        for index in draw_order {
            let view = views[index];
            let position = screen_positions[index];
            let is_hovered = hovered == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&view.id));

            let base_color = if search_active && !is_match && !view.highlighted {
                dim_color(view.color, 0.4)
            } else {
                view.color
            };
            let fill = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.3)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("point-selection", revision, view.id)),
                view.highlighted,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            painter.circle_filled(position, radius, fill);
            if selection_mix > 0.0 {
                let halo_strength = (selection_mix * (1.0 - selection_mix) * 4.0).clamp(0.0, 1.0);
                let halo_alpha = (30.0 + (halo_strength * 145.0)) as u8;
                painter.circle_stroke(
                    position,
                    radius + 3.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(
                        1.0 + (halo_strength * 1.6),
                        Color32::from_rgba_unmultiplied(245, 206, 93, halo_alpha),
                    ),
                );
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(1.5 * selection_mix + 0.5, SELECTED_RING),
                );
            } else if is_match && search_active {
                painter.circle_stroke(position, radius, Stroke::new(1.4, SEARCH_RING));
            } else {
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(0.8, Color32::from_rgba_unmultiplied(15, 15, 15, 160)),
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(index) = hovered
            && let Some(record) = self.session.record(views[index].id)
        {
            let panel_text = format!(
                "{}  |  sentiment {}  |  subjectivity {}\n{}",
                record.category,
                format_score(record.sentiment),
                format_score(record.subjectivity),
                short_text(&record.raw_text, 96)
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        draw_legend(&painter, rect, self.session.color_mode());

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
        {
            self.session.on_point_click(views[index].id);
        }
    }
}
