use eframe::egui::{self, Pos2, Rect, Ui, vec2};

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, fit_zoom, screen_to_world, world_to_screen};

impl ViewModel {
    /// Layout coordinates are centred on the middle of the configured canvas.
    pub(in crate::app) fn to_screen(&self, rect: Rect, position: Pos2) -> Pos2 {
        let center = vec2(self.config.width, self.config.height) * 0.5;
        world_to_screen(rect, self.pan, self.zoom, position.to_vec2() - center)
    }

    pub(in crate::app) fn fit_to(&mut self, rect: Rect) {
        self.zoom = fit_zoom(rect, vec2(self.config.width, self.config.height));
        self.pan = egui::Vec2::ZERO;
        self.fit_requested = false;
    }

    /// Screen radius for points: slightly under the collision radius so neighbours keep a gap.
    pub(in crate::app) fn point_radius(&self) -> f32 {
        (self.config.collision_radius * 0.86 * self.zoom).clamp(1.5, 40.0)
    }

    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn visible_indices(
        rect: Rect,
        screen_positions: &[Pos2],
        radius: f32,
    ) -> Vec<usize> {
        (0..screen_positions.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], radius))
            .collect()
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        radius: f32,
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
