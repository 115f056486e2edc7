use eframe::egui::{
    Align2, Color32, FontId, Mesh, Painter, Rect, Shape, Stroke, StrokeKind, pos2, vec2,
};

use crate::color::{ColorMode, gradient_stops};

const BAR_SIZE: [f32; 2] = [15.0, 150.0];
const BAR_OFFSET: [f32; 2] = [-100.0, 50.0];

/// Vertical gradient bar in the top-right corner, high end up.
pub(super) fn draw_legend(painter: &Painter, rect: Rect, mode: ColorMode) {
    let bar = Rect::from_min_size(
        rect.right_top() + vec2(BAR_OFFSET[0], BAR_OFFSET[1]),
        vec2(BAR_SIZE[0], BAR_SIZE[1]),
    );

    let mut mesh = Mesh::default();
    for pair in gradient_stops(mode).windows(2) {
        let [(low_offset, low_color), (high_offset, high_color)] = pair else {
            continue;
        };
        let bottom = bar.bottom() - bar.height() * *low_offset;
        let top = bar.bottom() - bar.height() * *high_offset;

        let base = mesh.vertices.len() as u32;
        mesh.colored_vertex(pos2(bar.left(), bottom), *low_color);
        mesh.colored_vertex(pos2(bar.right(), bottom), *low_color);
        mesh.colored_vertex(pos2(bar.right(), top), *high_color);
        mesh.colored_vertex(pos2(bar.left(), top), *high_color);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    painter.add(Shape::mesh(mesh));
    painter.rect_stroke(
        bar,
        0.0,
        Stroke::new(1.0, Color32::from_gray(90)),
        StrokeKind::Outside,
    );

    let (low, high) = mode.legend_labels();
    let text_color = Color32::from_gray(225);
    painter.text(
        bar.center_top() - vec2(0.0, 18.0),
        Align2::CENTER_BOTTOM,
        mode.label(),
        FontId::proportional(13.0),
        text_color,
    );
    painter.text(
        bar.center_top() - vec2(0.0, 4.0),
        Align2::CENTER_BOTTOM,
        high,
        FontId::proportional(12.0),
        text_color,
    );
    painter.text(
        bar.center_bottom() + vec2(0.0, 4.0),
        Align2::CENTER_TOP,
        low,
        FontId::proportional(12.0),
        text_color,
    );
}
