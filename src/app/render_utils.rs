use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

const FIT_PADDING: f32 = 0.92;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Dark backdrop with a faint grid, plus the outline of the layout canvas.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32, canvas: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
        y += step;
    }

    painter.rect_filled(canvas, 4.0, Color32::from_rgba_unmultiplied(28, 34, 42, 200));
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Zoom that fits a `canvas_size` layout into `rect` with a small margin.
pub(super) fn fit_zoom(rect: Rect, canvas_size: Vec2) -> f32 {
    if canvas_size.x <= 0.0 || canvas_size.y <= 0.0 {
        return 1.0;
    }
    let zoom = (rect.width() / canvas_size.x).min(rect.height() / canvas_size.y) * FIT_PADDING;
    if zoom.is_finite() && zoom > 0.0 {
        zoom.clamp(0.05, 6.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Color32, Rect, pos2, vec2};

    use super::{blend_color, circle_visible, fit_zoom, screen_to_world, world_to_screen};

    #[test]
    fn screen_mapping_inverts() {
        let rect = Rect::from_min_max(pos2(10.0, 20.0), pos2(410.0, 320.0));
        let pan = vec2(-15.0, 8.0);
        let world = vec2(120.0, -44.0);
        let screen = world_to_screen(rect, pan, 1.7, world);
        let back = screen_to_world(rect, pan, 1.7, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn fit_zoom_uses_the_tighter_axis() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 800.0));
        let zoom = fit_zoom(rect, vec2(800.0, 800.0));
        assert!((zoom - 0.46).abs() < 1e-4);
        assert_eq!(fit_zoom(rect, vec2(0.0, 10.0)), 1.0);
    }

    #[test]
    fn blend_endpoints() {
        let base = Color32::from_rgb(0, 0, 0);
        let overlay = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(base, overlay, 0.0), base);
        assert_eq!(blend_color(base, overlay, 1.0), overlay);
    }

    #[test]
    fn circles_partially_inside_are_visible() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(-3.0, 50.0), 5.0));
        assert!(!circle_visible(rect, pos2(-10.0, 50.0), 5.0));
    }
}
