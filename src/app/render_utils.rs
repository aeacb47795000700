use eframe::egui::{Color32, Painter, Rect, Stroke, StrokeKind};

pub(super) const NODE_FILL: Color32 = Color32::from_rgb(54, 96, 146);
pub(super) const MAIN_NODE_FILL: Color32 = Color32::from_rgb(196, 120, 58);
pub(super) const HOVER_FILL: Color32 = Color32::from_rgb(255, 164, 101);
pub(super) const SEARCH_FILL: Color32 = Color32::from_rgb(103, 196, 255);
pub(super) const EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(120, 128, 140, 170);
pub(super) const EDGE_HOVER_COLOR: Color32 = Color32::from_rgb(241, 146, 94);

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

/// Fills the panel and outlines the logical canvas inside it.
pub(super) fn draw_background(painter: &Painter, panel: Rect, canvas: Rect) {
    painter.rect_filled(panel, 0.0, Color32::from_rgb(19, 23, 29));
    painter.rect_filled(canvas, 4.0, Color32::from_rgb(26, 31, 39));
    painter.rect_stroke(
        canvas,
        4.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 120)),
        StrokeKind::Inside,
    );
}

pub(super) fn node_fill(
    is_main: bool,
    hovered: bool,
    matched: bool,
    search_active: bool,
) -> Color32 {
    let base = if is_main { MAIN_NODE_FILL } else { NODE_FILL };
    if hovered {
        HOVER_FILL
    } else if matched {
        blend_color(base, SEARCH_FILL, 0.68)
    } else if search_active {
        dim_color(base, 0.38)
    } else {
        base
    }
}
