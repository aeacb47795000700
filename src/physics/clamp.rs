use eframe::egui::{Pos2, Vec2, pos2};

use crate::config::CanvasConfig;

/// Allowed `[min, max]` range on one axis. Collapses to the midpoint when the
/// margins leave no room.
fn axis_range(extent: f32, margin: f32) -> (f32, f32) {
    let margin = margin.max(0.0);
    if margin * 2.0 >= extent {
        let mid = extent * 0.5;
        (mid, mid)
    } else {
        (margin, extent - margin)
    }
}

pub fn clamp_point(point: Pos2, margin: Vec2, canvas: CanvasConfig) -> Pos2 {
    let (min_x, max_x) = axis_range(canvas.width, margin.x);
    let (min_y, max_y) = axis_range(canvas.height, margin.y);
    pos2(point.x.clamp(min_x, max_x), point.y.clamp(min_y, max_y))
}

/// Hard position override applied after integration. Velocity pointing out of
/// the canvas on a clamped axis is discarded.
pub(super) fn clamp_to_canvas(
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    margins: &[Vec2],
    canvas: CanvasConfig,
) {
    let bodies = positions.iter_mut().zip(velocities.iter_mut()).zip(margins);
    for ((position, velocity), margin) in bodies {
        let (min_x, max_x) = axis_range(canvas.width, margin.x);
        let (min_y, max_y) = axis_range(canvas.height, margin.y);

        if position.x < min_x {
            position.x = min_x;
            velocity.x = velocity.x.max(0.0);
        } else if position.x > max_x {
            position.x = max_x;
            velocity.x = velocity.x.min(0.0);
        }

        if position.y < min_y {
            position.y = min_y;
            velocity.y = velocity.y.max(0.0);
        } else if position.y > max_y {
            position.y = max_y;
            velocity.y = velocity.y.min(0.0);
        }

        // A NaN can only come from a degenerate config; pin it to the centre.
        if !position.x.is_finite() || !position.y.is_finite() {
            *position = canvas.center().to_vec2();
            *velocity = Vec2::ZERO;
        }
    }
}
