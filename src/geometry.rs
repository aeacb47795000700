//! Geometry contract shared by the layout engine and any renderer.
//!
//! Node shapes are label rectangles centred on the node position: width grows
//! with the label length, height is fixed. Edges are straight segments whose
//! stroke equals the relation weight.

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::config::CanvasConfig;

pub const NODE_HEIGHT: f32 = 28.0;
pub const CHAR_WIDTH: f32 = 8.0;
pub const NODE_PADDING: f32 = 20.0;
pub const MIN_EDGE_STROKE: f32 = 1.0;
pub const EDGE_HIT_SLOP: f32 = 4.0;
pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(15.0, 15.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeShape {
    #[default]
    Label,
    Dot,
}

impl NodeShape {
    /// Separation radius used when no explicit collision radius is configured.
    pub fn collision_radius(self) -> f32 {
        match self {
            Self::Label => 40.0,
            Self::Dot => 18.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFootprint {
    pub width: f32,
    pub height: f32,
    /// Offset from the node position to the shape's top-left corner.
    pub offset: Vec2,
}

impl NodeFootprint {
    pub fn for_label(label: &str) -> Self {
        let chars = label.chars().count() as f32;
        Self {
            width: chars * CHAR_WIDTH + NODE_PADDING,
            height: NODE_HEIGHT,
            offset: vec2(-(chars * (CHAR_WIDTH * 0.5) + NODE_PADDING * 0.5), -NODE_HEIGHT * 0.5),
        }
    }

    pub fn rect_at(&self, center: Pos2) -> Rect {
        Rect::from_min_size(center + self.offset, vec2(self.width, self.height))
    }

    pub fn contains(&self, center: Pos2, point: Pos2) -> bool {
        self.rect_at(center).contains(point)
    }

    /// Minimum distance from each canvas edge that keeps the shape and its
    /// collision circle fully visible.
    pub fn margins(&self, collision_radius: f32) -> Vec2 {
        vec2(
            collision_radius + self.width * 0.5,
            collision_radius + self.height * 0.5,
        )
    }
}

/// Stroke width for a relation weight. Non-positive or non-finite weights fall
/// back to the thinnest visible stroke.
pub fn edge_stroke_width(weight: f64) -> f32 {
    if weight.is_finite() && weight > 0.0 {
        (weight as f32).max(f32::MIN_POSITIVE)
    } else {
        MIN_EDGE_STROKE
    }
}

pub fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub fn edge_contains(start: Pos2, end: Pos2, weight: f64, point: Pos2) -> bool {
    let reach = (edge_stroke_width(weight) * 0.5).max(EDGE_HIT_SLOP);
    distance_to_segment(point, start, end) <= reach
}

pub fn tooltip_anchor(pointer: Pos2) -> Pos2 {
    pointer + TOOLTIP_OFFSET
}

/// Logical canvas that is scaled uniformly and centred into any container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub width: f32,
    pub height: f32,
}

impl From<CanvasConfig> for ViewBox {
    fn from(canvas: CanvasConfig) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub origin: Pos2,
}

impl ViewBox {
    pub fn fit(&self, container: Rect) -> ViewTransform {
        let scale_x = container.width() / self.width.max(f32::EPSILON);
        let scale_y = container.height() / self.height.max(f32::EPSILON);
        let scale = scale_x.min(scale_y).max(f32::EPSILON);
        let used = vec2(self.width * scale, self.height * scale);
        let origin = container.center() - used * 0.5;
        ViewTransform { scale, origin }
    }
}

impl ViewTransform {
    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        self.origin + canvas.to_vec2() * self.scale
    }

    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.origin.x) / self.scale,
            (screen.y - self.origin.y) / self.scale,
        )
    }
}
