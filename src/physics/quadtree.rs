//! Flat Barnes-Hut tree rebuilt for every force pass.
//!
//! Cells live in one arena and each owns a contiguous run of `order`, so any
//! cell can list the bodies below it without walking its children. Every cell
//! caches what the force passes prune on: the summed charge with its centroid
//! for the many-body pass, and the largest body radius for collision.

use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_BODIES: usize = 8;
const MAX_DEPTH: u8 = 12;

pub(super) const ROOT: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    /// Bit 0 is set east of the centre, bit 1 south of it.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quarter(self, quadrant: usize) -> Self {
        let step = self.half * 0.5;
        let shift = |bit: usize| if quadrant & bit == 0 { -step } else { step };
        Self {
            center: self.center + vec2(shift(1), shift(2)),
            half: step,
        }
    }

    pub(super) fn width(self) -> f32 {
        self.half * 2.0
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half && offset.y <= self.half
    }

    /// Distance from `point` to the nearest point of the square; zero inside.
    pub(super) fn gap_to(self, point: Vec2) -> f32 {
        ((point - self.center).abs() - Vec2::splat(self.half))
            .max(Vec2::ZERO)
            .length()
    }
}

#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    /// Sum of the per-body charges below this cell.
    pub(super) charge: f32,
    /// Centroid weighted by charge magnitude.
    pub(super) centroid: Vec2,
    /// Largest collision radius below this cell.
    pub(super) reach: f32,
    span: Range<usize>,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = usize> + '_ {
        self.children.iter().flatten().copied()
    }
}

/// Per-body inputs, indexed like the position buffer.
#[derive(Clone, Copy)]
pub(super) struct Bodies<'a> {
    pub(super) points: &'a [Vec2],
    pub(super) charges: &'a [f32],
    pub(super) radii: &'a [f32],
}

pub(super) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl QuadTree {
    /// `None` when there are no bodies or a coordinate is not finite.
    pub(super) fn build(bodies: Bodies<'_>) -> Option<Self> {
        let square = Square::enclosing(bodies.points)?;
        let mut tree = Self {
            cells: Vec::new(),
            order: (0..bodies.points.len()).collect(),
        };
        tree.subdivide(square, 0..bodies.points.len(), 0, bodies);
        Some(tree)
    }

    pub(super) fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    pub(super) fn bodies(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.span.clone()]
    }

    fn subdivide(
        &mut self,
        square: Square,
        span: Range<usize>,
        depth: u8,
        bodies: Bodies<'_>,
    ) -> usize {
        let id = self.cells.len();
        self.cells.push(summarise(square, span.clone(), &self.order, bodies));

        if depth >= MAX_DEPTH || span.len() <= LEAF_BODIES {
            return id;
        }

        let run = &mut self.order[span.clone()];
        run.sort_unstable_by_key(|&body| square.quadrant(bodies.points[body]));
        let mut counts = [0usize; 4];
        for &body in run.iter() {
            counts[square.quadrant(bodies.points[body])] += 1;
        }
        // Everything in one quadrant means the bodies coincide.
        if counts.contains(&span.len()) {
            return id;
        }

        let mut start = span.start;
        for (quadrant, count) in counts.into_iter().enumerate() {
            if count == 0 {
                continue;
            }
            let child =
                self.subdivide(square.quarter(quadrant), start..start + count, depth + 1, bodies);
            self.cells[id].children[quadrant] = Some(child);
            start += count;
        }
        id
    }
}

fn summarise(square: Square, span: Range<usize>, order: &[usize], bodies: Bodies<'_>) -> Cell {
    let mut charge = 0.0;
    let mut magnitude = 0.0;
    let mut weighted = Vec2::ZERO;
    let mut plain = Vec2::ZERO;
    let mut reach = 0.0_f32;

    for &body in &order[span.clone()] {
        let point = bodies.points[body];
        let value = bodies.charges[body];
        charge += value;
        magnitude += value.abs();
        weighted += point * value.abs();
        plain += point;
        reach = reach.max(bodies.radii[body]);
    }

    let centroid = if magnitude > f32::EPSILON {
        weighted / magnitude
    } else {
        plain / (span.len().max(1) as f32)
    };

    Cell {
        square,
        charge,
        centroid,
        reach,
        span,
        children: [None; 4],
    }
}
