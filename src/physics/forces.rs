use eframe::egui::{Vec2, vec2};

use crate::util::fallback_direction;

use super::quadtree::{Bodies, QuadTree, ROOT};

/// Resolved spring between two distinct node indices.
#[derive(Clone, Copy, Debug)]
pub(super) struct Spring {
    pub(super) source: usize,
    pub(super) target: usize,
    /// `1 / min(degree)`: hubs are pulled less hard than leaves.
    pub(super) strength: f32,
    /// Share of the correction taken by the target.
    pub(super) bias: f32,
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) alpha: f32,
    pub(super) theta_sq: f32,
    pub(super) distance_min_sq: f32,
}

fn direction_or_fallback(delta: Vec2, a: usize, b: usize) -> (Vec2, f32) {
    let distance = delta.length();
    if distance > 1e-4 {
        (delta / distance, distance)
    } else {
        let (x, y) = fallback_direction(a, b);
        (vec2(x, y), 0.0)
    }
}

pub(super) fn apply_springs(
    springs: &[Spring],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    link_distance: f32,
    alpha: f32,
) {
    for spring in springs {
        let predicted_source = positions[spring.source] + velocities[spring.source];
        let predicted_target = positions[spring.target] + velocities[spring.target];
        let (direction, distance) = direction_or_fallback(
            predicted_target - predicted_source,
            spring.source,
            spring.target,
        );

        let stretch = (distance - link_distance) * alpha * spring.strength;
        let correction = direction * stretch;

        velocities[spring.target] -= correction * spring.bias;
        velocities[spring.source] += correction * (1.0 - spring.bias);
    }
}

/// Velocity change on a body at `delta` from a source of `charge`.
fn coulomb(delta: Vec2, charge: f32, distance_min_sq: f32) -> Vec2 {
    let distance_sq = delta.length_sq();
    // Inside the minimum distance, divide by the geometric mean of the real and
    // minimum squared distances.
    let distance_sq = if distance_sq < distance_min_sq {
        (distance_min_sq * distance_sq).sqrt()
    } else {
        distance_sq
    };
    delta * (charge / distance_sq)
}

/// Many-body velocity change on `index`, approximating far cells by their
/// aggregate charge. `pending` is reusable walk storage.
pub(super) fn charge_impulse(
    tree: &QuadTree,
    index: usize,
    bodies: Bodies<'_>,
    params: ChargeParams,
    pending: &mut Vec<usize>,
) -> Vec2 {
    let point = bodies.points[index];
    let mut impulse = Vec2::ZERO;

    pending.clear();
    pending.push(ROOT);
    while let Some(id) = pending.pop() {
        let cell = tree.cell(id);
        if cell.charge == 0.0 {
            continue;
        }

        if !cell.is_leaf() {
            let delta = cell.centroid - point;
            let width = cell.square.width();
            if !cell.square.contains(point) && width * width < params.theta_sq * delta.length_sq() {
                impulse += coulomb(delta, cell.charge * params.alpha, params.distance_min_sq);
            } else {
                pending.extend(cell.children());
            }
            continue;
        }

        for &other in tree.bodies(cell) {
            if other == index {
                continue;
            }
            let mut delta = bodies.points[other] - point;
            if delta.length_sq() <= 1e-8 {
                let (x, y) = fallback_direction(index, other);
                delta = vec2(x, y) * 1e-3;
            }
            impulse += coulomb(
                delta,
                bodies.charges[other] * params.alpha,
                params.distance_min_sq,
            );
        }
    }
    impulse
}

fn resolve_overlap(
    from: usize,
    to: usize,
    bodies: Bodies<'_>,
    strength: f32,
    impulses: &mut [Vec2],
) {
    let min_distance = bodies.radii[from] + bodies.radii[to];
    let delta = bodies.points[from] - bodies.points[to];
    if delta.length_sq() >= min_distance * min_distance {
        return;
    }

    let (direction, distance) = direction_or_fallback(delta, from, to);
    let correction = direction * ((min_distance - distance) * strength);

    let from_sq = bodies.radii[from] * bodies.radii[from];
    let to_sq = bodies.radii[to] * bodies.radii[to];
    let total = (from_sq + to_sq).max(f32::EPSILON);
    // The smaller circle moves further.
    let from_share = to_sq / total;

    impulses[from] += correction * from_share;
    impulses[to] -= correction * (1.0 - from_share);
}

/// Resolves every overlap between `index` and a higher-indexed body, so each
/// pair is handled once per pass. Cells whose square lies further than the
/// body radius plus the cell's largest radius cannot hold an overlap and are
/// skipped.
pub(super) fn collide_body(
    tree: &QuadTree,
    index: usize,
    bodies: Bodies<'_>,
    strength: f32,
    impulses: &mut [Vec2],
    pending: &mut Vec<usize>,
) {
    let point = bodies.points[index];
    let radius = bodies.radii[index];

    pending.clear();
    pending.push(ROOT);
    while let Some(id) = pending.pop() {
        let cell = tree.cell(id);
        if cell.square.gap_to(point) >= radius + cell.reach {
            continue;
        }
        if !cell.is_leaf() {
            pending.extend(cell.children());
            continue;
        }
        for &other in tree.bodies(cell) {
            if other > index {
                resolve_overlap(index, other, bodies, strength, impulses);
            }
        }
    }
}

/// Per-axis pull toward `center`, proportional to the offset.
pub(super) fn apply_centering(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    center: Vec2,
    strength: f32,
    alpha: f32,
) {
    let scale = strength * alpha;
    for (position, velocity) in positions.iter().zip(velocities.iter_mut()) {
        *velocity += (center - *position) * scale;
    }
}
