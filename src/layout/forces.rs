use std::f32::consts::TAU;

use eframe::egui::{Rect, Vec2, vec2};

use super::quadtree::QuadNode;

const COINCIDENT_DISTANCE: f32 = 1e-4;
const MIN_REPULSION_DISTANCE: f32 = 1.0;
const CONTAINMENT_STRENGTH: f32 = 0.5;

/// Unit direction for a pair sitting on the same coordinate. Depends only on the unordered pair
/// and flips sign with argument order, so both sides of a pair push apart.
pub(super) fn tie_break_direction(index: usize, other: usize) -> Vec2 {
    let (low, high) = (index.min(other), index.max(other));
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if index <= other { direction } else { -direction }
}

fn separation(positions: &[Vec2], index: usize, other: usize) -> (Vec2, f32) {
    let delta = positions[index] - positions[other];
    let distance = delta.length();
    if distance > COINCIDENT_DISTANCE {
        (delta / distance, distance)
    } else {
        (tie_break_direction(index, other), 0.0)
    }
}

pub(super) fn apply_anchor_forces(
    positions: &[Vec2],
    anchors: &[Vec2],
    attraction: f32,
    centering: f32,
    velocities: &mut [Vec2],
) {
    for ((position, anchor), velocity) in positions.iter().zip(anchors).zip(velocities) {
        velocity.x += (anchor.x - position.x) * centering;
        velocity.y += (anchor.y - position.y) * attraction;
    }
}

pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    softening: f32,
    theta: f32,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let (direction, distance) = separation(positions, index, other);
            let distance = distance.max(MIN_REPULSION_DISTANCE);
            *velocity += direction * (distance * strength / (distance * distance + softening));
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq().max(COINCIDENT_DISTANCE);
    let can_approximate = !node.cell.contains(point)
        && node.cell.side_length() < theta * distance_sq.sqrt()
        && node.mass > 1.0;

    if can_approximate {
        *velocity += delta * (strength * node.mass / (distance_sq + softening));
        return;
    }

    for child in node.children() {
        accumulate_repulsion_for_node(child, index, positions, strength, softening, theta, velocity);
    }
}

pub(super) fn apply_containment(
    positions: &[Vec2],
    bounds: Rect,
    margin: f32,
    velocities: &mut [Vec2],
) {
    let inner = bounds.shrink(margin.min(bounds.width() * 0.5).min(bounds.height() * 0.5));
    for (position, velocity) in positions.iter().zip(velocities) {
        let clamped = vec2(
            position.x.clamp(inner.min.x, inner.max.x),
            position.y.clamp(inner.min.y, inner.max.y),
        );
        *velocity += (clamped - *position) * CONTAINMENT_STRENGTH;
    }
}

#[derive(Clone, Copy)]
struct CollisionParams {
    min_distance: f32,
    min_distance_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    params: CollisionParams,
    corrections: &mut [Vec2],
    max_overlap: &mut f32,
) {
    let (direction, distance) = separation(positions, from, to);
    if distance >= params.min_distance {
        return;
    }

    let overlap = params.min_distance - distance;
    *max_overlap = max_overlap.max(overlap);
    let push = direction * (overlap * 0.5);
    corrections[from] += push;
    corrections[to] -= push;
}

fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    params: CollisionParams,
    corrections: &mut [Vec2],
    max_overlap: &mut f32,
) {
    if node_a.cell.gap_sq(node_b.cell) > params.min_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    collide_pair(from, to, positions, params, corrections, max_overlap);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, params, corrections, max_overlap);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(
                child_a,
                child_a,
                true,
                positions,
                params,
                corrections,
                max_overlap,
            );
            for child_b in &children[offset + 1..] {
                accumulate_collision_pairs(
                    child_a,
                    child_b,
                    false,
                    positions,
                    params,
                    corrections,
                    max_overlap,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.cell.half_extent >= node_b.cell.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(
                child,
                node_b,
                false,
                positions,
                params,
                corrections,
                max_overlap,
            );
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(
                node_a,
                child,
                false,
                positions,
                params,
                corrections,
                max_overlap,
            );
        }
    }
}

/// One projection pass separating every pair closer than `min_distance`. Each point of an
/// overlapping pair moves half the overlap. Returns the largest overlap seen before the pass.
pub(super) fn resolve_collisions(
    positions: &mut [Vec2],
    min_distance: f32,
    corrections: &mut Vec<Vec2>,
) -> f32 {
    if positions.len() < 2 || min_distance <= 0.0 {
        return 0.0;
    }

    let Some(tree) = QuadNode::build(positions) else {
        return 0.0;
    };

    corrections.clear();
    corrections.resize(positions.len(), Vec2::ZERO);
    let mut max_overlap = 0.0_f32;
    accumulate_collision_pairs(
        &tree,
        &tree,
        true,
        positions,
        CollisionParams {
            min_distance,
            min_distance_sq: min_distance * min_distance,
        },
        corrections,
        &mut max_overlap,
    );

    for (position, correction) in positions.iter_mut().zip(corrections.iter()) {
        *position += *correction;
    }

    max_overlap
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Rect, Vec2, pos2, vec2};

    use super::{
        QuadNode, accumulate_repulsion_for_node, apply_anchor_forces, apply_containment,
        resolve_collisions, tie_break_direction,
    };

    #[test]
    fn tie_break_is_antisymmetric_and_unit_length() {
        for (a, b) in [(0, 1), (3, 7), (12, 40)] {
            let forward = tie_break_direction(a, b);
            let backward = tie_break_direction(b, a);
            assert!((forward.length() - 1.0).abs() < 1e-5);
            assert!((forward + backward).length() < 1e-6);
        }
    }

    #[test]
    fn coincident_points_are_separated_without_nan() {
        let mut positions = vec![Vec2::ZERO; 2];
        let mut scratch = Vec::new();
        let overlap = resolve_collisions(&mut positions, 14.0, &mut scratch);

        assert!((overlap - 14.0).abs() < 1e-4);
        assert!(positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(((positions[0] - positions[1]).length() - 14.0).abs() < 1e-3);
    }

    #[test]
    fn separated_points_are_left_alone() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(20.0, 0.0)];
        let mut scratch = Vec::new();
        assert_eq!(resolve_collisions(&mut positions, 14.0, &mut scratch), 0.0);
        assert_eq!(positions, vec![vec2(0.0, 0.0), vec2(20.0, 0.0)]);
    }

    #[test]
    fn repeated_passes_clear_a_dense_pile() {
        let mut positions = (0..40)
            .map(|index| vec2((index % 5) as f32, (index / 5) as f32))
            .collect::<Vec<_>>();
        let mut scratch = Vec::new();
        let mut overlap = f32::INFINITY;
        for _ in 0..400 {
            overlap = resolve_collisions(&mut positions, 10.0, &mut scratch);
            if overlap < 0.01 {
                break;
            }
        }
        assert!(overlap < 0.5, "residual overlap {overlap}");
    }

    #[test]
    fn exact_repulsion_pushes_points_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).expect("finite points");
        let mut velocity = Vec2::ZERO;
        accumulate_repulsion_for_node(&tree, 0, &positions, 15.5, 1.0, 0.0, &mut velocity);
        assert!(velocity.x < 0.0);
        assert!((velocity.x + 10.0 * 15.5 / 101.0).abs() < 1e-4);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn anchor_forces_act_per_axis() {
        let positions = [vec2(0.0, 0.0)];
        let anchors = [vec2(10.0, 20.0)];
        let mut velocities = [Vec2::ZERO];
        apply_anchor_forces(&positions, &anchors, 0.5, 0.1, &mut velocities);
        assert!((velocities[0].x - 1.0).abs() < 1e-6);
        assert!((velocities[0].y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn containment_only_acts_outside_bounds() {
        let bounds = Rect::from_min_max(pos2(-50.0, -50.0), pos2(50.0, 50.0));
        let positions = [vec2(0.0, 0.0), vec2(80.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        apply_containment(&positions, bounds, 5.0, &mut velocities);
        assert_eq!(velocities[0], Vec2::ZERO);
        assert!(velocities[1].x < 0.0);
    }
}
