mod config;
mod forces;
mod quadtree;

use std::collections::{BTreeSet, HashMap};

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::Record;

pub use config::{LayoutConfig, LayoutMode, UnmappedCategoryPolicy};
use forces::{
    accumulate_repulsion_for_node, apply_anchor_forces, apply_containment, resolve_collisions,
};
use quadtree::QuadNode;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

const SETTLE_TOLERANCE: f32 = 0.01;
const GOLDEN_ANGLE: f32 = 2.399_963;
const FALLBACK_BAND: f32 = 0.95;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("category {category:?} has no target region")]
    UnmappedCategory { category: String },
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryLayout {
    regions: Vec<(String, Pos2)>,
    fallback: Pos2,
}

impl CategoryLayout {
    pub fn new(regions: Vec<(String, Pos2)>, fallback: Pos2) -> Self {
        Self { regions, fallback }
    }

    /// Bands spread over `[0.2, 0.8]` of the height, all centred horizontally.
    pub fn derive(categories: &[String], width: f32, height: f32) -> Self {
        let count = categories.len();
        let regions = categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                let fraction = if count <= 1 {
                    0.5
                } else {
                    0.2 + 0.6 * index as f32 / (count - 1) as f32
                };
                (category.clone(), pos2(width * 0.5, height * fraction))
            })
            .collect();

        Self::new(regions, pos2(width * 0.5, height * FALLBACK_BAND))
    }

    pub fn for_config(config: &LayoutConfig, categories: &[String]) -> Self {
        if config.category_regions.is_empty() {
            return Self::derive(categories, config.width, config.height);
        }

        let regions = config
            .category_regions
            .iter()
            .map(|region| (region.category.clone(), pos2(region.x, region.y)))
            .collect();
        Self::new(
            regions,
            pos2(config.width * 0.5, config.height * FALLBACK_BAND),
        )
    }

    #[cfg(test)]
    pub fn target(&self, category: &str) -> Option<Pos2> {
        self.regions
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, target)| *target)
    }

    pub fn slot(&self, category: &str) -> Option<usize> {
        self.regions.iter().position(|(name, _)| name == category)
    }

    pub fn regions(&self) -> &[(String, Pos2)] {
        &self.regions
    }

    pub fn fallback(&self) -> Pos2 {
        self.fallback
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryLabel {
    pub category: String,
    pub position: Pos2,
}

pub fn lane_rect(slot: usize, lane_count: usize, config: &LayoutConfig) -> Rect {
    let lane_width = config.width / lane_count.max(1) as f32;
    Rect::from_min_size(
        pos2(lane_width * slot as f32, 0.0),
        vec2(lane_width, config.height),
    )
}

pub fn category_labels(
    layout: &CategoryLayout,
    config: &LayoutConfig,
    records: &[Record],
) -> Vec<CategoryLabel> {
    let has_unmapped = records
        .iter()
        .any(|record| layout.slot(&record.category).is_none());

    match config.mode {
        LayoutMode::Global => {
            let mut labels = layout
                .regions()
                .iter()
                .map(|(category, target)| CategoryLabel {
                    category: category.clone(),
                    position: pos2(0.0, target.y),
                })
                .collect::<Vec<_>>();
            if has_unmapped {
                labels.push(CategoryLabel {
                    category: UNKNOWN_CATEGORY.to_owned(),
                    position: pos2(0.0, layout.fallback().y),
                });
            }
            labels
        }
        LayoutMode::PerCategory => {
            let lane_count = layout.region_count() + usize::from(has_unmapped);
            let names = layout
                .regions()
                .iter()
                .map(|(category, _)| category.as_str())
                .chain(has_unmapped.then_some(UNKNOWN_CATEGORY));
            names
                .enumerate()
                .map(|(slot, category)| CategoryLabel {
                    category: category.to_owned(),
                    position: lane_rect(slot, lane_count, config).center_top(),
                })
                .collect()
        }
    }
}

fn resolve_slots(
    records: &[Record],
    layout: &CategoryLayout,
    policy: UnmappedCategoryPolicy,
) -> Result<Vec<Option<usize>>, LayoutError> {
    let slots = records
        .iter()
        .map(|record| layout.slot(&record.category))
        .collect::<Vec<_>>();

    let unmapped = records
        .iter()
        .zip(&slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(record, _)| record.category.as_str())
        .collect::<BTreeSet<_>>();

    if let Some(first) = unmapped.first() {
        if policy == UnmappedCategoryPolicy::Reject {
            return Err(LayoutError::UnmappedCategory {
                category: (*first).to_owned(),
            });
        }

        let affected = slots.iter().filter(|slot| slot.is_none()).count();
        warn!(
            categories = ?unmapped,
            records = affected,
            "categories without a target region; placing them in the {UNKNOWN_CATEGORY} region"
        );
    }

    Ok(slots)
}

/// Computes positions for every record. Inputs are left untouched; the returned records are
/// clones with `position` set. Deterministic for a fixed input, config and seed.
pub fn solve(
    records: &[Record],
    layout: &CategoryLayout,
    config: &LayoutConfig,
) -> Result<Vec<Record>, LayoutError> {
    config.validate()?;
    let slots = resolve_slots(records, layout, config.unmapped_category)?;

    let positions = match config.mode {
        LayoutMode::Global => solve_global(&slots, layout, config),
        LayoutMode::PerCategory => solve_lanes(&slots, layout, config),
    };

    info!(
        mode = ?config.mode,
        records = records.len(),
        steps = config.step_count,
        "layout solved"
    );

    Ok(records
        .iter()
        .zip(positions)
        .map(|(record, position)| Record {
            position: Some(position),
            ..record.clone()
        })
        .collect())
}

// Every band shares the horizontal centre; only the y target differs per category.
fn solve_global(slots: &[Option<usize>], layout: &CategoryLayout, config: &LayoutConfig) -> Vec<Pos2> {
    let center_x = config.width * 0.5;
    let anchors = slots
        .iter()
        .map(|slot| {
            let target = slot
                .and_then(|slot| layout.regions().get(slot))
                .map_or(layout.fallback(), |(_, target)| *target);
            vec2(center_x, target.y)
        })
        .collect::<Vec<_>>();

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let positions = solve_group(&anchors, None, config, &mut rng);
    finalize(&positions, &anchors)
}

fn solve_lanes(slots: &[Option<usize>], layout: &CategoryLayout, config: &LayoutConfig) -> Vec<Pos2> {
    let unknown_slot = layout.region_count();
    let lane_count = if slots.iter().any(Option::is_none) {
        layout.region_count() + 1
    } else {
        layout.region_count()
    };

    let mut positions = vec![Pos2::ZERO; slots.len()];
    for lane in 0..lane_count {
        let members = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.unwrap_or(unknown_slot) == lane)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        if members.is_empty() {
            continue;
        }

        let rect = lane_rect(lane, lane_count, config);
        let local_bounds = Rect::from_center_size(Pos2::ZERO, rect.size());
        let anchors = vec![Vec2::ZERO; members.len()];
        let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(lane as u64));
        let local = solve_group(&anchors, Some(local_bounds), config, &mut rng);
        let local = finalize(&local, &anchors);

        debug!(lane, members = members.len(), "lane solved");
        let offset = rect.center().to_vec2();
        for (index, position) in members.into_iter().zip(local) {
            positions[index] = position + offset;
        }
    }

    positions
}

fn initial_positions(anchors: &[Vec2], spacing: f32, rng: &mut SmallRng) -> Vec<Vec2> {
    let mut counts: HashMap<(u32, u32), usize> = HashMap::new();
    anchors
        .iter()
        .map(|anchor| {
            let rank = counts
                .entry((anchor.x.to_bits(), anchor.y.to_bits()))
                .or_insert(0);
            let step = *rank as f32;
            *rank += 1;

            let radius = spacing * (0.5 + step).sqrt();
            let angle = step * GOLDEN_ANGLE;
            let jitter = vec2(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)) * spacing * 0.25;
            *anchor + vec2(angle.cos(), angle.sin()) * radius + jitter
        })
        .collect()
}

fn solve_group(
    anchors: &[Vec2],
    bounds: Option<Rect>,
    config: &LayoutConfig,
    rng: &mut SmallRng,
) -> Vec<Vec2> {
    let count = anchors.len();
    let radius = config.collision_radius;
    let min_distance = radius * 2.0;
    let mut positions = initial_positions(anchors, min_distance.max(1.0), rng);
    if count == 0 {
        return positions;
    }

    let mut velocities = vec![Vec2::ZERO; count];
    let mut corrections = Vec::with_capacity(count);
    let retention = 1.0 - config.velocity_decay;
    let mut alpha = 1.0_f32;

    for _ in 0..config.step_count {
        alpha *= 1.0 - config.damping_factor;

        apply_anchor_forces(
            &positions,
            anchors,
            config.attraction_strength * alpha,
            config.centering_strength * alpha,
            &mut velocities,
        );

        if count > 1
            && config.repulsion_strength != 0.0
            && let Some(tree) = QuadNode::build(&positions)
        {
            let strength = config.repulsion_strength * alpha;
            for (index, velocity) in velocities.iter_mut().enumerate() {
                accumulate_repulsion_for_node(
                    &tree,
                    index,
                    &positions,
                    strength,
                    1.0,
                    config.barnes_hut_theta,
                    velocity,
                );
            }
        }

        if let Some(bounds) = bounds {
            apply_containment(&positions, bounds, radius, &mut velocities);
        }

        for (position, velocity) in positions.iter_mut().zip(velocities.iter_mut()) {
            *velocity *= retention;
            *position += *velocity;
        }

        for _ in 0..config.collision_passes {
            resolve_collisions(&mut positions, min_distance, &mut corrections);
        }
    }

    for _ in 0..config.settle_passes {
        if resolve_collisions(&mut positions, min_distance, &mut corrections) <= SETTLE_TOLERANCE {
            break;
        }
    }

    positions
}

fn finalize(positions: &[Vec2], anchors: &[Vec2]) -> Vec<Pos2> {
    positions
        .iter()
        .zip(anchors)
        .enumerate()
        .map(|(index, (position, anchor))| {
            if position.x.is_finite() && position.y.is_finite() {
                position.to_pos2()
            } else {
                warn!(index, "non-finite layout position replaced by its anchor");
                if anchor.x.is_finite() && anchor.y.is_finite() {
                    anchor.to_pos2()
                } else {
                    Pos2::ZERO
                }
            }
        })
        .collect()
}
