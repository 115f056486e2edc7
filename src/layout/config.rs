use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::LayoutError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Global,
    PerCategory,
}

impl LayoutMode {
    pub const ALL: [Self; 2] = [Self::Global, Self::PerCategory];

    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global bands",
            Self::PerCategory => "Per-category lanes",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedCategoryPolicy {
    #[default]
    Fallback,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CategoryRegion {
    pub category: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Error)]
pub enum LayoutConfigError {
    #[error("failed to parse layout config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read layout config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub width: f32,
    pub height: f32,
    /// Ordered target regions. Empty means regions are derived from the data.
    pub category_regions: Vec<CategoryRegion>,
    pub attraction_strength: f32,
    pub centering_strength: f32,
    pub repulsion_strength: f32,
    pub collision_radius: f32,
    pub step_count: usize,
    pub damping_factor: f32,
    pub velocity_decay: f32,
    pub collision_passes: usize,
    pub settle_passes: usize,
    pub barnes_hut_theta: f32,
    pub seed: u64,
    pub unmapped_category: UnmappedCategoryPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Global,
            width: 800.0,
            height: 800.0,
            category_regions: Vec::new(),
            attraction_strength: 1.3,
            centering_strength: 0.19,
            repulsion_strength: 15.5,
            collision_radius: 7.0,
            step_count: 300,
            damping_factor: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            collision_passes: 1,
            settle_passes: 64,
            barnes_hut_theta: 0.9,
            seed: 0x5eed_cafe,
            unmapped_category: UnmappedCategoryPolicy::Fallback,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LayoutConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, LayoutConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| LayoutConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        };
        let non_negative = |name: &str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )))
            }
        };

        positive("width", self.width)?;
        positive("height", self.height)?;
        non_negative("attraction_strength", self.attraction_strength)?;
        non_negative("centering_strength", self.centering_strength)?;
        non_negative("collision_radius", self.collision_radius)?;
        non_negative("barnes_hut_theta", self.barnes_hut_theta)?;
        if !self.repulsion_strength.is_finite() {
            return Err(LayoutError::InvalidConfig(format!(
                "repulsion_strength must be finite, got {}",
                self.repulsion_strength
            )));
        }
        if !(0.0..1.0).contains(&self.damping_factor) {
            return Err(LayoutError::InvalidConfig(format!(
                "damping_factor must be in [0, 1), got {}",
                self.damping_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(LayoutError::InvalidConfig(format!(
                "velocity_decay must be in [0, 1], got {}",
                self.velocity_decay
            )));
        }

        for region in &self.category_regions {
            if !region.x.is_finite() || !region.y.is_finite() {
                return Err(LayoutError::InvalidConfig(format!(
                    "region for {} is not a finite coordinate",
                    region.category
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutConfig, LayoutMode, UnmappedCategoryPolicy};
    use crate::layout::LayoutError;

    #[test]
    fn defaults_match_swarm_settings() {
        let config = LayoutConfig::default();
        assert_eq!(config.mode, LayoutMode::Global);
        assert_eq!(config.step_count, 300);
        assert_eq!(config.collision_radius, 7.0);
        assert!((config.damping_factor - 0.0228).abs() < 0.0005);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json_str(
            r#"{
                "mode": "per_category",
                "step_count": 120,
                "category_regions": [{"category": "Jan", "x": 100, "y": 100}],
                "unmapped_category": "reject"
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.mode, LayoutMode::PerCategory);
        assert_eq!(config.step_count, 120);
        assert_eq!(config.category_regions.len(), 1);
        assert_eq!(config.category_regions[0].y, 100.0);
        assert_eq!(config.unmapped_category, UnmappedCategoryPolicy::Reject);
        assert_eq!(config.width, 800.0);
    }

    #[test]
    fn rejects_degenerate_canvas() {
        let config = LayoutConfig {
            width: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_damping_of_one() {
        let config = LayoutConfig {
            damping_factor: 1.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
