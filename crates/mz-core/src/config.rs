//! Generation configuration
//!
//! [`MazeConfig`] is the per-level input: template pools, fixed entry/boss
//! templates, the complexity multiplier and the tuning ranges every stage
//! reads. It loads from JSON; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::RoomCategory;
use crate::error::ConfigError;
use crate::rng::MazeRng;

/// Upper bound for [`complexity_for_depth`]
pub const MAX_COMPLEXITY: f32 = 3.0;

/// Largest accepted grid side
pub const MAX_GRID_SIZE: i32 = 256;

/// Complexity added per level of depth below the first
pub const COMPLEXITY_PER_DEPTH: f32 = 0.2;

/// Complexity multiplier for a level depth (1-based). Monotonic, capped.
pub fn complexity_for_depth(depth: u32) -> f32 {
    (1.0 + COMPLEXITY_PER_DEPTH * depth.saturating_sub(1) as f32).min(MAX_COMPLEXITY)
}

/// Template names available for each room category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePools {
    pub regular: Vec<String>,
    pub wide: Vec<String>,
    pub tall: Vec<String>,
    pub large: Vec<String>,
}

impl TemplatePools {
    pub fn pool(&self, category: RoomCategory) -> &[String] {
        match category {
            RoomCategory::Regular => &self.regular,
            RoomCategory::Wide => &self.wide,
            RoomCategory::Tall => &self.tall,
            RoomCategory::Large => &self.large,
        }
    }

    /// A small named pool per category
    pub fn standard() -> Self {
        let names = |prefix: &str| -> Vec<String> {
            (1..=3).map(|i| format!("{prefix}_{i:02}")).collect()
        };
        Self {
            regular: names("regular"),
            wide: names("wide"),
            tall: names("tall"),
            large: names("large"),
        }
    }
}

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

impl IntRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn roll(&self, rng: &mut MazeRng) -> u32 {
        rng.between(self.min, self.max)
    }

    /// Both bounds multiplied by `factor` and rounded; `max` never drops below `min`
    pub fn scaled(&self, factor: f32) -> Self {
        let min = (self.min as f32 * factor).round().max(0.0) as u32;
        let max = (self.max as f32 * factor).round().max(0.0) as u32;
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Both bounds capped at `limit`
    pub fn capped(&self, limit: u32) -> Self {
        Self {
            min: self.min.min(limit),
            max: self.max.min(limit),
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Grid side length before and after complexity scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    pub base_size: i32,
    pub min_size: i32,
    pub max_size: i32,
}

impl GridSettings {
    /// Side length for a complexity multiplier, clamped to the safe range
    pub fn side_for(&self, complexity: f32) -> i32 {
        let scaled = (self.base_size as f32 * complexity).round() as i32;
        scaled.clamp(self.min_size, self.max_size)
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            base_size: 8,
            min_size: 5,
            max_size: 16,
        }
    }
}

/// Loop density band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopSettings {
    pub base_density: f32,
    /// Added per unit of complexity above 1.0
    pub per_complexity: f32,
    pub min_density: f32,
    pub max_density: f32,
}

impl LoopSettings {
    pub fn density_for(&self, complexity: f32) -> f32 {
        (self.base_density + (complexity - 1.0) * self.per_complexity)
            .clamp(self.min_density, self.max_density)
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            base_density: 0.15,
            per_complexity: 0.1,
            min_density: 0.05,
            max_density: 0.35,
        }
    }
}

/// Per-level generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub templates: TemplatePools,
    pub entry_template: Option<String>,
    pub boss_template: Option<String>,
    pub boss_category: RoomCategory,
    /// Categories fillers draw from, uniformly; repeat an entry to weight it
    pub filler_categories: Vec<RoomCategory>,
    pub complexity_multiplier: f32,
    pub grid: GridSettings,
    /// Main path rooms before the boss, entry included
    pub main_path_length: IntRange,
    pub branch_count: IntRange,
    pub branch_length: IntRange,
    /// Target total room count
    pub room_count: IntRange,
    /// Main path pull toward the grid center
    pub center_weight: f32,
    /// Random jitter added to neighbour scores
    pub jitter_weight: f32,
    pub loops: LoopSettings,
    /// World units per grid cell
    pub cell_size: f32,
    /// World-unit distance within which a door opening snaps to a wall
    pub door_tolerance: f32,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            templates: TemplatePools::standard(),
            entry_template: Some("entry_hall".to_string()),
            boss_template: Some("boss_arena".to_string()),
            boss_category: RoomCategory::Large,
            filler_categories: vec![
                RoomCategory::Regular,
                RoomCategory::Regular,
                RoomCategory::Regular,
                RoomCategory::Regular,
                RoomCategory::Wide,
                RoomCategory::Tall,
                RoomCategory::Large,
            ],
            complexity_multiplier: 1.0,
            grid: GridSettings::default(),
            main_path_length: IntRange::new(4, 6),
            branch_count: IntRange::new(1, 3),
            branch_length: IntRange::new(1, 3),
            room_count: IntRange::new(12, 16),
            center_weight: 1.0,
            jitter_weight: 0.6,
            loops: LoopSettings::default(),
            cell_size: 10.0,
            door_tolerance: 0.5,
        }
    }
}

impl MazeConfig {
    /// Default configuration for a level depth (1-based)
    pub fn for_depth(depth: u32) -> Self {
        Self::default().with_complexity(complexity_for_depth(depth))
    }

    pub fn with_complexity(mut self, complexity: f32) -> Self {
        self.complexity_multiplier = complexity;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MazeConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = self.complexity_multiplier;
        if !m.is_finite() || m <= 0.0 {
            return Err(ConfigError::InvalidComplexity(m));
        }
        let grid = &self.grid;
        if grid.min_size < 3
            || grid.min_size > grid.max_size
            || grid.max_size > MAX_GRID_SIZE
            || grid.base_size < 1
        {
            return Err(ConfigError::InvalidGridBounds {
                min: grid.min_size,
                max: grid.max_size,
            });
        }
        self.main_path_length.validate("main_path_length")?;
        self.branch_count.validate("branch_count")?;
        self.branch_length.validate("branch_length")?;
        self.room_count.validate("room_count")?;
        if self.main_path_length.min == 0 {
            return Err(ConfigError::EmptyRange("main_path_length"));
        }
        if self.filler_categories.is_empty() {
            return Err(ConfigError::EmptyFillerCategories);
        }
        let loops = &self.loops;
        if !(0.0..=1.0).contains(&loops.min_density)
            || !(0.0..=1.0).contains(&loops.max_density)
            || loops.min_density > loops.max_density
        {
            return Err(ConfigError::InvalidLoopDensity {
                min: loops.min_density,
                max: loops.max_density,
            });
        }
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.door_tolerance.is_nan() || self.door_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.door_tolerance));
        }
        Ok(())
    }
}
