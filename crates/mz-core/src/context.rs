//! Per-run generation context

use crate::config::{IntRange, MazeConfig};
use crate::error::ConfigError;
use crate::scene::ContainerId;

/// Snapshot of one generation call: the configuration, the parent container
/// for instantiated geometry, and every value derived from the complexity
/// multiplier. Created at the start of a run and dropped after it.
#[derive(Debug, Clone)]
pub struct MazeGenerationContext<'a> {
    pub config: &'a MazeConfig,
    pub parent: ContainerId,
    pub complexity: f32,
    pub grid_side: i32,
    pub main_path_length: IntRange,
    pub branch_count: IntRange,
    pub branch_length: IntRange,
    pub room_count: IntRange,
    pub loop_density: f32,
}

impl<'a> MazeGenerationContext<'a> {
    pub fn new(config: &'a MazeConfig, parent: ContainerId) -> Result<Self, ConfigError> {
        config.validate()?;
        let complexity = config.complexity_multiplier;
        let grid_side = config.grid.side_for(complexity);
        let area = grid_side.saturating_mul(grid_side).max(0) as u32;

        // The path needs at least one free cell left for the boss
        let scaled_path = config.main_path_length.scaled(complexity);
        let main_path_length = IntRange::new(scaled_path.min.max(1), scaled_path.max.max(1))
            .capped(area.saturating_sub(4).max(1));
        let room_count = config.room_count.scaled(complexity).capped(area * 3 / 5);

        Ok(Self {
            config,
            parent,
            complexity,
            grid_side,
            main_path_length,
            branch_count: config.branch_count.scaled(complexity),
            branch_length: config.branch_length.scaled(complexity),
            room_count,
            loop_density: config.loops.density_for(complexity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_scales_with_complexity() {
        let base = MazeConfig::default();
        let deep = MazeConfig::default().with_complexity(2.0);
        let a = MazeGenerationContext::new(&base, ContainerId(1)).unwrap();
        let b = MazeGenerationContext::new(&deep, ContainerId(1)).unwrap();

        assert_eq!(a.grid_side, 8);
        assert_eq!(b.grid_side, 16);
        assert!(b.branch_count.max > a.branch_count.max);
        assert!(b.branch_length.max > a.branch_length.max);
        assert!(b.room_count.min > a.room_count.min);
        assert!(b.loop_density > a.loop_density);
        assert_eq!(a.main_path_length, IntRange::new(4, 6));
        assert_eq!(b.main_path_length, IntRange::new(8, 12));
    }

    #[test]
    fn test_short_path_keeps_one_room() {
        let config = MazeConfig::default().with_complexity(0.1);
        let ctx = MazeGenerationContext::new(&config, ContainerId(0)).unwrap();
        assert_eq!(ctx.main_path_length.min, 1);
        assert!(ctx.main_path_length.max >= 1);
    }

    #[test]
    fn test_oversized_grid_is_config_error() {
        let config = MazeConfig::from_json(
            r#"{"grid":{"base_size":50000,"min_size":5,"max_size":50000}}"#,
        )
        .unwrap();
        assert!(matches!(
            MazeGenerationContext::new(&config, ContainerId(0)),
            Err(ConfigError::InvalidGridBounds { max: 50000, .. })
        ));
    }

    #[test]
    fn test_room_count_capped_by_area() {
        let mut config = MazeConfig::default();
        config.grid.base_size = 5;
        config.grid.max_size = 5;
        config.room_count = IntRange::new(40, 60);
        let ctx = MazeGenerationContext::new(&config, ContainerId(0)).unwrap();
        assert_eq!(ctx.room_count, IntRange::new(15, 15));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MazeConfig::default().with_complexity(-1.0);
        assert!(MazeGenerationContext::new(&config, ContainerId(0)).is_err());
    }
}
