//! Placement grid
//!
//! A square occupancy map. Each cell remembers which placed room covers it.

use serde::{Deserialize, Serialize};

use crate::config::MAX_GRID_SIZE;
use crate::geometry::{Direction, Footprint, GridPos};

/// A single grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub occupied: bool,
    /// Index of the placed room covering this cell
    pub room: Option<usize>,
}

/// Square placement grid, stored row by row from `y = 0`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementGrid {
    side: i32,
    cells: Vec<GridCell>,
}

impl PlacementGrid {
    pub fn new(side: i32) -> Self {
        let side = side.clamp(1, MAX_GRID_SIZE);
        Self {
            side,
            cells: vec![GridCell::default(); (side * side) as usize],
        }
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.side && pos.y < self.side
    }

    fn idx(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.side + pos.x) as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, pos: GridPos) -> Option<&GridCell> {
        self.idx(pos).map(|i| &self.cells[i])
    }

    /// In bounds and unoccupied
    pub fn is_free(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(|cell| !cell.occupied)
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(|cell| cell.occupied)
    }

    /// Every cell of the footprint is in bounds and free
    pub fn fits(&self, footprint: &Footprint) -> bool {
        footprint.cells().all(|pos| self.is_free(pos))
    }

    /// Mark the footprint's cells as covered by `room`
    pub fn occupy(&mut self, footprint: &Footprint, room: usize) {
        let indices: Vec<usize> = footprint.cells().filter_map(|pos| self.idx(pos)).collect();
        for i in indices {
            self.cells[i] = GridCell {
                occupied: true,
                room: Some(room),
            };
        }
    }

    /// Free orthogonal neighbours of `pos`, in N/E/S/W order
    pub fn free_neighbours(&self, pos: GridPos) -> Vec<GridPos> {
        Direction::ALL
            .iter()
            .map(|&dir| pos.step(dir))
            .filter(|&next| self.is_free(next))
            .collect()
    }

    /// Some cell of the footprint has an occupied orthogonal neighbour outside it
    pub fn touches_occupied(&self, footprint: &Footprint) -> bool {
        footprint.cells().any(|pos| {
            Direction::ALL.iter().any(|&dir| {
                let next = pos.step(dir);
                !footprint.contains(next) && self.is_occupied(next)
            })
        })
    }

    /// Continuous center of the grid in cell units
    pub fn center(&self) -> (f32, f32) {
        let c = self.side as f32 / 2.0;
        (c, c)
    }

    /// Distance from the center of `pos` to the grid center
    pub fn distance_to_center(&self, pos: GridPos) -> f32 {
        let (cx, cy) = self.center();
        let dx = pos.x as f32 + 0.5 - cx;
        let dy = pos.y as f32 + 0.5 - cy;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.occupied).count()
    }
}
