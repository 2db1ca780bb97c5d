//! Grid-space primitives shared by every layout stage
//!
//! Coordinates are cell units: `x` grows east, `y` grows north.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A cell coordinate on the placement grid
///
/// The derived ordering is lexicographic on `(x, y)`: compare `x` first, then
/// `y`. Door ownership between two rooms is decided by this order on their
/// origins, so field order must not change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `direction`
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance in cell units
    pub fn distance(self, other: GridPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Footprint extent in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub const fn area(&self) -> i32 {
        self.w * self.h
    }
}

/// Cardinal direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit step in grid coordinates
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Position in per-direction arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// North and south sides run along the x axis
    pub const fn runs_along_x(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

/// The rectangular set of cells a room occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub origin: GridPos,
    pub size: GridSize,
}

impl Footprint {
    pub const fn new(origin: GridPos, size: GridSize) -> Self {
        Self { origin, size }
    }

    /// Westmost column
    pub const fn left(&self) -> i32 {
        self.origin.x
    }

    /// Eastmost column (inclusive)
    pub const fn right(&self) -> i32 {
        self.origin.x + self.size.w - 1
    }

    /// Southmost row
    pub const fn bottom(&self) -> i32 {
        self.origin.y
    }

    /// Northmost row (inclusive)
    pub const fn top(&self) -> i32 {
        self.origin.y + self.size.h - 1
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.left()
            && pos.x <= self.right()
            && pos.y >= self.bottom()
            && pos.y <= self.top()
    }

    /// Check if the two footprints share at least one cell
    pub fn intersects(&self, other: &Footprint) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.top() < other.bottom()
            || self.bottom() > other.top())
    }

    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.bottom()..=self.top())
            .flat_map(move |y| (self.left()..=self.right()).map(move |x| GridPos::new(x, y)))
    }

    /// Continuous center in cell units (a 1×1 room at (0,0) has center (0.5, 0.5))
    pub fn center(&self) -> (f32, f32) {
        (
            self.origin.x as f32 + self.size.w as f32 / 2.0,
            self.origin.y as f32 + self.size.h as f32 / 2.0,
        )
    }

    /// Euclidean distance between the two footprint centers
    pub fn center_distance(&self, other: &Footprint) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Cells lying along the `direction` side, ordered by increasing coordinate
    pub fn border_cells(&self, direction: Direction) -> Vec<GridPos> {
        match direction {
            Direction::North => (self.left()..=self.right())
                .map(|x| GridPos::new(x, self.top()))
                .collect(),
            Direction::South => (self.left()..=self.right())
                .map(|x| GridPos::new(x, self.bottom()))
                .collect(),
            Direction::East => (self.bottom()..=self.top())
                .map(|y| GridPos::new(self.right(), y))
                .collect(),
            Direction::West => (self.bottom()..=self.top())
                .map(|y| GridPos::new(self.left(), y))
                .collect(),
        }
    }
}
