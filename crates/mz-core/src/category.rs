//! Room categories and their footprint/door rules
//!
//! Each category maps to exactly one [`CategoryProfile`] through a single
//! exhaustive match, so footprint size and door-slot rules cannot drift apart.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geometry::{Direction, Footprint, GridPos, GridSize};

/// Room category, i.e. footprint shape
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum RoomCategory {
    /// 1×1 cells
    #[default]
    Regular = 0,
    /// 2×1 cells
    Wide = 1,
    /// 1×2 cells
    Tall = 2,
    /// 2×2 cells
    Large = 3,
}

/// Fixed footprint and door rule for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryProfile {
    pub size: GridSize,
    /// Door slots on the north and south sides
    pub slots_north_south: u8,
    /// Door slots on the east and west sides
    pub slots_east_west: u8,
}

impl CategoryProfile {
    /// Number of door slots on the given side (1 or 2)
    pub const fn slots(&self, direction: Direction) -> u8 {
        if direction.runs_along_x() {
            self.slots_north_south
        } else {
            self.slots_east_west
        }
    }

    /// Slot serving border cell `cell` on the `direction` side of a room at `origin`.
    ///
    /// Slot 0 is the half with the lower coordinate along the side (west half
    /// of a north/south side, south half of an east/west side).
    pub fn slot_for_cell(&self, origin: GridPos, direction: Direction, cell: GridPos) -> u8 {
        if self.slots(direction) < 2 {
            return 0;
        }
        let (along, start, extent) = if direction.runs_along_x() {
            (cell.x, origin.x, self.size.w)
        } else {
            (cell.y, origin.y, self.size.h)
        };
        if along < start + extent / 2 { 0 } else { 1 }
    }

    /// Slot for a door opening `along` world units from the room's center line.
    /// Same sign rule as [`slot_for_cell`](Self::slot_for_cell).
    pub fn slot_for_offset(&self, direction: Direction, along: f32) -> u8 {
        if self.slots(direction) < 2 || along < 0.0 {
            0
        } else {
            1
        }
    }
}

impl RoomCategory {
    pub const ALL: [RoomCategory; 4] = [
        RoomCategory::Regular,
        RoomCategory::Wide,
        RoomCategory::Tall,
        RoomCategory::Large,
    ];

    pub const fn profile(self) -> CategoryProfile {
        match self {
            RoomCategory::Regular => CategoryProfile {
                size: GridSize::new(1, 1),
                slots_north_south: 1,
                slots_east_west: 1,
            },
            RoomCategory::Wide => CategoryProfile {
                size: GridSize::new(2, 1),
                slots_north_south: 2,
                slots_east_west: 1,
            },
            RoomCategory::Tall => CategoryProfile {
                size: GridSize::new(1, 2),
                slots_north_south: 1,
                slots_east_west: 2,
            },
            RoomCategory::Large => CategoryProfile {
                size: GridSize::new(2, 2),
                slots_north_south: 2,
                slots_east_west: 2,
            },
        }
    }

    pub const fn size(self) -> GridSize {
        self.profile().size
    }

    /// Footprint of this category anchored at `origin`
    pub const fn footprint_at(self, origin: GridPos) -> Footprint {
        Footprint::new(origin, self.size())
    }

    /// Glyph used by the text renderer
    pub const fn symbol(self) -> char {
        match self {
            RoomCategory::Regular => 'r',
            RoomCategory::Wide => 'w',
            RoomCategory::Tall => 't',
            RoomCategory::Large => 'L',
        }
    }
}

/// A category placed at a grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomShape {
    pub category: RoomCategory,
    pub footprint: Footprint,
}

impl RoomShape {
    pub const fn new(category: RoomCategory, origin: GridPos) -> Self {
        Self {
            category,
            footprint: category.footprint_at(origin),
        }
    }

    pub const fn origin(&self) -> GridPos {
        self.footprint.origin
    }

    pub fn slot_for_cell(&self, direction: Direction, cell: GridPos) -> u8 {
        self.category
            .profile()
            .slot_for_cell(self.footprint.origin, direction, cell)
    }
}
