//! Door slot resolution
//!
//! Two entry points map a connection to a door slot on one side of a room:
//!
//! - generation time, from grid cells ([`propose_link`])
//! - binding time, from a door opening's world offset ([`resolve_hole`])
//!
//! Both apply the same rule: slot 0 is the half of the side with the lower
//! coordinate along it. [`validate_link`] recomputes a proposed link from the
//! other endpoint and rejects it on any disagreement.

use serde::{Deserialize, Serialize};

use crate::adjacency::{adjacency_direction, shared_border};
use crate::category::{RoomCategory, RoomShape};
use crate::error::ConnectionError;
use crate::geometry::{Direction, GridPos};
use crate::graph::RoomId;
use crate::scene::WorldVec;

/// Door pairing between two adjacent rooms, seen from `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorLink {
    /// Side of `from` facing `to`
    pub direction: Direction,
    /// Border cell inside `from`
    pub from_cell: GridPos,
    /// Border cell inside `to`, one step from `from_cell` in `direction`
    pub to_cell: GridPos,
    pub from_slot: u8,
    pub to_slot: u8,
}

impl DoorLink {
    /// The same link seen from the other endpoint
    pub fn reversed(&self) -> DoorLink {
        DoorLink {
            direction: self.direction.opposite(),
            from_cell: self.to_cell,
            to_cell: self.from_cell,
            from_slot: self.to_slot,
            to_slot: self.from_slot,
        }
    }
}

/// Direction from `from` to `to` and the shared cell pair that carries the door.
///
/// When the rooms share more than one cell of wall, the pair with the lowest
/// coordinate along the border is used.
pub fn connection_cells(from: &RoomShape, to: &RoomShape) -> Option<(Direction, GridPos, GridPos)> {
    let direction = adjacency_direction(&from.footprint, &to.footprint)?;
    let (from_cell, to_cell) = shared_border(&from.footprint, &to.footprint)
        .into_iter()
        .next()?;
    Some((direction, from_cell, to_cell))
}

/// Compute the door link for a connection from `from` to `to`.
pub fn propose_link(
    from_id: RoomId,
    from: &RoomShape,
    to_id: RoomId,
    to: &RoomShape,
) -> Result<DoorLink, ConnectionError> {
    if from_id == to_id {
        return Err(ConnectionError::SelfConnection(from_id));
    }
    let (direction, from_cell, to_cell) =
        connection_cells(from, to).ok_or(ConnectionError::NotAdjacent {
            from: from_id,
            to: to_id,
        })?;
    Ok(DoorLink {
        direction,
        from_cell,
        to_cell,
        from_slot: from.slot_for_cell(direction, from_cell),
        to_slot: to.slot_for_cell(direction.opposite(), to_cell),
    })
}

/// Recompute `link` from `to`'s side and check it against pure geometry.
pub fn validate_link(
    from_id: RoomId,
    from: &RoomShape,
    to_id: RoomId,
    to: &RoomShape,
    link: &DoorLink,
) -> Result<(), ConnectionError> {
    let not_adjacent = ConnectionError::NotAdjacent {
        from: from_id,
        to: to_id,
    };
    let back = adjacency_direction(&to.footprint, &from.footprint).ok_or(not_adjacent)?;
    if back != link.direction.opposite() {
        return Err(ConnectionError::DirectionMismatch {
            from: to_id,
            to: from_id,
            expected: link.direction.opposite(),
            found: back,
        });
    }
    if !from.footprint.contains(link.from_cell)
        || !to.footprint.contains(link.to_cell)
        || link.to_cell.step(back) != link.from_cell
    {
        return Err(not_adjacent);
    }

    let to_slot = to.slot_for_cell(back, link.to_cell);
    if to_slot != link.to_slot {
        return Err(ConnectionError::SlotMismatch {
            room: to_id,
            direction: back,
            expected: to_slot,
            found: link.to_slot,
        });
    }
    let from_slot = from.slot_for_cell(link.direction, link.from_cell);
    if from_slot != link.from_slot {
        return Err(ConnectionError::SlotMismatch {
            room: from_id,
            direction: link.direction,
            expected: from_slot,
            found: link.from_slot,
        });
    }
    Ok(())
}

/// Which wall a door opening sits on, from its offset to the room center.
///
/// An opening within `tolerance` of a wall snaps to the nearest such wall.
/// Otherwise the axis with the larger offset relative to the half-extent wins.
pub fn direction_from_offset(
    offset: WorldVec,
    half_extents: WorldVec,
    tolerance: f32,
) -> Direction {
    let walls = [
        (Direction::North, (offset.z - half_extents.z).abs()),
        (Direction::South, (offset.z + half_extents.z).abs()),
        (Direction::East, (offset.x - half_extents.x).abs()),
        (Direction::West, (offset.x + half_extents.x).abs()),
    ];
    let snapped = walls
        .iter()
        .filter(|(_, gap)| *gap <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((direction, _)) = snapped {
        return *direction;
    }

    let ratio = |value: f32, half: f32| if half > 0.0 { value.abs() / half } else { 0.0 };
    if ratio(offset.z, half_extents.z) >= ratio(offset.x, half_extents.x) {
        if offset.z >= 0.0 {
            Direction::North
        } else {
            Direction::South
        }
    } else if offset.x >= 0.0 {
        Direction::East
    } else {
        Direction::West
    }
}

/// Slot on `direction` side for an opening at `offset` from the room center
pub fn slot_from_offset(category: RoomCategory, direction: Direction, offset: WorldVec) -> u8 {
    let along = if direction.runs_along_x() {
        offset.x
    } else {
        offset.z
    };
    category.profile().slot_for_offset(direction, along)
}

/// Binding-time resolution of a door opening to `(direction, slot)`
pub fn resolve_hole(
    category: RoomCategory,
    half_extents: WorldVec,
    offset: WorldVec,
    tolerance: f32,
) -> (Direction, u8) {
    let direction = direction_from_offset(offset, half_extents, tolerance);
    (direction, slot_from_offset(category, direction, offset))
}
