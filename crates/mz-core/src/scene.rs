//! Instantiated room geometry
//!
//! The generator never touches an engine directly. It hands each graph node
//! to a [`RoomInstantiator`], which returns a [`RoomGeometry`] holding the
//! room's world placement and its tagged door openings. The door manager then
//! flips each opening's [`HoleFlags`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Footprint, GridPos};
use crate::graph::{RoomId, RoomNode};

/// Tag carried by sub-objects that are door openings
pub const DOOR_HOLE_TAG: &str = "DoorHole";

/// Horizontal world-space vector; `z` points north
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldVec {
    pub x: f32,
    pub z: f32,
}

impl WorldVec {
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn sub(self, other: WorldVec) -> WorldVec {
        WorldVec::new(self.x - other.x, self.z - other.z)
    }
}

/// Parent container handle supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

/// Handle of one instantiated room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryId(pub u64);

/// Conversion between grid cells and world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub cell_size: f32,
}

impl GridMetrics {
    pub const fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    pub fn world_center(&self, footprint: &Footprint) -> WorldVec {
        let (cx, cy) = footprint.center();
        WorldVec::new(cx * self.cell_size, cy * self.cell_size)
    }

    pub fn half_extents(&self, footprint: &Footprint) -> WorldVec {
        WorldVec::new(
            footprint.size.w as f32 * self.cell_size / 2.0,
            footprint.size.h as f32 * self.cell_size / 2.0,
        )
    }

    /// Offset from the room center to the middle of `cell`'s wall on `direction`
    pub fn door_offset(
        &self,
        footprint: &Footprint,
        direction: Direction,
        cell: GridPos,
    ) -> WorldVec {
        let center = self.world_center(footprint);
        let half = self.half_extents(footprint);
        let along_x = (cell.x as f32 + 0.5) * self.cell_size - center.x;
        let along_z = (cell.y as f32 + 0.5) * self.cell_size - center.z;
        match direction {
            Direction::North => WorldVec::new(along_x, half.z),
            Direction::South => WorldVec::new(along_x, -half.z),
            Direction::East => WorldVec::new(half.x, along_z),
            Direction::West => WorldVec::new(-half.x, along_z),
        }
    }
}

bitflags! {
    /// Enabled parts of a door opening
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HoleFlags: u8 {
        /// Door part is enabled
        const DOOR = 0x01;
        /// Blocking wall part is enabled
        const BLOCKER = 0x02;
        /// Door reacts to the player
        const INTERACTABLE = 0x04;
    }
}

/// Outcome of binding for one opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoleRole {
    /// Not processed yet
    #[default]
    Unbound,
    /// Walled off
    Blocked,
    /// Carries the single interactable door of an edge
    Owner,
    /// Open passage on the non-owning side of an edge
    PassThrough,
}

/// A tagged door opening inside a room's geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorHole {
    pub tag: String,
    /// Position relative to the room's world center
    pub offset: WorldVec,
    pub flags: HoleFlags,
    pub role: HoleRole,
    /// Side and slot the opening resolved to during binding
    pub resolved: Option<(Direction, u8)>,
    /// Index of the graph connection served by this opening
    pub edge: Option<usize>,
}

impl DoorHole {
    /// Fresh opening as authored in a template: both parts present
    pub fn new(offset: WorldVec) -> Self {
        Self {
            tag: DOOR_HOLE_TAG.to_string(),
            offset,
            flags: HoleFlags::DOOR | HoleFlags::BLOCKER,
            role: HoleRole::Unbound,
            resolved: None,
            edge: None,
        }
    }

    pub fn is_door_hole(&self) -> bool {
        self.tag == DOOR_HOLE_TAG
    }

    pub fn set_blocked(&mut self) {
        self.flags = HoleFlags::BLOCKER;
        self.role = HoleRole::Blocked;
        self.edge = None;
    }

    pub fn set_owner(&mut self, edge: usize) {
        self.flags = HoleFlags::DOOR | HoleFlags::INTERACTABLE;
        self.role = HoleRole::Owner;
        self.edge = Some(edge);
    }

    pub fn set_pass_through(&mut self, edge: usize) {
        self.flags = HoleFlags::empty();
        self.role = HoleRole::PassThrough;
        self.edge = Some(edge);
    }

    /// Enabled, interactable door
    pub fn is_active_door(&self) -> bool {
        self.flags.contains(HoleFlags::DOOR | HoleFlags::INTERACTABLE)
    }
}

/// One instantiated room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomGeometry {
    pub id: GeometryId,
    pub room: RoomId,
    pub parent: ContainerId,
    pub template: Option<String>,
    /// World-space center of the footprint
    pub center: WorldVec,
    pub half_extents: WorldVec,
    pub holes: Vec<DoorHole>,
}

impl RoomGeometry {
    pub fn door_holes(&self) -> impl Iterator<Item = &DoorHole> {
        self.holes.iter().filter(|hole| hole.is_door_hole())
    }

    /// Holes currently bound to graph connection `edge`
    pub fn holes_for_edge(&self, edge: usize) -> impl Iterator<Item = &DoorHole> {
        self.door_holes().filter(move |hole| hole.edge == Some(edge))
    }
}

/// Engine seam: builds the geometry of one room under `parent`
pub trait RoomInstantiator {
    fn instantiate(
        &mut self,
        node: &RoomNode,
        parent: ContainerId,
        metrics: &GridMetrics,
    ) -> RoomGeometry;
}

/// Built-in instantiator: one door opening per border cell per side.
///
/// `misplacement` pulls every opening that many world units off its wall
/// toward the room center, which exercises the binder's tolerance handling.
/// Openings stay resolvable while it is below a quarter of the cell size.
#[derive(Debug, Clone, Default)]
pub struct TemplateInstantiator {
    next_id: u64,
    misplacement: f32,
}

impl TemplateInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_misplacement(misplacement: f32) -> Self {
        Self {
            next_id: 0,
            misplacement: misplacement.max(0.0),
        }
    }

    fn hole(
        &self,
        metrics: &GridMetrics,
        footprint: &Footprint,
        direction: Direction,
        cell: GridPos,
    ) -> DoorHole {
        let mut offset = metrics.door_offset(footprint, direction, cell);
        let (dx, dz) = direction.delta();
        offset.x -= dx as f32 * self.misplacement;
        offset.z -= dz as f32 * self.misplacement;
        DoorHole::new(offset)
    }
}

impl RoomInstantiator for TemplateInstantiator {
    fn instantiate(
        &mut self,
        node: &RoomNode,
        parent: ContainerId,
        metrics: &GridMetrics,
    ) -> RoomGeometry {
        let id = GeometryId(self.next_id);
        self.next_id += 1;
        let footprint = node.footprint;
        let holes = Direction::ALL
            .iter()
            .flat_map(|&dir| {
                footprint
                    .border_cells(dir)
                    .into_iter()
                    .map(move |cell| (dir, cell))
            })
            .map(|(dir, cell)| self.hole(metrics, &footprint, dir, cell))
            .collect();
        RoomGeometry {
            id,
            room: node.id,
            parent,
            template: node.template.clone(),
            center: metrics.world_center(&footprint),
            half_extents: metrics.half_extents(&footprint),
            holes,
        }
    }
}
