//! Room graph
//!
//! [`RoomGraph`] owns every [`RoomNode`] and [`RoomConnection`] of one level.
//! Connections are only created through [`RoomGraph::connect`], which writes
//! the two matching [`DoorState`] entries together or not at all.

use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::adjacency::are_adjacent;
use crate::category::{RoomCategory, RoomShape};
use crate::config::MazeConfig;
use crate::door_index::{DoorLink, propose_link, validate_link};
use crate::error::{ConnectionError, GenerationError};
use crate::geometry::{Direction, Footprint, GridPos};
use crate::placement::{Placement, RoomInstance};
use crate::rng::MazeRng;
use crate::scene::GeometryId;
use crate::tracker::ConnectivityTracker;

/// Index of a room in its graph
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub usize);

impl RoomId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved outcome of one door slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorState {
    pub direction: Direction,
    pub index: u8,
    pub is_open: bool,
    pub is_main_path: bool,
    pub is_loop: bool,
    pub connected: Option<RoomId>,
}

impl DoorState {
    fn closed(direction: Direction, index: u8) -> Self {
        Self {
            direction,
            index,
            is_open: false,
            is_main_path: false,
            is_loop: false,
            connected: None,
        }
    }

    /// Open and leading to a neighbour
    pub fn is_connected(&self) -> bool {
        self.is_open && self.connected.is_some()
    }
}

/// Graph vertex: a placed room and its door slots
#[derive(Debug, Clone, Serialize)]
pub struct RoomNode {
    pub id: RoomId,
    pub category: RoomCategory,
    pub footprint: Footprint,
    pub is_entry: bool,
    pub is_boss: bool,
    /// Template chosen from the configured pool, opaque to the generator
    pub template: Option<String>,
    /// Instantiated geometry, set once the room has been built
    pub visual: Option<GeometryId>,
    /// One slot list per direction, indexed by [`Direction::index`]
    doors: [Vec<DoorState>; 4],
}

impl RoomNode {
    pub fn new(id: RoomId, instance: &RoomInstance) -> Self {
        let profile = instance.category.profile();
        let doors: [Vec<DoorState>; 4] = Direction::ALL.map(|direction| {
            (0..profile.slots(direction))
                .map(|index| DoorState::closed(direction, index))
                .collect()
        });
        Self {
            id,
            category: instance.category,
            footprint: instance.footprint,
            is_entry: instance.is_entry,
            is_boss: instance.is_boss,
            template: None,
            visual: None,
            doors,
        }
    }

    pub fn shape(&self) -> RoomShape {
        RoomShape {
            category: self.category,
            footprint: self.footprint,
        }
    }

    pub fn origin(&self) -> GridPos {
        self.footprint.origin
    }

    /// Slots on one side, ordered by index
    pub fn doors(&self, direction: Direction) -> &[DoorState] {
        &self.doors[direction.index()]
    }

    pub fn door(&self, direction: Direction, index: u8) -> Option<&DoorState> {
        self.doors[direction.index()].get(index as usize)
    }

    pub fn all_doors(&self) -> impl Iterator<Item = &DoorState> {
        self.doors.iter().flatten()
    }

    /// Doors that are open and lead to a neighbour
    pub fn open_doors(&self) -> impl Iterator<Item = &DoorState> {
        self.all_doors().filter(|door| door.is_connected())
    }

    /// The door leading to `other`, if the two rooms are connected
    pub fn door_to(&self, other: RoomId) -> Option<&DoorState> {
        self.open_doors().find(|door| door.connected == Some(other))
    }

    fn check_slot_free(&self, direction: Direction, index: u8) -> Result<(), ConnectionError> {
        match self.door(direction, index) {
            None => Err(ConnectionError::SlotMismatch {
                room: self.id,
                direction,
                expected: 0,
                found: index,
            }),
            Some(door) => match door.connected {
                Some(owner) if door.is_open => Err(ConnectionError::SlotTaken {
                    room: self.id,
                    direction,
                    index,
                    owner,
                }),
                _ => Ok(()),
            },
        }
    }

    fn claim_slot(
        &mut self,
        direction: Direction,
        index: u8,
        neighbour: RoomId,
        is_main_path: bool,
        is_loop: bool,
    ) {
        if let Some(door) = self.doors[direction.index()].get_mut(index as usize) {
            door.is_open = true;
            door.connected = Some(neighbour);
            door.is_main_path = is_main_path;
            door.is_loop = is_loop;
        }
    }
}

/// Undirected edge between two rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConnection {
    pub from: RoomId,
    pub to: RoomId,
    pub is_main_path: bool,
    pub is_loop: bool,
    /// Door cells and slots, seen from `from`
    pub link: DoorLink,
}

impl RoomConnection {
    pub fn involves(&self, room: RoomId) -> bool {
        self.from == room || self.to == room
    }

    /// The endpoint that is not `room`
    pub fn other(&self, room: RoomId) -> Option<RoomId> {
        if self.from == room {
            Some(self.to)
        } else if self.to == room {
            Some(self.from)
        } else {
            None
        }
    }
}

fn pair_key(a: RoomId, b: RoomId) -> (RoomId, RoomId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// All rooms and connections of one generated level
#[derive(Debug, Clone, Serialize)]
pub struct RoomGraph {
    nodes: Vec<RoomNode>,
    connections: Vec<RoomConnection>,
    entry: RoomId,
    boss: RoomId,
    #[serde(skip)]
    linked: HashSet<(RoomId, RoomId)>,
}

impl RoomGraph {
    /// Wrap placed rooms into graph nodes. Performs no topology work.
    ///
    /// Fails if there is no entry room or no boss room.
    pub fn from_rooms(rooms: &[RoomInstance]) -> Result<Self, GenerationError> {
        if rooms.is_empty() {
            return Err(GenerationError::EmptyPlacement);
        }
        let nodes: Vec<RoomNode> = rooms
            .iter()
            .enumerate()
            .map(|(i, instance)| RoomNode::new(RoomId(i), instance))
            .collect();
        let entry = nodes
            .iter()
            .find(|n| n.is_entry)
            .map(|n| n.id)
            .ok_or(GenerationError::EmptyPlacement)?;
        let boss = nodes
            .iter()
            .find(|n| n.is_boss)
            .map(|n| n.id)
            .ok_or(GenerationError::BossUnplaced)?;
        Ok(Self {
            nodes,
            connections: Vec::new(),
            entry,
            boss,
            linked: HashSet::new(),
        })
    }

    /// Build the graph for a placement and pick each room's template.
    pub fn from_placement(
        placement: &Placement,
        config: &MazeConfig,
        rng: &mut MazeRng,
    ) -> Result<Self, GenerationError> {
        let mut graph = Self::from_rooms(&placement.rooms)?;
        for node in &mut graph.nodes {
            let fixed = if node.is_entry {
                config.entry_template.clone()
            } else if node.is_boss {
                config.boss_template.clone()
            } else {
                None
            };
            node.template =
                fixed.or_else(|| rng.choose(config.templates.pool(node.category)).cloned());
        }
        log::debug!(
            "room graph built: {} nodes, entry {}, boss {}",
            graph.nodes.len(),
            graph.entry,
            graph.boss
        );
        Ok(graph)
    }

    pub fn nodes(&self) -> &[RoomNode] {
        &self.nodes
    }

    pub fn node(&self, id: RoomId) -> Option<&RoomNode> {
        self.nodes.get(id.index())
    }

    pub fn connections(&self) -> &[RoomConnection] {
        &self.connections
    }

    pub fn entry(&self) -> RoomId {
        self.entry
    }

    pub fn boss(&self) -> RoomId {
        self.boss
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_visual(&mut self, id: RoomId, visual: GeometryId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.visual = Some(visual);
        }
    }

    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.linked.contains(&pair_key(a, b))
    }

    /// Create a validated bidirectional connection between two adjacent rooms.
    ///
    /// Both door states are written together. On any error the graph is left
    /// untouched. Returns the index of the new connection.
    pub fn connect(
        &mut self,
        from: RoomId,
        to: RoomId,
        is_main_path: bool,
        is_loop: bool,
    ) -> Result<usize, ConnectionError> {
        let a = self.node(from).ok_or(ConnectionError::UnknownRoom(from))?;
        let b = self.node(to).ok_or(ConnectionError::UnknownRoom(to))?;
        if from == to {
            return Err(ConnectionError::SelfConnection(from));
        }
        if self.are_connected(from, to) {
            return Err(ConnectionError::AlreadyConnected { from, to });
        }

        let (shape_a, shape_b) = (a.shape(), b.shape());
        let link = propose_link(from, &shape_a, to, &shape_b)?;
        validate_link(from, &shape_a, to, &shape_b, &link)?;
        a.check_slot_free(link.direction, link.from_slot)?;
        b.check_slot_free(link.direction.opposite(), link.to_slot)?;

        self.nodes[from.index()].claim_slot(
            link.direction,
            link.from_slot,
            to,
            is_main_path,
            is_loop,
        );
        self.nodes[to.index()].claim_slot(
            link.direction.opposite(),
            link.to_slot,
            from,
            is_main_path,
            is_loop,
        );
        self.linked.insert(pair_key(from, to));
        self.connections.push(RoomConnection {
            from,
            to,
            is_main_path,
            is_loop,
            link,
        });
        Ok(self.connections.len() - 1)
    }

    /// Rooms connected to `id`, in connection order
    pub fn neighbours(&self, id: RoomId) -> Vec<RoomId> {
        self.connections
            .iter()
            .filter_map(|conn| conn.other(id))
            .collect()
    }

    /// Rooms sharing a wall with `id`, connected or not, in id order
    pub fn adjacent_rooms(&self, id: RoomId) -> Vec<RoomId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .filter(|other| other.id != id && are_adjacent(&node.footprint, &other.footprint))
            .map(|other| other.id)
            .collect()
    }

    /// Breadth-first reachability over connections
    pub fn reachable_from(&self, start: RoomId) -> Vec<bool> {
        let mut seen = vec![false; self.nodes.len()];
        if start.index() >= seen.len() {
            return seen;
        }
        let mut adjacency: Vec<Vec<RoomId>> = vec![Vec::new(); self.nodes.len()];
        for conn in &self.connections {
            adjacency[conn.from.index()].push(conn.to);
            adjacency[conn.to.index()].push(conn.from);
        }

        let mut queue = VecDeque::from([start]);
        seen[start.index()] = true;
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current.index()] {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Rooms not reachable from the entry
    pub fn unreachable_count(&self) -> usize {
        self.reachable_from(self.entry)
            .iter()
            .filter(|reached| !**reached)
            .count()
    }

    pub fn is_fully_connected(&self) -> bool {
        let mut tracker = ConnectivityTracker::new(self.nodes.len());
        for conn in &self.connections {
            tracker.merge(conn.from.index(), conn.to.index());
        }
        tracker.all_connected()
    }

    pub fn loop_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_loop).count()
    }

    pub fn main_path_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_main_path).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(category: RoomCategory, x: i32, y: i32) -> RoomInstance {
        RoomInstance::new(category, GridPos::new(x, y))
    }

    fn graph(mut rooms: Vec<RoomInstance>) -> RoomGraph {
        rooms[0].is_entry = true;
        let last = rooms.len() - 1;
        rooms[last].is_boss = true;
        RoomGraph::from_rooms(&rooms).unwrap()
    }

    #[test]
    fn test_node_slot_layout() {
        let g = graph(vec![
            room(RoomCategory::Regular, 0, 0),
            room(RoomCategory::Wide, 1, 0),
            room(RoomCategory::Large, 3, 0),
        ]);
        let regular = g.node(RoomId(0)).unwrap();
        for dir in Direction::ALL {
            assert_eq!(regular.doors(dir).len(), 1);
        }
        let wide = g.node(RoomId(1)).unwrap();
        assert_eq!(wide.doors(Direction::North).len(), 2);
        assert_eq!(wide.doors(Direction::East).len(), 1);
        assert_eq!(g.node(RoomId(2)).unwrap().all_doors().count(), 8);
    }

    #[test]
    fn test_connect_writes_both_sides() {
        let mut g = graph(vec![
            room(RoomCategory::Regular, 0, 0),
            room(RoomCategory::Regular, 1, 0),
        ]);
        let idx = g.connect(RoomId(0), RoomId(1), true, false).unwrap();
        assert_eq!(idx, 0);
        assert!(g.are_connected(RoomId(1), RoomId(0)));

        let a = g.node(RoomId(0)).unwrap().door_to(RoomId(1)).unwrap();
        assert_eq!(a.direction, Direction::East);
        assert!(a.is_main_path);
        let b = g.node(RoomId(1)).unwrap().door_to(RoomId(0)).unwrap();
        assert_eq!(b.direction, Direction::West);
        assert_eq!(g.neighbours(RoomId(1)), vec![RoomId(0)]);
    }

    #[test]
    fn test_connect_rejects_duplicates_and_gaps() {
        let mut g = graph(vec![
            room(RoomCategory::Regular, 0, 0),
            room(RoomCategory::Regular, 1, 0),
            room(RoomCategory::Regular, 3, 0),
        ]);
        g.connect(RoomId(0), RoomId(1), false, false).unwrap();
        assert_eq!(
            g.connect(RoomId(1), RoomId(0), false, true),
            Err(ConnectionError::AlreadyConnected {
                from: RoomId(1),
                to: RoomId(0)
            })
        );
        assert!(matches!(
            g.connect(RoomId(1), RoomId(2), false, false),
            Err(ConnectionError::NotAdjacent { .. })
        ));
        assert_eq!(
            g.connect(RoomId(0), RoomId(9), false, false),
            Err(ConnectionError::UnknownRoom(RoomId(9)))
        );
        assert_eq!(g.connections().len(), 1);
    }

    #[test]
    fn test_wide_room_two_north_neighbours() {
        let mut g = graph(vec![
            room(RoomCategory::Wide, 3, 5),
            room(RoomCategory::Regular, 3, 6),
            room(RoomCategory::Regular, 4, 6),
        ]);
        g.connect(RoomId(0), RoomId(1), false, false).unwrap();
        g.connect(RoomId(2), RoomId(0), false, false).unwrap();
        let wide = g.node(RoomId(0)).unwrap();
        assert_eq!(wide.door(Direction::North, 0).unwrap().connected, Some(RoomId(1)));
        assert_eq!(wide.door(Direction::North, 1).unwrap().connected, Some(RoomId(2)));
    }

    #[test]
    fn test_reachability() {
        let mut g = graph(vec![
            room(RoomCategory::Regular, 0, 0),
            room(RoomCategory::Regular, 1, 0),
            room(RoomCategory::Regular, 2, 0),
        ]);
        g.connect(RoomId(0), RoomId(1), true, false).unwrap();
        assert_eq!(g.unreachable_count(), 1);
        assert!(!g.is_fully_connected());
        g.connect(RoomId(1), RoomId(2), true, false).unwrap();
        assert_eq!(g.unreachable_count(), 0);
        assert!(g.is_fully_connected());
        assert_eq!(g.main_path_count(), 2);
        assert_eq!(g.adjacent_rooms(RoomId(1)), vec![RoomId(0), RoomId(2)]);
    }

    #[test]
    fn test_from_rooms_requires_boss() {
        let mut rooms = vec![room(RoomCategory::Regular, 0, 0)];
        rooms[0].is_entry = true;
        assert_eq!(
            RoomGraph::from_rooms(&rooms).unwrap_err(),
            GenerationError::BossUnplaced
        );
        assert_eq!(
            RoomGraph::from_rooms(&[]).unwrap_err(),
            GenerationError::EmptyPlacement
        );
    }
}
