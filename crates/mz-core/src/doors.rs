//! Door binding
//!
//! Turns the graph's door states into enabled or disabled parts on the
//! instantiated geometry. Each connection ends up with exactly one
//! interactable door, on the endpoint whose grid origin is larger under the
//! derived `Ord` of [`GridPos`](crate::GridPos). The other endpoint's opening
//! becomes a pass-through; every other opening is walled off.

use hashbrown::HashMap;
use serde::Serialize;

use crate::diagnostics::GenerationDiagnostics;
use crate::door_index::resolve_hole;
use crate::geometry::Direction;
use crate::graph::{RoomGraph, RoomId};
use crate::scene::RoomGeometry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DoorBindingReport {
    /// Openings that matched an open door state
    pub candidates: usize,
    pub blocked: usize,
    pub owners: usize,
    pub pass_through: usize,
    pub mismatches: usize,
}

/// Location of one candidate opening
#[derive(Debug, Clone, Copy)]
struct HoleRef {
    geometry: usize,
    hole: usize,
    claimed: bool,
}

/// Binds graph door states to geometry openings
#[derive(Debug, Clone, Copy)]
pub struct DoorManager {
    /// Snap distance to a wall, in world units
    tolerance: f32,
}

impl DoorManager {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Bind every tagged opening in `geometries` against `graph`.
    pub fn bind(
        &self,
        graph: &RoomGraph,
        geometries: &mut [RoomGeometry],
        diag: &mut GenerationDiagnostics,
    ) -> DoorBindingReport {
        let mut report = DoorBindingReport::default();
        let mut slots: HashMap<(RoomId, Direction, u8), HoleRef> = HashMap::new();

        // Pass 1: resolve openings and keep those backed by an open door state
        for (gi, geometry) in geometries.iter_mut().enumerate() {
            let Some(node) = graph.node(geometry.room) else {
                log::warn!("geometry {:?} refers to unknown room {}", geometry.id, geometry.room);
                for hole in geometry.holes.iter_mut().filter(|h| h.is_door_hole()) {
                    hole.set_blocked();
                    report.blocked += 1;
                }
                continue;
            };
            let half = geometry.half_extents;
            for (hi, hole) in geometry.holes.iter_mut().enumerate() {
                if !hole.is_door_hole() {
                    continue;
                }
                let (direction, index) =
                    resolve_hole(node.category, half, hole.offset, self.tolerance);
                hole.resolved = Some((direction, index));
                let open = node
                    .door(direction, index)
                    .is_some_and(|door| door.is_connected());
                let key = (node.id, direction, index);
                if !open {
                    hole.set_blocked();
                    report.blocked += 1;
                } else if slots.contains_key(&key) {
                    log::warn!(
                        "room {} has a second opening on {direction} slot {index}",
                        node.id
                    );
                    hole.set_blocked();
                    report.blocked += 1;
                    report.mismatches += 1;
                } else {
                    slots.insert(
                        key,
                        HoleRef {
                            geometry: gi,
                            hole: hi,
                            claimed: false,
                        },
                    );
                    report.candidates += 1;
                }
            }
        }

        // Pass 2: one owner and one pass-through per connection
        for (edge, conn) in graph.connections().iter().enumerate() {
            let (Some(a), Some(b)) = (graph.node(conn.from), graph.node(conn.to)) else {
                continue;
            };
            let key_a = (conn.from, conn.link.direction, conn.link.from_slot);
            let key_b = (conn.to, conn.link.direction.opposite(), conn.link.to_slot);
            let (hole_a, hole_b) = (slots.get(&key_a).copied(), slots.get(&key_b).copied());
            let (Some(hole_a), Some(hole_b)) = (hole_a, hole_b) else {
                log::warn!(
                    "connection {} <-> {} is missing a door opening",
                    conn.from,
                    conn.to
                );
                for key in [key_a, key_b] {
                    if let Some(found) = slots.get_mut(&key) {
                        found.claimed = true;
                        geometries[found.geometry].holes[found.hole].set_blocked();
                        report.blocked += 1;
                    }
                }
                report.mismatches += 1;
                continue;
            };

            let (owner, other) = if a.origin() > b.origin() {
                (hole_a, hole_b)
            } else {
                (hole_b, hole_a)
            };
            geometries[owner.geometry].holes[owner.hole].set_owner(edge);
            geometries[other.geometry].holes[other.hole].set_pass_through(edge);
            report.owners += 1;
            report.pass_through += 1;
            for key in [key_a, key_b] {
                if let Some(found) = slots.get_mut(&key) {
                    found.claimed = true;
                }
            }
        }

        // Candidates no connection claimed
        for found in slots.values().filter(|found| !found.claimed) {
            geometries[found.geometry].holes[found.hole].set_blocked();
            report.blocked += 1;
            report.mismatches += 1;
        }

        diag.door_mismatches += report.mismatches;
        log::debug!(
            "doors: {} owners, {} pass-through, {} blocked, {} mismatches",
            report.owners,
            report.pass_through,
            report.blocked,
            report.mismatches
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::RoomCategory;
    use crate::geometry::GridPos;
    use crate::placement::RoomInstance;
    use crate::scene::{
        ContainerId, DoorHole, GridMetrics, HoleFlags, HoleRole, RoomInstantiator,
        TemplateInstantiator, WorldVec,
    };

    fn pair() -> (RoomGraph, Vec<RoomGeometry>) {
        let mut rooms = vec![
            RoomInstance::new(RoomCategory::Regular, GridPos::new(0, 0)),
            RoomInstance::new(RoomCategory::Wide, GridPos::new(1, 0)),
        ];
        rooms[0].is_entry = true;
        rooms[1].is_boss = true;
        let mut graph = RoomGraph::from_rooms(&rooms).unwrap();
        graph.connect(RoomId(0), RoomId(1), true, false).unwrap();
        let metrics = GridMetrics::new(10.0);
        let mut inst = TemplateInstantiator::new();
        let geos: Vec<RoomGeometry> = graph
            .nodes()
            .iter()
            .map(|node| inst.instantiate(node, ContainerId(0), &metrics))
            .collect();
        (graph, geos)
    }

    #[test]
    fn test_owner_is_larger_origin() {
        let (graph, mut geos) = pair();
        let mut diag = GenerationDiagnostics::default();
        let report = DoorManager::new(0.5).bind(&graph, &mut geos, &mut diag);
        assert_eq!(report.owners, 1);
        assert_eq!(report.pass_through, 1);
        assert_eq!(report.mismatches, 0);
        assert_eq!(diag.door_mismatches, 0);

        // Room 1 at (1,0) outranks room 0 at (0,0)
        let owner: Vec<&DoorHole> = geos[1].holes_for_edge(0).collect();
        assert_eq!(owner.len(), 1);
        assert_eq!(owner[0].role, HoleRole::Owner);
        assert!(owner[0].is_active_door());
        let passage: Vec<&DoorHole> = geos[0].holes_for_edge(0).collect();
        assert_eq!(passage[0].role, HoleRole::PassThrough);
        assert!(passage[0].flags.is_empty());

        let blocked = geos
            .iter()
            .flat_map(|g| g.door_holes())
            .filter(|h| h.role == HoleRole::Blocked)
            .count();
        // Regular has 4 openings, Wide has 6
        assert_eq!(blocked, 10 - 2);
        assert_eq!(report.blocked, 8);
    }

    #[test]
    fn test_duplicate_opening_is_blocked() {
        let (graph, mut geos) = pair();
        // A second opening on room 0's east wall
        geos[0].holes.push(DoorHole::new(WorldVec::new(5.0, 1.0)));
        let mut diag = GenerationDiagnostics::default();
        let report = DoorManager::new(0.5).bind(&graph, &mut geos, &mut diag);
        assert_eq!(report.mismatches, 1);
        assert_eq!(report.owners, 1);
        let extra = geos[0].holes.last().unwrap();
        assert_eq!(extra.role, HoleRole::Blocked);
        assert_eq!(extra.flags, HoleFlags::BLOCKER);
    }

    #[test]
    fn test_missing_opening_blocks_both_sides() {
        let (graph, mut geos) = pair();
        // Drop the wide room's west opening
        geos[1].holes.retain(|h| h.offset.x > -9.0);
        let mut diag = GenerationDiagnostics::default();
        let report = DoorManager::new(0.5).bind(&graph, &mut geos, &mut diag);
        assert_eq!(report.owners, 0);
        assert_eq!(report.mismatches, 1);
        assert_eq!(diag.door_mismatches, 1);
        assert!(geos.iter().flat_map(|g| g.door_holes()).all(|h| h.role == HoleRole::Blocked));
    }

    #[test]
    fn test_untagged_parts_are_ignored() {
        let (graph, mut geos) = pair();
        let mut decor = DoorHole::new(WorldVec::new(0.0, 0.0));
        decor.tag = "Decor".to_string();
        geos[0].holes.push(decor.clone());
        let mut diag = GenerationDiagnostics::default();
        DoorManager::new(0.5).bind(&graph, &mut geos, &mut diag);
        assert_eq!(geos[0].holes.last(), Some(&decor));
    }
}
