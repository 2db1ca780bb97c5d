//! Layout audit
//!
//! Mechanical checks of the properties every generated layout must hold.
//! An empty result means the layout is sound.

use hashbrown::HashMap;
use thiserror::Error;

use crate::door_index::validate_link;
use crate::generator::MazeLayout;
use crate::geometry::Direction;
use crate::graph::RoomId;
use crate::scene::HoleRole;

/// A broken layout property
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{count} room(s) unreachable from the entry")]
    Unreachable { count: usize },

    #[error("rooms {a} and {b} overlap")]
    Overlap { a: RoomId, b: RoomId },

    #[error("room {room} uses {direction} slot {index} for {uses} connections")]
    DuplicateSlot {
        room: RoomId,
        direction: Direction,
        index: u8,
        uses: usize,
    },

    #[error("connection {from} <-> {to} is inconsistent: {reason}")]
    InconsistentEdge {
        from: RoomId,
        to: RoomId,
        reason: String,
    },

    #[error("{loops} loop edges exceed the budget of {target}")]
    LoopBudgetExceeded { loops: usize, target: usize },

    #[error(
        "connection {edge} has {owners} interactable door(s) and {pass_through} pass-through(s)"
    )]
    Ownership {
        edge: usize,
        owners: usize,
        pass_through: usize,
    },

    #[error("connection {edge} has its door on room {owner}, expected room {expected}")]
    WrongOwner {
        edge: usize,
        owner: RoomId,
        expected: RoomId,
    },
}

/// Check `layout` and return every violation found.
pub fn audit_layout(layout: &MazeLayout) -> Vec<Violation> {
    let mut violations = Vec::new();
    let graph = &layout.graph;

    let count = graph.unreachable_count();
    if count > 0 {
        violations.push(Violation::Unreachable { count });
    }

    let nodes = graph.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            if a.footprint.intersects(&b.footprint) {
                violations.push(Violation::Overlap { a: a.id, b: b.id });
            }
        }
    }

    let mut slot_uses: HashMap<(RoomId, Direction, u8), usize> = HashMap::new();
    for conn in graph.connections() {
        *slot_uses
            .entry((conn.from, conn.link.direction, conn.link.from_slot))
            .or_default() += 1;
        *slot_uses
            .entry((conn.to, conn.link.direction.opposite(), conn.link.to_slot))
            .or_default() += 1;
    }
    let mut duplicates: Vec<_> = slot_uses.into_iter().filter(|(_, uses)| *uses > 1).collect();
    duplicates.sort_by_key(|(key, _)| *key);
    violations.extend(
        duplicates
            .into_iter()
            .map(|((room, direction, index), uses)| Violation::DuplicateSlot {
                room,
                direction,
                index,
                uses,
            }),
    );

    for conn in graph.connections() {
        if let Some(reason) = edge_problem(layout, conn) {
            violations.push(Violation::InconsistentEdge {
                from: conn.from,
                to: conn.to,
                reason,
            });
        }
    }

    let loops = graph.loop_count();
    if loops > layout.loop_target {
        violations.push(Violation::LoopBudgetExceeded {
            loops,
            target: layout.loop_target,
        });
    }

    if !layout.geometries.is_empty() {
        for (edge, conn) in graph.connections().iter().enumerate() {
            let holes = layout
                .geometries
                .iter()
                .flat_map(|g| g.holes_for_edge(edge).map(move |hole| (g.room, hole)));
            let (mut owners, mut pass_through) = (0, 0);
            let mut owner_room = None;
            for (room, hole) in holes {
                match hole.role {
                    HoleRole::Owner if hole.is_active_door() => {
                        owners += 1;
                        owner_room = Some(room);
                    }
                    HoleRole::PassThrough => pass_through += 1,
                    _ => {}
                }
            }
            if owners != 1 || pass_through != 1 {
                violations.push(Violation::Ownership {
                    edge,
                    owners,
                    pass_through,
                });
                continue;
            }
            match (owner_room, door_owner(layout, conn)) {
                (Some(owner), Some(expected)) if owner != expected => {
                    violations.push(Violation::WrongOwner {
                        edge,
                        owner,
                        expected,
                    });
                }
                _ => {}
            }
        }
    }

    violations
}

/// Endpoint with the larger grid origin
fn door_owner(layout: &MazeLayout, conn: &crate::graph::RoomConnection) -> Option<RoomId> {
    let a = layout.graph.node(conn.from)?;
    let b = layout.graph.node(conn.to)?;
    Some(if a.origin() > b.origin() { a.id } else { b.id })
}

/// Door states and geometry of one connection, checked from both ends
fn edge_problem(layout: &MazeLayout, conn: &crate::graph::RoomConnection) -> Option<String> {
    let graph = &layout.graph;
    let (Some(a), Some(b)) = (graph.node(conn.from), graph.node(conn.to)) else {
        return Some("unknown endpoint".to_string());
    };
    let link = &conn.link;
    if let Err(err) = validate_link(a.id, &a.shape(), b.id, &b.shape(), link) {
        return Some(err.to_string());
    }
    let door_a = a.door(link.direction, link.from_slot);
    let door_b = b.door(link.direction.opposite(), link.to_slot);
    match (door_a, door_b) {
        (Some(da), Some(db)) => {
            if !da.is_open || da.connected != Some(b.id) {
                Some(format!("door of room {} does not lead back", a.id))
            } else if !db.is_open || db.connected != Some(a.id) {
                Some(format!("door of room {} does not lead back", b.id))
            } else if da.direction != db.direction.opposite() {
                Some("door directions are not opposite".to_string())
            } else if da.is_loop != conn.is_loop || db.is_loop != conn.is_loop {
                Some("loop flag differs between door states".to_string())
            } else {
                None
            }
        }
        _ => Some("missing door slot".to_string()),
    }
}
