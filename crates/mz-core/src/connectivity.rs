//! Spanning connectivity (growing tree)
//!
//! Grows a spanning tree over grid adjacency from the entry room. The most
//! recently added active room is expanded with probability [`DEPTH_BIAS`],
//! otherwise a random active room is. Afterwards the boss is patched in if the
//! tree missed it, and a sweep picks up any room whose connection was refused.

use hashbrown::HashSet;
use serde::Serialize;

use crate::diagnostics::GenerationDiagnostics;
use crate::error::GenerationError;
use crate::graph::{RoomGraph, RoomId};
use crate::rng::MazeRng;

/// Probability of expanding the newest active room
pub const DEPTH_BIAS: f64 = 0.7;

/// What the connectivity pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    /// Edges created by the growing tree
    pub tree_edges: usize,
    /// Edges tagged as main path
    pub main_path_edges: usize,
    /// The boss was attached after the tree finished
    pub boss_patched: bool,
    /// Edges created by the final sweep
    pub swept: usize,
    /// Connections refused by validation
    pub rejected: usize,
}

struct TreeState {
    visited: Vec<bool>,
    /// Rooms reached through main-path edges
    on_path: Vec<bool>,
    /// Position of each room on the planned main path
    planned: Vec<Option<usize>>,
    refused: HashSet<(RoomId, RoomId)>,
}

impl TreeState {
    fn is_main_edge(&self, from: RoomId, to: RoomId) -> bool {
        self.on_path[from.index()] && self.planned[to.index()].is_some()
    }

    fn is_refused(&self, a: RoomId, b: RoomId) -> bool {
        self.refused.contains(&(a.min(b), a.max(b)))
    }

    /// Connect `from` to `to`, marking `to` as reached on success
    fn try_connect(
        &mut self,
        graph: &mut RoomGraph,
        from: RoomId,
        to: RoomId,
        report: &mut ConnectivityReport,
        diag: &mut GenerationDiagnostics,
    ) -> bool {
        let is_main = self.is_main_edge(from, to);
        match graph.connect(from, to, is_main, false) {
            Ok(_) => {
                self.visited[to.index()] = true;
                if is_main {
                    self.on_path[to.index()] = true;
                    report.main_path_edges += 1;
                }
                true
            }
            Err(err) => {
                log::warn!("connection {from} -> {to} rejected: {err}");
                self.refused.insert((from.min(to), from.max(to)));
                report.rejected += 1;
                diag.rejected_connections += 1;
                false
            }
        }
    }
}

/// Connect every room of `graph` into one component rooted at the entry.
///
/// `main_path` is the planned main path from placement, entry first. Fails
/// with [`GenerationError::Disconnected`] if some room cannot be reached.
pub fn connect_rooms(
    graph: &mut RoomGraph,
    main_path: &[RoomId],
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) -> Result<ConnectivityReport, GenerationError> {
    let n = graph.len();
    let entry = graph.entry();
    let boss = graph.boss();

    let mut planned = vec![None; n];
    for (order, id) in main_path.iter().enumerate() {
        if let Some(slot) = planned.get_mut(id.index()) {
            *slot = Some(order);
        }
    }
    let mut state = TreeState {
        visited: vec![false; n],
        on_path: vec![false; n],
        planned,
        refused: HashSet::new(),
    };
    state.visited[entry.index()] = true;
    state.on_path[entry.index()] = true;

    let mut report = ConnectivityReport::default();
    let mut active = vec![entry];

    while !active.is_empty() {
        let pick = if rng.chance(DEPTH_BIAS) {
            active.len() - 1
        } else {
            rng.index(active.len())
        };
        let current = active[pick];
        let candidates: Vec<RoomId> = graph
            .adjacent_rooms(current)
            .into_iter()
            .filter(|&id| !state.visited[id.index()] && !state.is_refused(current, id))
            .collect();
        let Some(&target) = rng.choose(&candidates) else {
            active.remove(pick);
            continue;
        };
        if state.try_connect(graph, current, target, &mut report, diag) {
            report.tree_edges += 1;
            active.push(target);
        }
    }

    if !state.visited[boss.index()] {
        report.boss_patched = patch_boss(graph, &mut state, &mut report, diag);
    }
    report.swept = sweep(graph, &mut state, &mut report, diag);

    let unreachable = state.visited.iter().filter(|v| !**v).count();
    if unreachable > 0 {
        log::error!("{unreachable} room(s) left unreachable after the sweep");
        return Err(GenerationError::Disconnected { unreachable });
    }
    log::debug!(
        "connectivity: {} tree edges, {} main path, {} swept, {} rejected",
        report.tree_edges,
        report.main_path_edges,
        report.swept,
        report.rejected
    );
    Ok(report)
}

/// Attach the boss to its most path-favouring reached neighbour
fn patch_boss(
    graph: &mut RoomGraph,
    state: &mut TreeState,
    report: &mut ConnectivityReport,
    diag: &mut GenerationDiagnostics,
) -> bool {
    let boss = graph.boss();
    let mut candidates: Vec<RoomId> = graph
        .adjacent_rooms(boss)
        .into_iter()
        .filter(|id| state.visited[id.index()])
        .collect();
    // Best first: on the established path, then latest on the planned path
    candidates.sort_by_key(|id| {
        std::cmp::Reverse((state.on_path[id.index()], state.planned[id.index()]))
    });
    for from in candidates {
        if state.try_connect(graph, from, boss, report, diag) {
            log::debug!("boss attached to room {from} after the tree pass");
            return true;
        }
    }
    false
}

/// Connect unreached rooms to any reached neighbour until nothing changes
fn sweep(
    graph: &mut RoomGraph,
    state: &mut TreeState,
    report: &mut ConnectivityReport,
    diag: &mut GenerationDiagnostics,
) -> usize {
    let mut swept = 0;
    loop {
        let mut progress = false;
        for idx in 0..graph.len() {
            if state.visited[idx] {
                continue;
            }
            let id = RoomId(idx);
            let sources: Vec<RoomId> = graph
                .adjacent_rooms(id)
                .into_iter()
                .filter(|nb| state.visited[nb.index()] && !state.is_refused(*nb, id))
                .collect();
            for from in sources {
                if state.try_connect(graph, from, id, report, diag) {
                    swept += 1;
                    progress = true;
                    break;
                }
            }
        }
        if !progress {
            return swept;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::RoomCategory;
    use crate::geometry::GridPos;
    use crate::placement::RoomInstance;

    fn line(n: i32) -> RoomGraph {
        let mut rooms: Vec<RoomInstance> = (0..n)
            .map(|x| RoomInstance::new(RoomCategory::Regular, GridPos::new(x, 0)))
            .collect();
        rooms[0].is_entry = true;
        rooms[(n - 1) as usize].is_boss = true;
        RoomGraph::from_rooms(&rooms).unwrap()
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<RoomId> {
        range.map(RoomId).collect()
    }

    #[test]
    fn test_line_is_all_main_path() {
        let mut graph = line(5);
        let mut rng = MazeRng::new(42);
        let mut diag = GenerationDiagnostics::default();
        let report = connect_rooms(&mut graph, &ids(0..5), &mut rng, &mut diag).unwrap();
        assert_eq!(report.tree_edges, 4);
        assert_eq!(report.main_path_edges, 4);
        assert_eq!(graph.main_path_count(), 4);
        assert!(graph.is_fully_connected());
        assert!(!report.boss_patched);
    }

    #[test]
    fn test_tree_has_n_minus_one_edges() {
        // 3x3 block of 1x1 rooms, entry at a corner
        let mut rooms = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                rooms.push(RoomInstance::new(RoomCategory::Regular, GridPos::new(x, y)));
            }
        }
        rooms[0].is_entry = true;
        rooms[8].is_boss = true;
        for seed in 0..10 {
            let mut graph = RoomGraph::from_rooms(&rooms).unwrap();
            let mut rng = MazeRng::new(seed);
            let mut diag = GenerationDiagnostics::default();
            let path = vec![RoomId(0), RoomId(1), RoomId(2), RoomId(5), RoomId(8)];
            connect_rooms(&mut graph, &path, &mut rng, &mut diag).unwrap();
            assert_eq!(graph.connections().len(), 8);
            assert_eq!(graph.unreachable_count(), 0);
            assert_eq!(diag.rejected_connections, 0);
        }
    }

    #[test]
    fn test_off_path_rooms_are_not_main() {
        // Entry and boss in a row, with one side room off the entry
        let mut rooms = vec![
            RoomInstance::new(RoomCategory::Regular, GridPos::new(0, 0)),
            RoomInstance::new(RoomCategory::Regular, GridPos::new(1, 0)),
            RoomInstance::new(RoomCategory::Regular, GridPos::new(0, 1)),
        ];
        rooms[0].is_entry = true;
        rooms[1].is_boss = true;
        let mut graph = RoomGraph::from_rooms(&rooms).unwrap();
        let mut rng = MazeRng::new(1);
        let mut diag = GenerationDiagnostics::default();
        connect_rooms(&mut graph, &ids(0..2), &mut rng, &mut diag).unwrap();
        let side = graph.node(RoomId(2)).unwrap().door_to(RoomId(0)).unwrap();
        assert!(!side.is_main_path);
        let boss = graph.node(RoomId(1)).unwrap().door_to(RoomId(0)).unwrap();
        assert!(boss.is_main_path);
    }

    #[test]
    fn test_isolated_room_is_structural_failure() {
        let mut rooms = vec![
            RoomInstance::new(RoomCategory::Regular, GridPos::new(0, 0)),
            RoomInstance::new(RoomCategory::Regular, GridPos::new(1, 0)),
            RoomInstance::new(RoomCategory::Regular, GridPos::new(5, 5)),
        ];
        rooms[0].is_entry = true;
        rooms[1].is_boss = true;
        let mut graph = RoomGraph::from_rooms(&rooms).unwrap();
        let mut rng = MazeRng::new(1);
        let mut diag = GenerationDiagnostics::default();
        assert_eq!(
            connect_rooms(&mut graph, &ids(0..2), &mut rng, &mut diag),
            Err(GenerationError::Disconnected { unreachable: 1 })
        );
    }

    #[test]
    fn test_deterministic_for_seed() {
        let run = |seed| {
            let mut rooms = Vec::new();
            for y in 0..4 {
                for x in 0..4 {
                    rooms.push(RoomInstance::new(RoomCategory::Regular, GridPos::new(x, y)));
                }
            }
            rooms[0].is_entry = true;
            rooms[15].is_boss = true;
            let mut graph = RoomGraph::from_rooms(&rooms).unwrap();
            let mut rng = MazeRng::new(seed);
            let mut diag = GenerationDiagnostics::default();
            connect_rooms(&mut graph, &[RoomId(0), RoomId(15)], &mut rng, &mut diag).unwrap();
            graph.connections().to_vec()
        };
        assert_eq!(run(5), run(5));
    }
}
