//! Grid placement
//!
//! Places rooms on the [`PlacementGrid`] in four phases:
//!
//! 1. a main path of 1×1 rooms from an edge toward the grid center
//! 2. the boss room, adjacent to the end of the main path
//! 3. short branches growing away from interior main-path rooms
//! 4. fillers of mixed categories packed against occupied cells
//!
//! No phase is fatal. A step without a legal position is skipped and counted
//! in [`GenerationDiagnostics`]; the result always holds at least the entry.

use serde::{Deserialize, Serialize};

use crate::adjacency::are_adjacent;
use crate::category::RoomCategory;
use crate::context::MazeGenerationContext;
use crate::diagnostics::GenerationDiagnostics;
use crate::error::GenerationError;
use crate::geometry::{Direction, Footprint, GridPos};
use crate::grid::PlacementGrid;
use crate::rng::MazeRng;

/// A room placed on the grid, before it becomes a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInstance {
    pub category: RoomCategory,
    pub footprint: Footprint,
    pub is_entry: bool,
    pub is_boss: bool,
}

impl RoomInstance {
    pub const fn new(category: RoomCategory, origin: GridPos) -> Self {
        Self {
            category,
            footprint: category.footprint_at(origin),
            is_entry: false,
            is_boss: false,
        }
    }

    pub const fn origin(&self) -> GridPos {
        self.footprint.origin
    }
}

/// Result of the placement phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub grid: PlacementGrid,
    pub rooms: Vec<RoomInstance>,
    /// Planned main path as room indices, entry first, boss last when placed
    pub main_path: Vec<usize>,
    /// Room indices of each branch, excluding its main-path start
    pub branches: Vec<Vec<usize>>,
}

impl Placement {
    fn new(side: i32) -> Self {
        Self {
            grid: PlacementGrid::new(side),
            rooms: Vec::new(),
            main_path: Vec::new(),
            branches: Vec::new(),
        }
    }

    fn push(&mut self, room: RoomInstance) -> usize {
        let idx = self.rooms.len();
        self.grid.occupy(&room.footprint, idx);
        self.rooms.push(room);
        idx
    }

    pub fn entry(&self) -> Option<usize> {
        self.rooms.iter().position(|r| r.is_entry)
    }

    pub fn boss(&self) -> Option<usize> {
        self.rooms.iter().position(|r| r.is_boss)
    }
}

/// Place every room for one run.
pub fn place_rooms(
    ctx: &MazeGenerationContext<'_>,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) -> Placement {
    let mut placement = Placement::new(ctx.grid_side);

    place_main_path(ctx, &mut placement, rng, diag);
    place_boss(ctx, &mut placement, diag);
    place_branches(ctx, &mut placement, rng, diag);
    place_fillers(ctx, &mut placement, rng, diag);

    diag.placed_rooms = placement.rooms.len();
    log::debug!(
        "placement: {} rooms on a {}x{} grid ({} on main path, {} branches)",
        placement.rooms.len(),
        ctx.grid_side,
        ctx.grid_side,
        placement.main_path.len(),
        placement.branches.len()
    );
    placement
}

/// Random cell on a random edge of the grid
fn edge_cell(side: i32, rng: &mut MazeRng) -> GridPos {
    let along = rng.rn2(side as u32) as i32;
    match Direction::ALL[rng.index(4)] {
        Direction::North => GridPos::new(along, side - 1),
        Direction::South => GridPos::new(along, 0),
        Direction::East => GridPos::new(side - 1, along),
        Direction::West => GridPos::new(0, along),
    }
}

/// Pick the highest-scoring candidate
fn best_by_score(
    candidates: Vec<GridPos>,
    mut score: impl FnMut(GridPos) -> f32,
) -> Option<GridPos> {
    candidates
        .into_iter()
        .map(|pos| (pos, score(pos)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pos, _)| pos)
}

fn place_main_path(
    ctx: &MazeGenerationContext<'_>,
    placement: &mut Placement,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) {
    let length = ctx.main_path_length.roll(rng).max(1) as usize;
    let mut entry = RoomInstance::new(RoomCategory::Regular, edge_cell(ctx.grid_side, rng));
    entry.is_entry = true;
    let idx = placement.push(entry);
    placement.main_path.push(idx);

    let max_dist = (ctx.grid_side as f32 / 2.0 * std::f32::consts::SQRT_2).max(f32::EPSILON);
    let center_weight = ctx.config.center_weight;
    let jitter_weight = ctx.config.jitter_weight;

    let mut current = entry.origin();
    for step in 1..length {
        let candidates = placement.grid.free_neighbours(current);
        let grid = &placement.grid;
        let next = best_by_score(candidates, |pos| {
            -grid.distance_to_center(pos) / max_dist * center_weight
                + rng.unit() as f32 * jitter_weight
        });
        let Some(next) = next else {
            diag.skipped_main_path_steps += length - step;
            log::warn!(
                "main path stuck at {:?} after {} of {} rooms",
                current,
                step,
                length
            );
            break;
        };
        let idx = placement.push(RoomInstance::new(RoomCategory::Regular, next));
        placement.main_path.push(idx);
        current = next;
    }
}

/// First legal boss origin on expanding diamond rings around `anchor`
fn scan_boss_site(
    grid: &PlacementGrid,
    anchor: &Footprint,
    category: RoomCategory,
) -> Option<GridPos> {
    let reach = grid.side() * 2;
    for r in 0..=reach {
        for dx in -r..=r {
            let dy = r - dx.abs();
            let offsets = if dy == 0 { vec![(dx, 0)] } else { vec![(dx, -dy), (dx, dy)] };
            for (ox, oy) in offsets {
                let footprint = category.footprint_at(anchor.origin.offset(ox, oy));
                if grid.fits(&footprint) && are_adjacent(anchor, &footprint) {
                    return Some(footprint.origin);
                }
            }
        }
    }
    None
}

fn place_boss(
    ctx: &MazeGenerationContext<'_>,
    placement: &mut Placement,
    diag: &mut GenerationDiagnostics,
) {
    let Some(&last) = placement.main_path.last() else {
        return;
    };
    let anchor = placement.rooms[last].footprint;
    let wanted = ctx.config.boss_category;

    let mut site = scan_boss_site(&placement.grid, &anchor, wanted).map(|pos| (wanted, pos));
    if site.is_none() && wanted != RoomCategory::Regular {
        site = scan_boss_site(&placement.grid, &anchor, RoomCategory::Regular)
            .map(|pos| (RoomCategory::Regular, pos));
    }
    if site.is_none() {
        // Any placed room will do, newest first
        site = placement.rooms.iter().rev().find_map(|room| {
            scan_boss_site(&placement.grid, &room.footprint, RoomCategory::Regular)
                .map(|pos| (RoomCategory::Regular, pos))
        });
    }

    let Some((category, origin)) = site else {
        log::warn!("no legal position for the boss room");
        return;
    };
    if category != wanted {
        diag.boss_downgraded = true;
        log::warn!("boss room downgraded from {wanted} to {category}");
    }
    let mut boss = RoomInstance::new(category, origin);
    boss.is_boss = true;
    let idx = placement.push(boss);
    placement.main_path.push(idx);
}

fn place_branches(
    ctx: &MazeGenerationContext<'_>,
    placement: &mut Placement,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) {
    let path = &placement.main_path;
    if path.len() < 3 {
        return;
    }
    let mut starts: Vec<usize> = path[1..path.len() - 1].to_vec();
    rng.shuffle(&mut starts);
    starts.truncate(ctx.branch_count.roll(rng) as usize);

    let jitter_weight = ctx.config.jitter_weight;
    for start in starts {
        let origin = placement.rooms[start].origin();
        let length = ctx.branch_length.roll(rng) as usize;
        let mut branch = Vec::new();
        let mut current = origin;
        for step in 0..length {
            let candidates = placement.grid.free_neighbours(current);
            let next = best_by_score(candidates, |pos| {
                origin.distance(pos) + rng.unit() as f32 * jitter_weight
            });
            let Some(next) = next else {
                diag.skipped_branch_steps += length - step;
                log::debug!("branch from room {start} stopped after {step} of {length} rooms");
                break;
            };
            branch.push(placement.push(RoomInstance::new(RoomCategory::Regular, next)));
            current = next;
        }
        if !branch.is_empty() {
            placement.branches.push(branch);
        }
    }
}

/// Every origin where `category` fits and touches an occupied cell
fn filler_sites(grid: &PlacementGrid, category: RoomCategory) -> Vec<GridPos> {
    let side = grid.side();
    (0..side)
        .flat_map(|y| (0..side).map(move |x| GridPos::new(x, y)))
        .filter(|&origin| {
            let footprint = category.footprint_at(origin);
            grid.fits(&footprint) && grid.touches_occupied(&footprint)
        })
        .collect()
}

fn place_fillers(
    ctx: &MazeGenerationContext<'_>,
    placement: &mut Placement,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) {
    let target = ctx.room_count.roll(rng) as usize;
    diag.target_rooms = target;

    while placement.rooms.len() < target {
        let category = rng
            .choose(&ctx.config.filler_categories)
            .copied()
            .unwrap_or_default();
        let mut chosen = category;
        let mut sites = filler_sites(&placement.grid, category);
        if sites.is_empty() && category != RoomCategory::Regular {
            chosen = RoomCategory::Regular;
            sites = filler_sites(&placement.grid, chosen);
            if !sites.is_empty() {
                diag.filler_downgrades += 1;
                log::debug!("filler downgraded from {category} to Regular");
            }
        }
        let Some(&origin) = rng.choose(&sites) else {
            diag.skipped_fillers += target - placement.rooms.len();
            log::warn!(
                "grid full: {} of {} rooms placed",
                placement.rooms.len(),
                target
            );
            break;
        };
        placement.push(RoomInstance::new(chosen, origin));
    }
}

/// Minimal layout: a straight row of rooms across the middle of the grid,
/// ending in the boss room.
pub fn fallback_placement(ctx: &MazeGenerationContext<'_>) -> Result<Placement, GenerationError> {
    let side = ctx.grid_side;
    if side < 2 {
        return Err(GenerationError::FallbackFailed(format!(
            "grid side {side} cannot hold an entry and a boss"
        )));
    }
    let row = side / 2;
    let path_len = (ctx.main_path_length.min.max(1) as i32).min(side - 1);

    let mut placement = Placement::new(side);
    for x in 0..path_len {
        let mut room = RoomInstance::new(RoomCategory::Regular, GridPos::new(x, row));
        room.is_entry = x == 0;
        let idx = placement.push(room);
        placement.main_path.push(idx);
    }

    let origin = GridPos::new(path_len, row);
    let wanted = ctx.config.boss_category;
    let category = if placement.grid.fits(&wanted.footprint_at(origin)) {
        wanted
    } else {
        RoomCategory::Regular
    };
    if !placement.grid.fits(&category.footprint_at(origin)) {
        return Err(GenerationError::FallbackFailed(format!(
            "no room for the boss at {origin:?}"
        )));
    }
    let mut boss = RoomInstance::new(category, origin);
    boss.is_boss = true;
    let idx = placement.push(boss);
    placement.main_path.push(idx);
    Ok(placement)
}
