//! Grid adjacency between room footprints

use crate::geometry::{Direction, Footprint, GridPos};

/// Number of cells shared by the closed spans [a0, a1] and [b0, b1]
fn span_overlap(a0: i32, a1: i32, b0: i32, b1: i32) -> i32 {
    (a1.min(b1) - a0.max(b0) + 1).max(0)
}

/// Side of `a` that touches `b`, if the two footprints are adjacent.
///
/// Adjacent means the rectangles sit exactly one cell apart along one axis
/// (touching, not overlapping) and their projections onto the other axis share
/// at least one cell. Corner contact does not count.
pub fn adjacency_direction(a: &Footprint, b: &Footprint) -> Option<Direction> {
    let x_overlap = span_overlap(a.left(), a.right(), b.left(), b.right());
    let y_overlap = span_overlap(a.bottom(), a.top(), b.bottom(), b.top());

    if y_overlap > 0 {
        if a.right() + 1 == b.left() {
            return Some(Direction::East);
        }
        if b.right() + 1 == a.left() {
            return Some(Direction::West);
        }
    }
    if x_overlap > 0 {
        if a.top() + 1 == b.bottom() {
            return Some(Direction::North);
        }
        if b.top() + 1 == a.bottom() {
            return Some(Direction::South);
        }
    }
    None
}

/// Check whether two footprints share a wall segment at least one cell long
pub fn are_adjacent(a: &Footprint, b: &Footprint) -> bool {
    adjacency_direction(a, b).is_some()
}

/// Cell pairs `(cell of a, cell of b)` straddling the shared border,
/// ordered by increasing coordinate along the border. Empty if not adjacent.
pub fn shared_border(a: &Footprint, b: &Footprint) -> Vec<(GridPos, GridPos)> {
    let Some(direction) = adjacency_direction(a, b) else {
        return Vec::new();
    };
    a.border_cells(direction)
        .into_iter()
        .map(|cell| (cell, cell.step(direction)))
        .filter(|(_, across)| b.contains(*across))
        .collect()
}
