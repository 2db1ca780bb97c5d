//! Text rendering of a layout
//!
//! Each grid cell maps to one character, with one character of wall between
//! neighbouring cells. North is at the top.
//!
//! Legend: `E` entry, `B` boss, `#` main path room, `o` other room, `.` empty
//! cell, `-`/`|` tree doors, `~`/`:` loop doors.

use std::fmt::Write;

use strum::IntoEnumIterator;

use mz_core::{Direction, GridPos, MazeLayout, RoomCategory, RoomNode};

const EMPTY: char = '.';
const WALL: char = ' ';

fn glyph(node: &RoomNode) -> char {
    if node.is_entry {
        'E'
    } else if node.is_boss {
        'B'
    } else if node.all_doors().any(|d| d.is_connected() && d.is_main_path) {
        '#'
    } else {
        'o'
    }
}

struct Canvas {
    side: i32,
    rows: Vec<Vec<char>>,
}

impl Canvas {
    fn new(side: i32) -> Self {
        let dim = (side * 2 + 1) as usize;
        let mut rows = vec![vec![WALL; dim]; dim];
        for y in 0..side {
            for x in 0..side {
                let (col, row) = Self::cell_at(side, GridPos::new(x, y));
                rows[row][col] = EMPTY;
            }
        }
        Self { side, rows }
    }

    /// Canvas (column, row) of a cell
    fn cell_at(side: i32, pos: GridPos) -> (usize, usize) {
        ((pos.x * 2 + 1) as usize, ((side - 1 - pos.y) * 2 + 1) as usize)
    }

    fn put(&mut self, col: usize, row: usize, ch: char) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = ch;
        }
    }

    fn into_string(self) -> String {
        let mut out = String::with_capacity(self.rows.len() * (self.rows.len() + 1));
        for row in self.rows {
            let line: String = row.into_iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Render the layout as an ASCII map
pub fn render_ascii(layout: &MazeLayout) -> String {
    let side = layout.grid_side;
    let mut canvas = Canvas::new(side);

    for node in layout.graph.nodes() {
        let fp = node.footprint;
        let (left, top) = Canvas::cell_at(side, GridPos::new(fp.left(), fp.top()));
        let (right, bottom) = Canvas::cell_at(side, GridPos::new(fp.right(), fp.bottom()));
        let ch = glyph(node);
        for row in top..=bottom {
            for col in left..=right {
                canvas.put(col, row, ch);
            }
        }
    }

    for conn in layout.graph.connections() {
        let link = &conn.link;
        let (col, row) = Canvas::cell_at(canvas.side, link.from_cell);
        let ch = match (link.direction, conn.is_loop) {
            (Direction::East | Direction::West, false) => '-',
            (Direction::East | Direction::West, true) => '~',
            (Direction::North | Direction::South, false) => '|',
            (Direction::North | Direction::South, true) => ':',
        };
        let (col, row) = match link.direction {
            Direction::North => (col, row - 1),
            Direction::South => (col, row + 1),
            Direction::East => (col + 1, row),
            Direction::West => (col - 1, row),
        };
        canvas.put(col, row, ch);
    }

    canvas.into_string()
}

/// Multi-line run summary
pub fn summary(layout: &MazeLayout) -> String {
    let graph = &layout.graph;
    let diag = &layout.diagnostics;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "seed {}  complexity {:.2}  grid {}x{}",
        layout.seed, layout.complexity, layout.grid_side, layout.grid_side
    );
    let _ = writeln!(
        out,
        "rooms {} (target {})  connections {}  main path {}  loops {}/{}",
        graph.len(),
        diag.target_rooms,
        graph.connections().len(),
        graph.main_path_count(),
        graph.loop_count(),
        layout.loop_target
    );
    let counts: Vec<String> = RoomCategory::iter()
        .map(|category| {
            let n = graph.nodes().iter().filter(|n| n.category == category).count();
            format!("{category} {n}")
        })
        .collect();
    let _ = writeln!(out, "categories: {}", counts.join(", "));
    if diag.used_fallback {
        let _ = writeln!(
            out,
            "fallback layout: {}",
            diag.fallback_reason.as_deref().unwrap_or("unknown")
        );
    }
    if diag.is_degraded() {
        let _ = writeln!(
            out,
            "degraded: path skips {}, branch skips {}, filler skips {}, filler downgrades {}, boss downgraded {}, rejected {}, door mismatches {}",
            diag.skipped_main_path_steps,
            diag.skipped_branch_steps,
            diag.skipped_fillers,
            diag.filler_downgrades,
            diag.boss_downgraded,
            diag.rejected_connections,
            diag.door_mismatches
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mz_core::{ContainerId, MazeConfig, MazeGenerator, MazeRng, TemplateInstantiator};

    fn fallback() -> MazeLayout {
        MazeGenerator::new()
            .generate_fallback(
                &MazeConfig::default(),
                ContainerId(0),
                &mut TemplateInstantiator::new(),
                &mut MazeRng::new(1),
                "test",
            )
            .unwrap()
    }

    #[test]
    fn test_render_fallback_row() {
        let layout = fallback();
        let map = render_ascii(&layout);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), (layout.grid_side * 2 + 1) as usize);
        // Row 4 of an 8x8 grid is canvas line 7; the Large boss spans lines 5..=7
        assert!(lines[7].starts_with(" E-#-#-#-BBB"));
        assert!(lines[5].contains("BBB"));
    }

    #[test]
    fn test_summary_mentions_fallback() {
        let text = summary(&fallback());
        assert!(text.contains("fallback layout: test"));
        assert!(text.contains("Large 1"));
    }
}
