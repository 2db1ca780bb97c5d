//! Per-run generation counters
//!
//! Every local recovery (a skipped step, a downgraded room, a rejected
//! connection) bumps a counter here instead of failing the run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationDiagnostics {
    /// Rooms actually placed
    pub placed_rooms: usize,
    /// Room count the run aimed for
    pub target_rooms: usize,
    pub skipped_main_path_steps: usize,
    pub skipped_branch_steps: usize,
    pub skipped_fillers: usize,
    /// Fillers placed as Regular after their category found no position
    pub filler_downgrades: usize,
    /// Boss placed as Regular
    pub boss_downgraded: bool,
    pub rejected_connections: usize,
    pub rejected_loops: usize,
    pub door_mismatches: usize,
    pub loop_target: usize,
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
}

impl GenerationDiagnostics {
    /// Any degradation happened during the run
    pub fn is_degraded(&self) -> bool {
        self.skipped_main_path_steps > 0
            || self.skipped_branch_steps > 0
            || self.skipped_fillers > 0
            || self.filler_downgrades > 0
            || self.boss_downgraded
            || self.rejected_connections > 0
            || self.door_mismatches > 0
            || self.used_fallback
    }

    pub fn mark_fallback(&mut self, reason: impl Into<String>) {
        self.used_fallback = true;
        self.fallback_reason = Some(reason.into());
    }
}
