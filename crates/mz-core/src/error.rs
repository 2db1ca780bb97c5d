//! Error types for layout generation
//!
//! Local recoveries (skipped placements, rejected connections) are reported
//! through these errors and then counted in
//! [`GenerationDiagnostics`](crate::GenerationDiagnostics); only configuration
//! errors and a failed fallback reach the caller of the generator.

use thiserror::Error;

use crate::geometry::Direction;
use crate::graph::RoomId;

/// Invalid or unreadable configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("complexity multiplier must be positive and finite, got {0}")]
    InvalidComplexity(f32),

    #[error("range '{name}' is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: u32,
        max: u32,
    },

    #[error("range '{0}' must start at 1 or more")]
    EmptyRange(&'static str),

    #[error("grid size bounds are invalid: min {min}, max {max}")]
    InvalidGridBounds { min: i32, max: i32 },

    #[error("filler category list is empty")]
    EmptyFillerCategories,

    #[error("loop density band is invalid: min {min}, max {max}")]
    InvalidLoopDensity { min: f32, max: f32 },

    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f32),

    #[error("door tolerance must be non-negative, got {0}")]
    InvalidTolerance(f32),

    #[error("could not read config '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("could not parse config: {0}")]
    Parse(String),
}

/// Why a proposed bidirectional connection was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("room {0} cannot connect to itself")]
    SelfConnection(RoomId),

    #[error("rooms {from} and {to} are not grid-adjacent")]
    NotAdjacent { from: RoomId, to: RoomId },

    #[error("rooms {from} and {to} are already connected")]
    AlreadyConnected { from: RoomId, to: RoomId },

    #[error("direction mismatch between {from} and {to}: expected {expected}, found {found}")]
    DirectionMismatch {
        from: RoomId,
        to: RoomId,
        expected: Direction,
        found: Direction,
    },

    #[error("slot mismatch on room {room} side {direction}: expected {expected}, found {found}")]
    SlotMismatch {
        room: RoomId,
        direction: Direction,
        expected: u8,
        found: u8,
    },

    #[error("slot {index} on room {room} side {direction} is already claimed by room {owner}")]
    SlotTaken {
        room: RoomId,
        direction: Direction,
        index: u8,
        owner: RoomId,
    },
}

/// A failure that prevents a layout from being completed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("placement produced no rooms")]
    EmptyPlacement,

    #[error("no legal position for the boss room")]
    BossUnplaced,

    #[error("{unreachable} room(s) could not be connected to the entry")]
    Disconnected { unreachable: usize },

    #[error("fallback layout failed: {0}")]
    FallbackFailed(String),
}
