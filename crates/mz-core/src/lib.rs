//! mz-core: grid-based dungeon layout generation
//!
//! Produces a connected level of rectangular rooms on a square grid:
//! a main path from an entry room to a boss room, side branches, filler
//! rooms, a spanning tree of door connections plus a few loops, and door
//! openings bound on instantiated geometry.
//!
//! The crate performs no I/O beyond optional config loading. Room geometry
//! is produced through the [`RoomInstantiator`] trait so an engine can plug in
//! its own prefab spawning.
//!
//! Conventions: `x` grows east, `y` grows north. Slot 0 of a two-slot side is
//! the half with the lower coordinate along that side.

pub mod adjacency;
pub mod audit;
pub mod category;
pub mod config;
pub mod connectivity;
pub mod context;
pub mod diagnostics;
pub mod door_index;
pub mod doors;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod loops;
pub mod placement;
pub mod scene;

mod rng;
mod tracker;

pub use adjacency::are_adjacent;
pub use audit::{Violation, audit_layout};
pub use category::{CategoryProfile, RoomCategory, RoomShape};
pub use config::{IntRange, MazeConfig, complexity_for_depth};
pub use context::MazeGenerationContext;
pub use diagnostics::GenerationDiagnostics;
pub use doors::{DoorBindingReport, DoorManager};
pub use error::{ConfigError, ConnectionError, GenerationError};
pub use generator::{GenerationListener, MazeGenerator, MazeLayout, generate_maze};
pub use geometry::{Direction, Footprint, GridPos, GridSize};
pub use graph::{DoorState, RoomConnection, RoomGraph, RoomId, RoomNode};
pub use placement::{Placement, RoomInstance};
pub use rng::MazeRng;
pub use scene::{
    ContainerId, DoorHole, GeometryId, GridMetrics, HoleFlags, HoleRole, RoomGeometry,
    RoomInstantiator, TemplateInstantiator, WorldVec,
};
pub use tracker::ConnectivityTracker;
