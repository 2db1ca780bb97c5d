//! Top-level generation pipeline
//!
//! `MazeGenerator::generate` runs placement, graph construction, spanning
//! connectivity, loop injection, instantiation and door binding in order.
//! A structural failure in the topology stages is logged and replaced by a
//! minimal fallback layout; only configuration errors and a failing fallback
//! reach the caller.

use serde::Serialize;

use crate::config::MazeConfig;
use crate::connectivity::connect_rooms;
use crate::context::MazeGenerationContext;
use crate::diagnostics::GenerationDiagnostics;
use crate::doors::DoorManager;
use crate::error::GenerationError;
use crate::graph::{RoomGraph, RoomId};
use crate::loops::inject_loops;
use crate::placement::{Placement, fallback_placement, place_rooms};
use crate::rng::MazeRng;
use crate::scene::{ContainerId, GridMetrics, RoomGeometry, RoomInstantiator, TemplateInstantiator};

/// A finished level
#[derive(Debug, Clone, Serialize)]
pub struct MazeLayout {
    /// Seed of the RNG the run started from
    pub seed: u64,
    pub complexity: f32,
    pub grid_side: i32,
    pub graph: RoomGraph,
    /// One entry per room, in room id order
    pub geometries: Vec<RoomGeometry>,
    pub diagnostics: GenerationDiagnostics,
    /// Upper bound on loop edges for this run
    pub loop_target: usize,
}

impl MazeLayout {
    pub fn geometry(&self, room: RoomId) -> Option<&RoomGeometry> {
        self.geometries.iter().find(|g| g.room == room)
    }
}

/// Receives the finished layout once per successful run
pub trait GenerationListener {
    fn on_generation_complete(&mut self, layout: &MazeLayout);
}

/// Graph plus loop budget, before instantiation
struct Topology {
    graph: RoomGraph,
    loop_target: usize,
}

#[derive(Default)]
pub struct MazeGenerator {
    listeners: Vec<Box<dyn GenerationListener>>,
}

impl MazeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn GenerationListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Generate a complete layout under `parent`.
    pub fn generate(
        &mut self,
        config: &MazeConfig,
        parent: ContainerId,
        instantiator: &mut dyn RoomInstantiator,
        rng: &mut MazeRng,
    ) -> Result<MazeLayout, GenerationError> {
        let ctx = MazeGenerationContext::new(config, parent)?;
        log::info!(
            "generating layout: seed {}, complexity {:.2}, grid {}x{}",
            rng.seed(),
            ctx.complexity,
            ctx.grid_side,
            ctx.grid_side
        );

        let mut diag = GenerationDiagnostics::default();
        let topology = match build_topology(&ctx, rng, &mut diag) {
            Ok(topology) => topology,
            Err(err) => {
                log::error!("layout generation failed: {err}; falling back to a minimal layout");
                diag = GenerationDiagnostics::default();
                diag.mark_fallback(err.to_string());
                build_fallback(&ctx, rng, &mut diag)?
            }
        };
        Ok(self.finish(&ctx, topology, instantiator, rng.seed(), diag))
    }

    /// Generate the minimal fallback layout directly: entry, a straight main
    /// path and the boss, with no branches, fillers or loops.
    pub fn generate_fallback(
        &mut self,
        config: &MazeConfig,
        parent: ContainerId,
        instantiator: &mut dyn RoomInstantiator,
        rng: &mut MazeRng,
        reason: &str,
    ) -> Result<MazeLayout, GenerationError> {
        let ctx = MazeGenerationContext::new(config, parent)?;
        let mut diag = GenerationDiagnostics::default();
        diag.mark_fallback(reason);
        let topology = build_fallback(&ctx, rng, &mut diag)?;
        Ok(self.finish(&ctx, topology, instantiator, rng.seed(), diag))
    }

    /// Instantiate, bind doors and notify listeners
    fn finish(
        &mut self,
        ctx: &MazeGenerationContext<'_>,
        topology: Topology,
        instantiator: &mut dyn RoomInstantiator,
        seed: u64,
        mut diag: GenerationDiagnostics,
    ) -> MazeLayout {
        let Topology {
            mut graph,
            loop_target,
        } = topology;
        let metrics = GridMetrics::new(ctx.config.cell_size);
        let mut geometries: Vec<RoomGeometry> = graph
            .nodes()
            .iter()
            .map(|node| instantiator.instantiate(node, ctx.parent, &metrics))
            .collect();
        for geometry in &geometries {
            graph.set_visual(geometry.room, geometry.id);
        }
        DoorManager::new(ctx.config.door_tolerance).bind(&graph, &mut geometries, &mut diag);

        let layout = MazeLayout {
            seed,
            complexity: ctx.complexity,
            grid_side: ctx.grid_side,
            graph,
            geometries,
            diagnostics: diag,
            loop_target,
        };
        log::info!(
            "layout ready: {} rooms, {} connections ({} loops){}",
            layout.graph.len(),
            layout.graph.connections().len(),
            layout.graph.loop_count(),
            if layout.diagnostics.used_fallback {
                ", fallback"
            } else {
                ""
            }
        );
        for listener in &mut self.listeners {
            listener.on_generation_complete(&layout);
        }
        layout
    }
}

fn main_path_ids(placement: &Placement) -> Vec<RoomId> {
    placement.main_path.iter().copied().map(RoomId).collect()
}

fn build_topology(
    ctx: &MazeGenerationContext<'_>,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) -> Result<Topology, GenerationError> {
    let placement = place_rooms(ctx, rng, diag);
    let mut graph = RoomGraph::from_placement(&placement, ctx.config, rng)?;
    connect_rooms(&mut graph, &main_path_ids(&placement), rng, diag)?;
    let loops = inject_loops(&mut graph, ctx.loop_density, rng, diag);
    if !graph.is_fully_connected() {
        return Err(GenerationError::Disconnected {
            unreachable: graph.unreachable_count(),
        });
    }
    Ok(Topology {
        graph,
        loop_target: loops.target,
    })
}

fn build_fallback(
    ctx: &MazeGenerationContext<'_>,
    rng: &mut MazeRng,
    diag: &mut GenerationDiagnostics,
) -> Result<Topology, GenerationError> {
    let fail = |err: GenerationError| GenerationError::FallbackFailed(err.to_string());
    let placement = fallback_placement(ctx)?;
    diag.placed_rooms = placement.rooms.len();
    diag.target_rooms = placement.rooms.len();
    let mut graph = RoomGraph::from_placement(&placement, ctx.config, rng).map_err(fail)?;
    connect_rooms(&mut graph, &main_path_ids(&placement), rng, diag).map_err(fail)?;
    log::warn!("fallback layout built with {} rooms", graph.len());
    Ok(Topology {
        graph,
        loop_target: 0,
    })
}

/// Generate with the built-in [`TemplateInstantiator`] and no listeners.
pub fn generate_maze(
    config: &MazeConfig,
    parent: ContainerId,
    rng: &mut MazeRng,
) -> Result<MazeLayout, GenerationError> {
    MazeGenerator::new().generate(config, parent, &mut TemplateInstantiator::new(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit_layout;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<usize>>>);

    impl GenerationListener for Recorder {
        fn on_generation_complete(&mut self, layout: &MazeLayout) {
            self.0.borrow_mut().push(layout.graph.len());
        }
    }

    #[test]
    fn test_generate_default() {
        let mut rng = MazeRng::new(42);
        let layout = generate_maze(&MazeConfig::default(), ContainerId(1), &mut rng).unwrap();
        assert_eq!(layout.seed, 42);
        assert_eq!(layout.geometries.len(), layout.graph.len());
        assert!(layout.graph.len() >= 2);
        assert!(layout.graph.nodes().iter().all(|n| n.visual.is_some()));
        assert!(layout.geometries.iter().all(|g| g.parent == ContainerId(1)));
        assert!(audit_layout(&layout).is_empty());
    }

    #[test]
    fn test_listener_notified_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut generator = MazeGenerator::new();
        generator.subscribe(Box::new(Recorder(Rc::clone(&seen))));
        let mut rng = MazeRng::new(7);
        let layout = generator
            .generate(
                &MazeConfig::default(),
                ContainerId(0),
                &mut TemplateInstantiator::new(),
                &mut rng,
            )
            .unwrap();
        assert_eq!(*seen.borrow(), vec![layout.graph.len()]);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let mut config = MazeConfig::default();
        config.filler_categories.clear();
        let mut rng = MazeRng::new(1);
        assert!(matches!(
            generate_maze(&config, ContainerId(0), &mut rng),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn test_fallback_layout_is_valid() {
        let mut generator = MazeGenerator::new();
        let mut rng = MazeRng::new(3);
        let layout = generator
            .generate_fallback(
                &MazeConfig::default(),
                ContainerId(0),
                &mut TemplateInstantiator::new(),
                &mut rng,
                "forced",
            )
            .unwrap();
        assert!(layout.diagnostics.used_fallback);
        assert_eq!(layout.diagnostics.fallback_reason.as_deref(), Some("forced"));
        assert_eq!(layout.graph.loop_count(), 0);
        assert_eq!(layout.graph.main_path_count(), layout.graph.len() - 1);
        assert!(audit_layout(&layout).is_empty());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = MazeConfig::for_depth(4);
        let a = generate_maze(&config, ContainerId(0), &mut MazeRng::new(11)).unwrap();
        let b = generate_maze(&config, ContainerId(0), &mut MazeRng::new(11)).unwrap();
        assert_eq!(a.graph.connections(), b.graph.connections());
        assert_eq!(a.geometries, b.geometries);
    }
}
