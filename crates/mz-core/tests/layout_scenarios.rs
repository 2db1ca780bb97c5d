//! End-to-end layout scenarios

use std::cell::Cell;
use std::rc::Rc;

use mz_core::{
    ContainerId, Direction, GenerationListener, GridMetrics, GridPos, HoleRole, MazeConfig,
    MazeGenerator, MazeLayout, MazeRng, RoomCategory, RoomGeometry, RoomGraph, RoomId,
    RoomInstance, RoomInstantiator, RoomNode, TemplateInstantiator, are_adjacent, audit_layout,
    complexity_for_depth, generate_maze,
};

#[test]
fn test_regular_rooms_adjacency() {
    let a = RoomCategory::Regular.footprint_at(GridPos::new(0, 0));
    let b = RoomCategory::Regular.footprint_at(GridPos::new(1, 0));
    let c = RoomCategory::Regular.footprint_at(GridPos::new(2, 0));
    assert!(are_adjacent(&a, &b));
    assert!(!are_adjacent(&a, &c));
}

#[test]
fn test_wide_room_north_slots() {
    let mut rooms = vec![
        RoomInstance::new(RoomCategory::Wide, GridPos::new(3, 5)),
        RoomInstance::new(RoomCategory::Regular, GridPos::new(3, 6)),
        RoomInstance::new(RoomCategory::Regular, GridPos::new(4, 6)),
    ];
    rooms[0].is_entry = true;
    rooms[2].is_boss = true;
    let mut graph = RoomGraph::from_rooms(&rooms).unwrap();
    let west = graph.connect(RoomId(0), RoomId(1), false, false).unwrap();
    let east = graph.connect(RoomId(0), RoomId(2), false, false).unwrap();
    assert_eq!(graph.connections()[west].link.from_slot, 0);
    assert_eq!(graph.connections()[east].link.from_slot, 1);

    let wide = graph.node(RoomId(0)).unwrap();
    assert_eq!(wide.door(Direction::North, 0).unwrap().connected, Some(RoomId(1)));
    assert_eq!(wide.door(Direction::North, 1).unwrap().connected, Some(RoomId(2)));
    assert_eq!(
        graph.node(RoomId(1)).unwrap().door_to(RoomId(0)).unwrap().direction,
        Direction::South
    );
}

#[test]
fn test_deeper_levels_grow() {
    let shallow = MazeConfig::for_depth(1);
    let deep = MazeConfig::for_depth(8);
    assert!(complexity_for_depth(8) > complexity_for_depth(1));
    assert!(complexity_for_depth(100) <= 3.0);

    let mut small = 0;
    let mut large = 0;
    for seed in 0..8 {
        small += generate_maze(&shallow, ContainerId(0), &mut MazeRng::new(seed))
            .unwrap()
            .graph
            .len();
        large += generate_maze(&deep, ContainerId(0), &mut MazeRng::new(seed))
            .unwrap()
            .graph
            .len();
    }
    assert!(large > small);
}

#[test]
fn test_misplaced_openings_still_bind() {
    let config = MazeConfig::default();
    let mut generator = MazeGenerator::new();
    let mut inst = TemplateInstantiator::with_misplacement(1.5);
    for seed in 0..10 {
        let layout = generator
            .generate(&config, ContainerId(0), &mut inst, &mut MazeRng::new(seed))
            .unwrap();
        assert_eq!(layout.diagnostics.door_mismatches, 0, "seed {seed}");
        assert!(audit_layout(&layout).is_empty(), "seed {seed}");
    }
}

/// Instantiator that leaves out every east-facing opening
struct NoEastDoors(TemplateInstantiator);

impl RoomInstantiator for NoEastDoors {
    fn instantiate(
        &mut self,
        node: &RoomNode,
        parent: ContainerId,
        metrics: &GridMetrics,
    ) -> RoomGeometry {
        let mut geometry = self.0.instantiate(node, parent, metrics);
        let half_x = geometry.half_extents.x;
        geometry.holes.retain(|hole| hole.offset.x < half_x);
        geometry
    }
}

#[test]
fn test_missing_openings_are_walled_off() {
    let mut generator = MazeGenerator::new();
    let mut inst = NoEastDoors(TemplateInstantiator::new());
    let layout = generator
        .generate(&MazeConfig::default(), ContainerId(0), &mut inst, &mut MazeRng::new(5))
        .unwrap();
    let east_west = layout
        .graph
        .connections()
        .iter()
        .filter(|c| matches!(c.link.direction, Direction::East | Direction::West))
        .count();
    assert!(east_west > 0);
    assert_eq!(layout.diagnostics.door_mismatches, east_west);
    // The graph stays connected; only the openings are walled
    assert_eq!(layout.graph.unreachable_count(), 0);
    for geometry in &layout.geometries {
        for hole in &geometry.holes {
            assert_ne!(hole.role, HoleRole::Unbound);
        }
    }
}

struct CountingListener(Rc<Cell<usize>>);

impl GenerationListener for CountingListener {
    fn on_generation_complete(&mut self, _layout: &MazeLayout) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_listeners_fire_once_per_run() {
    let count = Rc::new(Cell::new(0));
    let mut generator = MazeGenerator::new();
    generator.subscribe(Box::new(CountingListener(Rc::clone(&count))));
    generator.subscribe(Box::new(CountingListener(Rc::clone(&count))));
    assert_eq!(generator.listener_count(), 2);
    let mut inst = TemplateInstantiator::new();
    for seed in 0..3 {
        generator
            .generate(&MazeConfig::default(), ContainerId(0), &mut inst, &mut MazeRng::new(seed))
            .unwrap();
    }
    assert_eq!(count.get(), 6);
}

#[test]
fn test_config_file_round_trip() {
    let mut config = MazeConfig::for_depth(3);
    config.boss_category = RoomCategory::Wide;
    let path = std::env::temp_dir().join(format!("mz-core-config-{}.json", std::process::id()));
    std::fs::write(&path, config.to_json().unwrap()).unwrap();
    let loaded = MazeConfig::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, config);

    let partial = MazeConfig::from_json(r#"{ "boss_category": "Tall" }"#).unwrap();
    assert_eq!(partial.boss_category, RoomCategory::Tall);
    assert_eq!(partial.room_count, MazeConfig::default().room_count);
    assert!(MazeConfig::load("/nonexistent/mz-config.json").is_err());
}

#[test]
fn test_boss_category_is_honoured() {
    let mut config = MazeConfig::default();
    config.boss_category = RoomCategory::Tall;
    let layout = generate_maze(&config, ContainerId(0), &mut MazeRng::new(21)).unwrap();
    let boss = layout.graph.node(layout.graph.boss()).unwrap();
    let expected = if layout.diagnostics.boss_downgraded {
        RoomCategory::Regular
    } else {
        RoomCategory::Tall
    };
    assert_eq!(boss.category, expected);
    assert_eq!(boss.template.as_deref(), Some("boss_arena"));
}
