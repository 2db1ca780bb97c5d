use mz_cli::{render_ascii, summary};
use mz_core::{ContainerId, MazeConfig, MazeRng, generate_maze};

#[test]
fn test_map_has_one_entry_and_boss_marker() {
    for seed in 0..5 {
        let layout =
            generate_maze(&MazeConfig::default(), ContainerId(0), &mut MazeRng::new(seed)).unwrap();
        let map = render_ascii(&layout);
        assert_eq!(map.matches('E').count(), 1, "seed {seed}\n{map}");
        let boss = layout.graph.node(layout.graph.boss()).unwrap();
        // A boss footprint of w x h cells covers (2w-1) x (2h-1) characters
        let size = boss.footprint.size;
        let expected = ((2 * size.w - 1) * (2 * size.h - 1)) as usize;
        assert_eq!(map.matches('B').count(), expected, "seed {seed}\n{map}");
    }
}

#[test]
fn test_map_shows_every_door() {
    let layout =
        generate_maze(&MazeConfig::for_depth(5), ContainerId(0), &mut MazeRng::new(77)).unwrap();
    let map = render_ascii(&layout);
    let doors = map.chars().filter(|c| matches!(c, '-' | '|' | '~' | ':')).count();
    assert_eq!(doors, layout.graph.connections().len());
    let loops = map.chars().filter(|c| matches!(c, '~' | ':')).count();
    assert_eq!(loops, layout.graph.loop_count());
}

#[test]
fn test_summary_reports_counts() {
    let layout =
        generate_maze(&MazeConfig::default(), ContainerId(0), &mut MazeRng::new(3)).unwrap();
    let text = summary(&layout);
    assert!(text.starts_with("seed 3"));
    assert!(text.contains(&format!("rooms {}", layout.graph.len())));
    assert!(text.contains("categories: Regular"));
}
