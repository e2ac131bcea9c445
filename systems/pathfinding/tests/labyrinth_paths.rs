use std::collections::HashSet;

use labyrinth_core::{CellCoord, CostTable, GenerationConfig, Tile};
use labyrinth_system_generation::generate;
use labyrinth_system_pathfinding::{PathOutcome, Pathfinder};
use labyrinth_world::query;

fn assert_valid_path(start: CellCoord, goal: CellCoord, path: &[CellCoord]) {
    assert_eq!(path.last(), Some(&goal), "path must end at the goal");
    assert!(!path.contains(&start), "path must not revisit the start");

    let mut previous = start;
    let mut seen = HashSet::new();
    for &cell in path {
        assert_eq!(
            previous.manhattan_distance(cell),
            1,
            "{previous:?} -> {cell:?} is not a unit step"
        );
        assert!(seen.insert(cell), "{cell:?} repeats within the path");
        previous = cell;
    }
}

#[test]
fn paths_through_generated_labyrinths_are_unit_steps_without_repeats() {
    let costs = CostTable::default();
    let mut pathfinder = Pathfinder::new();

    for seed in [2_u64, 19, 404] {
        let config = GenerationConfig {
            seed,
            ..GenerationConfig::default()
        };
        let generated = generate(&config).expect("configuration is valid");
        let view = query::labyrinth_view(&generated.world).expect("generation completed");
        let rooms = query::rooms(&generated.world);
        let mut found = 0;

        for pair in rooms.windows(2) {
            let (start, goal) = (pair[0].center(), pair[1].center());
            if !view.is_walkable(start) || !view.is_walkable(goal) {
                continue;
            }
            let connected = query::reachability(&generated.world, start)
                .is_some_and(|field| field.is_reachable(goal));
            let outcome = pathfinder
                .find_path_in(&view, start, goal, &costs)
                .expect("room centers are walkable");
            match outcome {
                PathOutcome::Found(path) => {
                    assert!(connected, "seed {seed}: found a route between separated cells");
                    assert_valid_path(start, goal, &path);
                    assert!(path.iter().all(|cell| view.is_walkable(*cell)));
                    found += 1;
                }
                PathOutcome::NoPath => {
                    assert!(!connected, "seed {seed}: no path from {start:?} to {goal:?}");
                }
            }
        }
        assert!(found > 0, "seed {seed}: no room pair was routed");
    }
}

#[test]
fn cutting_the_only_corridor_separates_two_rooms() {
    let config = GenerationConfig {
        max_depth: 1,
        extra_corridor_chance: 0.0,
        seed: 77,
        ..GenerationConfig::default()
    };
    let generated = generate(&config).expect("configuration is valid");
    assert_eq!(generated.report.fallback_rooms, 0);

    let view = query::labyrinth_view(&generated.world).expect("generation completed");
    let rooms = query::rooms(&generated.world);
    assert_eq!(rooms.len(), 2);
    let (start, goal) = (rooms[0].center(), rooms[1].center());
    let costs = CostTable::default();
    let tile_of = |cell: CellCoord| view.tile_kind(cell);
    let mut pathfinder = Pathfinder::new();

    let intact = pathfinder
        .find_path(view.walkable(), tile_of, start, goal, &costs)
        .expect("room centers are walkable");
    assert!(matches!(intact, PathOutcome::Found(ref path) if !path.is_empty()));

    let corridor: Vec<CellCoord> = view
        .walkable()
        .iter()
        .filter(|cell| view.tile(*cell) == Some(Tile::Corridor))
        .collect();
    assert!(!corridor.is_empty(), "rooms are separated by at least one corridor cell");

    for cell in corridor {
        let mut walkable = view.walkable().clone();
        assert!(walkable.remove(cell));
        let outcome = pathfinder
            .find_path(&walkable, tile_of, start, goal, &costs)
            .expect("room centers stay walkable");
        assert_eq!(outcome, PathOutcome::NoPath, "removing {cell:?} left a route");
    }
}
