use std::collections::HashSet;

use chunk_life::chunklife::{CHUNK_SIZE, CellState, Chunk, GridKey};
use chunk_life::{Coordinate, World};

fn c(x: i64, y: i64) -> Coordinate {
    Coordinate::new(x, y)
}

#[test]
fn neighbor_count_tracks_influence_ring_only() {
    let mut world = World::new();
    world.get_chunk_at(c(0, 0), true).expect("forced chunk");

    world.activate(c(4, 4));
    let cell = world.cell_at(c(5, 5)).expect("ring placeholder at (5, 5)");
    assert_eq!(cell.neighbor_count(), 1);
    assert!(cell.is_isolated());

    world.activate(c(4, 5));
    world.activate(c(3, 3));
    let cell = world.cell_at(c(5, 5)).expect("ring placeholder at (5, 5)");
    assert_eq!(cell.neighbor_count(), 2);
    assert!(!cell.is_isolated());
    assert!(!cell.is_overpopulated());

    let ring: HashSet<Coordinate> = c(5, 5).influence_area().into_iter().collect();
    let expected: HashSet<Coordinate> = [
        (4, 6),
        (5, 6),
        (6, 6),
        (4, 5),
        (6, 5),
        (4, 4),
        (5, 4),
        (6, 4),
    ]
    .map(Coordinate::from)
    .into_iter()
    .collect();
    assert_eq!(ring, expected);
}

#[test]
fn overpopulation_threshold_is_four() {
    let mut world = World::new();
    world.activate_all([c(0, 1), c(1, 1), c(-1, 1)]);
    let center = world.cell_at(c(0, 0)).expect("placeholder");
    assert_eq!(center.neighbor_count(), 3);
    assert!(!center.is_overpopulated());

    world.activate(c(1, 0));
    let center = world.cell_at(c(0, 0)).expect("placeholder");
    assert_eq!(center.neighbor_count(), 4);
    assert!(center.is_overpopulated());
}

#[test]
fn chunk_activation_delegates_foreign_coordinates() {
    let mut world = World::new();
    let home = {
        let mut chunk = world.get_chunk_at(c(0, 0), true).expect("forced chunk");
        chunk.activate(c(50, -25), true);
        chunk.idx()
    };

    let home = world.chunk(home).expect("home chunk");
    assert_eq!(home.origin(), c(0, 0));
    assert!(home.chunk().get(c(50, -25)).is_none());
    // Lookups through a chunk view are total and resolve via the world.
    assert!(home.has_cell_at(c(50, -25)));
    assert!(home.cell_at(c(50, -25)).is_some_and(|cell| cell.is_alive()));
    assert!(!home.has_cell_at(c(500, 500)));

    let owner = world.chunk_at(c(50, -25)).expect("owner chunk created");
    assert_eq!(owner.origin(), c(48, -32));
    assert_eq!(owner.key(), GridKey::new(3, -2));
}

#[test]
fn coordinate_chunk_math_uses_floor_division() {
    let coordinate = c(50, -25);
    assert_eq!(coordinate.relative(), (2, 7));
    assert_eq!(coordinate.chunk(), (3, -2));
    assert_eq!(coordinate.chunk_origin(), c(48, -32));
    assert_eq!(CHUNK_SIZE, 16);

    assert_eq!(c(-1, -16).chunk_origin(), c(-16, -16));
    assert_eq!(c(-17, 15).chunk_origin(), c(-32, 0));
    assert!(c(-1, -1).is_in_same_chunk(c(-16, -16)));
    assert!(!c(-1, 0).is_in_same_chunk(c(0, 0)));
}

#[test]
fn toggled_off_cell_is_garbage_collected_within_one_update() {
    let mut world = World::new();
    world.toggle(c(100, -100));
    assert!(world.is_alive(c(100, -100)));
    world.toggle(c(100, -100));
    assert_eq!(world.population(), 0);
    assert!(!world.is_empty());

    world.update();
    assert!(world.is_empty());
    assert!(!world.has_chunk_at(c(100, -100)));
}

#[test]
fn toggle_twice_matches_activate_then_toggle() {
    for coordinate in [c(0, 0), c(-17, 33), c(15, 15), c(-1, -1)] {
        let mut twice = World::new();
        twice.toggle(coordinate);
        twice.toggle(coordinate);

        let mut paired = World::new();
        paired.activate(coordinate);
        paired.toggle(coordinate);

        assert!(!twice.is_alive(coordinate));
        assert_eq!(twice.live_cells(), paired.live_cells());
        assert_eq!(twice.cell_count(), paired.cell_count());
    }
}

#[test]
fn toggle_promotes_placeholder_to_living_cell() {
    let mut world = World::new();
    world.activate(c(0, 0));
    let placeholder = c(1, 1);
    assert_eq!(
        world.cell_at(placeholder).map(|cell| cell.state()),
        Some(CellState::Empty)
    );

    world.toggle(placeholder);
    assert!(world.is_alive(placeholder));
    assert_eq!(world.population(), 2);
    for n in placeholder.influence_area() {
        assert!(world.has_cell_at(n), "ring hole at {n}");
    }
}

#[test]
fn single_chunk_passes_match_world_update() {
    // Vertical blinker centered in one chunk, far from any edge.
    let seed = [c(8, 7), c(8, 8), c(8, 9)];
    let mut by_chunk = World::new();
    by_chunk.activate_all(seed);
    let mut by_world = World::new();
    by_world.activate_all(seed);

    let idx = by_chunk.chunk_at(c(8, 8)).expect("chunk").idx();
    let mut chunk = by_chunk.chunk_mut(idx).expect("chunk");
    chunk.update_next_state();
    assert_eq!(
        chunk.cell_at(c(7, 8)).map(|cell| cell.next_state()),
        Some(CellState::Alive)
    );
    chunk.update_state();
    by_world.update();

    assert_eq!(by_chunk.live_cells(), by_world.live_cells());
    assert_eq!(by_chunk.live_cells(), vec![c(7, 8), c(8, 8), c(9, 8)]);
}

#[test]
fn chunk_register_and_remove_are_plain_map_edits() {
    let mut world = World::new();
    let idx = world.register(Chunk::new(c(33, 2)));
    assert_eq!(world.chunk_count(), 1);
    assert!(world.has_chunk_at(c(47, 15)));

    let seeded = {
        let mut chunk = world.chunk_mut(idx).expect("registered");
        let cell = chunk_life::chunklife::Cell::new(idx, c(40, 4));
        chunk.register(&cell);
        assert!(chunk.has_cell_at(c(40, 4)));
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk.view().map(|view| view.origin()), Some(c(32, 0)));
        chunk.remove(c(40, 4)).expect("cell removed")
    };
    assert_eq!(seeded.coordinate(), c(40, 4));
    assert_eq!(seeded.state(), CellState::Empty);

    let removed = world.remove(idx).expect("chunk removed");
    assert!(removed.is_empty());
    assert!(world.is_empty());
}

#[test]
fn clear_drops_everything() {
    let mut world = World::new();
    world.activate_all([c(0, 0), c(-100, 3), c(64, 64)]);
    world.clear();
    assert!(world.is_empty());
    assert_eq!(world.population(), 0);
    assert!(world.chunk_at(c(0, 0)).is_none());
}

#[test]
fn no_empty_chunk_survives_an_update() {
    let mut world = World::new();
    world.activate_all((0..40).map(|i| c(i * 7 - 140, (i * 13) % 50 - 25)));
    for _ in 0..10 {
        world.update();
        for chunk in world.chunks() {
            assert!(!chunk.is_empty(), "empty chunk at {}", chunk.origin());
            assert_eq!(chunk.key(), chunk.origin().chunk_key());
        }
    }
}
