use super::*;
use alloc::vec::Vec;
use euclid::{point3, vec3};
use hashbrown::HashSet;
use pretty_assertions::assert_eq;
use rand::{Rng as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256Plus;

/// A player-sized box, shrunk slightly as it is when checking block contents,
/// with its lower corner at `corner`.
fn player_box_at(corner: FreePoint) -> Aab {
    Aab::new(0.00001, 0.59999, 0.00001, 1.79999, 0.00001, 0.59999)
        .translate(corner.to_vector())
}

fn sorted(cells: &[Cube]) -> Vec<[i32; 3]> {
    let mut v: Vec<[i32; 3]> = cells.iter().map(|&c| c.into()).collect();
    v.sort_unstable();
    v
}

#[test]
fn short_move_reports_destination_only() {
    let mut t = Traversal::new();
    let sweep = Aab::new(0.2, 0.8, 0.0, 1.8, 0.2, 0.8);
    let cells = t.traverse(point3(0.5, 0.0, 0.5), point3(0.5, 0.0, 0.9), sweep);
    assert_eq!(cells, [Cube::new(0, 0, 0), Cube::new(0, 1, 0)]);
}

#[test]
fn unit_move_includes_both_ends() {
    let mut t = Traversal::new();
    let forward = sorted(t.traverse(
        point3(0.0, 0.0, 0.0),
        point3(1.0, 0.0, 0.0),
        player_box_at(point3(1.0, 0.0, 0.0)),
    ));
    assert_eq!(forward, vec![[0, 0, 0], [0, 1, 0], [1, 0, 0], [1, 1, 0]]);

    let backward = sorted(t.traverse(
        point3(1.0, 0.0, 0.0),
        point3(0.0, 0.0, 0.0),
        player_box_at(point3(0.0, 0.0, 0.0)),
    ));
    assert_eq!(backward, forward);
}

#[test]
fn crossed_blocks_come_first() {
    let mut t = Traversal::new();
    let cells = t.traverse(
        point3(0.0, 0.0, 0.0),
        point3(1.0, 0.0, 0.0),
        player_box_at(point3(1.0, 0.0, 0.0)),
    );
    assert_eq!(
        cells,
        [
            Cube::new(1, 0, 0),
            Cube::new(1, 1, 0),
            Cube::new(0, 0, 0),
            Cube::new(0, 1, 0),
        ]
    );
}

#[test]
fn long_move_stops_walking() {
    let mut t = Traversal::new();
    let sweep = Aab::new(40.0, 40.5, 0.5, 1.0, 0.0, 0.5);
    let cells = t.traverse(point3(0.0, 0.5, 0.0), point3(40.0, 0.5, 0.0), sweep);

    let xs: HashSet<i32> = cells.iter().map(|c| c.x).collect();
    for x in 0..=17 {
        assert!(xs.contains(&x), "missing x = {x}");
    }
    for x in 18..40 {
        assert!(!xs.contains(&x), "walk should have stopped before x = {x}");
    }
    assert!(xs.contains(&40));
}

#[test]
fn diagonal_move_covers_path_columns() {
    let mut t = Traversal::new();
    let cells = t.traverse(
        point3(0.2, 0.0, 0.2),
        point3(1.4, 0.0, 1.4),
        player_box_at(point3(1.4, 0.0, 1.4)),
    );
    let columns: HashSet<(i32, i32)> = cells.iter().map(|c| (c.x, c.z)).collect();
    // Ties between axes step along Z first.
    for column in [(0, 0), (0, 1), (1, 1)] {
        assert!(columns.contains(&column), "missing column {column:?}");
    }
}

#[test]
fn reuse_gives_same_result() {
    let mut t = Traversal::new();
    let a: Vec<Cube> = t
        .traverse(point3(0.0, 3.0, 0.0), point3(2.5, 1.0, -1.0), player_box_at(point3(2.5, 1.0, -1.0)))
        .to_vec();
    t.traverse(point3(9.0, 9.0, 9.0), point3(9.1, 9.0, 9.0), player_box_at(point3(9.1, 9.0, 9.0)));
    let b = t.traverse(
        point3(0.0, 3.0, 0.0),
        point3(2.5, 1.0, -1.0),
        player_box_at(point3(2.5, 1.0, -1.0)),
    );
    assert_eq!(a, b);
}

#[test]
fn random_moves_are_deduplicated_and_cover_endpoints() {
    let mut rng = Xoshiro256Plus::seed_from_u64(0x5eed);
    let mut t = Traversal::new();
    for _ in 0..500 {
        let from: FreePoint = point3(
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
        );
        let displacement: FreeVector = vec3(
            rng.random_range(-3.0..3.0),
            rng.random_range(-3.0..3.0),
            rng.random_range(-3.0..3.0),
        );
        let to = from + displacement;
        let sweep = player_box_at(to);
        let cells = t.traverse(from, to, sweep);

        let unique: HashSet<Cube> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len(), "duplicates for {from:?} + {displacement:?}");
        for cube in sweep.touched_cubes().cubes() {
            assert!(unique.contains(&cube), "destination {cube:?} missing");
        }
        if displacement.square_length() >= 1.0 {
            for cube in sweep.translate(-displacement).touched_cubes().cubes() {
                assert!(unique.contains(&cube), "start {cube:?} missing");
            }
        }
    }
}

#[test]
fn axis_steps_take_the_longer_horizontal_axis_first() {
    let mut t = Traversal::new();
    let cells = t.traverse_by_axis(point3(0.0, 0.0, 0.0), point3(2.0, 0.0, 1.0), player_box_at);
    assert_eq!(&cells[..2], [Cube::new(1, 0, 0), Cube::new(1, 1, 0)]);
    assert_eq!(
        sorted(cells),
        vec![
            [0, 0, 0],
            [0, 1, 0],
            [1, 0, 0],
            [1, 1, 0],
            [2, 0, 0],
            [2, 0, 1],
            [2, 1, 0],
            [2, 1, 1],
        ]
    );
}

#[test]
fn axis_steps_without_movement() {
    let mut t = Traversal::new();
    let here = point3(0.5, 0.0, 0.5);
    let by_axis = t.traverse_by_axis(here, here, player_box_at).to_vec();
    assert_eq!(by_axis, t.traverse(here, here, player_box_at(here)));
}

#[test]
fn clip_enters_through_near_face() {
    let hit = clip_segment(Cube::new(1, 0, 0).aab(), point3(0.5, 0.5, 0.5), point3(1.5, 0.5, 0.5));
    assert_eq!(hit, Some(point3(1.0, 0.5, 0.5)));

    // Already inside: no entry point ahead.
    assert_eq!(
        clip_segment(Cube::new(0, 0, 0).aab(), point3(0.5, 0.5, 0.5), point3(1.5, 0.5, 0.5)),
        None
    );

    // Passes beside the cell.
    assert_eq!(
        clip_segment(Cube::new(1, 0, 0).aab(), point3(0.5, 1.5, 0.5), point3(1.5, 1.5, 0.5)),
        None
    );
}
