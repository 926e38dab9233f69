use glam::Vec2;
use gridbound_core::TileQuery;
use gridbound_system_movement::{move_box, move_point, MAX_BOX_SPEED};
use gridbound_world::TileGrid;

/// 4 x 4 room whose bottom row is solid.
fn floor_room() -> TileGrid {
    let mut codes = [0_u8; 16];
    codes[12..].fill(1);
    TileGrid::from_codes(4, 4, &codes).expect("valid grid")
}

/// 4 x 4 room whose right column and bottom row are solid.
fn corner_room() -> TileGrid {
    let mut codes = [0_u8; 16];
    codes[12..].fill(1);
    for row in 0..4 {
        codes[row * 4 + 3] = 1;
    }
    TileGrid::from_codes(4, 4, &codes).expect("valid grid")
}

/// 3 x 3 room with a single solid tile in the middle.
fn pillar_room() -> TileGrid {
    let mut codes = [0_u8; 9];
    codes[4] = 1;
    TileGrid::from_codes(3, 3, &codes).expect("valid grid")
}

#[test]
fn point_bounces_off_the_floor() {
    let grid = floor_room();
    let moved = move_point(&grid, Vec2::new(48.0, 90.0), Vec2::new(0.0, 10.0), 0.5);

    assert_eq!(moved.pos, Vec2::new(48.0, 90.0));
    assert_eq!(moved.vel, Vec2::new(0.0, -5.0));
    assert_eq!(moved.bounces, 1);
}

#[test]
fn point_reflects_both_axes_on_a_diagonal_hit() {
    let grid = pillar_room();
    let moved = move_point(&grid, Vec2::new(28.0, 28.0), Vec2::new(8.0, 8.0), 1.0);

    assert_eq!(moved.pos, Vec2::new(28.0, 28.0));
    assert_eq!(moved.vel, Vec2::new(-8.0, -8.0));
    assert_eq!(moved.bounces, 0);
}

#[test]
fn point_counts_both_blocked_axes() {
    let grid = pillar_room();
    // Both isolated probes land in the pillar.
    let moved = move_point(&grid, Vec2::new(40.0, 40.0), Vec2::new(4.0, 4.0), 0.25);

    assert_eq!(moved.vel, Vec2::new(-1.0, -1.0));
    assert_eq!(moved.bounces, 2);
}

#[test]
fn falling_box_lands_and_rebounds() {
    let grid = floor_room();
    let size = Vec2::splat(28.0);
    let moved = move_box(&grid, Vec2::new(48.0, 60.0), Vec2::new(0.0, 30.0), size, 0.5);

    assert_eq!(moved.vel, Vec2::new(0.0, -15.0));
    assert_eq!(moved.pos.x, 48.0);
    assert!(moved.pos.y < 81.5, "box sank into the floor: {:?}", moved.pos);
    assert!(moved.pos.y > 60.0);
    assert!(!grid.is_box_blocked(moved.pos, size));
}

#[test]
fn fast_box_does_not_tunnel_through_thin_walls() {
    let mut codes = [0_u8; 15];
    for row in 0..3 {
        codes[row * 5 + 2] = 1;
    }
    let grid = TileGrid::from_codes(5, 3, &codes).expect("valid grid");
    let size = Vec2::splat(10.0);

    let moved = move_box(&grid, Vec2::new(40.0, 48.0), Vec2::new(100.0, 0.0), size, 0.0);

    assert!(moved.pos.x + 5.0 < 63.5, "box crossed the wall: {:?}", moved.pos);
    assert_eq!(moved.vel, Vec2::ZERO);
    assert_eq!(moved.pos.y, 48.0);
}

#[test]
fn box_blocked_only_diagonally_reverses_course() {
    let grid = pillar_room();
    let size = Vec2::splat(2.0);

    let moved = move_box(&grid, Vec2::new(28.0, 28.0), Vec2::new(8.0, 8.0), size, 1.0);

    assert_eq!(moved.vel, Vec2::new(-8.0, -8.0));
    assert_eq!(moved.pos.x, moved.pos.y);
    assert!(moved.pos.x < 28.0);
    assert!(!grid.is_box_blocked(moved.pos, size));
}

#[test]
fn box_driven_into_a_corner_reflects_both_axes() {
    let grid = corner_room();
    let size = Vec2::splat(20.0);

    let moved = move_box(&grid, Vec2::new(80.0, 80.0), Vec2::new(10.0, 10.0), size, 0.5);

    assert_eq!(moved.vel, Vec2::new(-5.0, -5.0));
    assert_eq!(moved.pos.x, moved.pos.y);
    assert!(moved.pos.x > 80.0 && moved.pos.x < 85.5, "{:?}", moved.pos);
    assert!(!grid.is_box_blocked(moved.pos, size));
}

#[test]
fn oversized_box_velocity_leaves_the_box_in_place() {
    let grid = floor_room();
    let pos = Vec2::new(48.0, 48.0);
    let size = Vec2::splat(8.0);

    for vel in [
        Vec2::new(5.0e9, 0.0),
        Vec2::new(0.0, MAX_BOX_SPEED * 2.0),
        Vec2::new(f32::INFINITY, f32::INFINITY),
    ] {
        let moved = move_box(&grid, pos, vel, size, 0.5);
        assert_eq!(moved.pos, pos);
        assert_eq!(moved.vel, vel);
    }
}
