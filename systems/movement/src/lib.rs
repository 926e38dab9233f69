#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement resolvers that keep entities out of solid tiles.
//!
//! Both resolvers are pure functions over a [`TileQuery`]: they read the grid,
//! never mutate it, and return the resolved position and velocity by value so
//! the caller decides what to write back into its entities.

use glam::Vec2;
use gridbound_core::TileQuery;

/// Velocities at or below this magnitude leave a box where it is.
pub const MIN_BOX_SPEED: f32 = 0.00001;

/// Velocities above this magnitude, or with a non-finite component, leave a
/// box where it is. Every world unit of speed costs one sub-step.
pub const MAX_BOX_SPEED: f32 = 1.0e6;

/// Result of moving a point for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMove {
    /// Position after the move; unchanged when the destination was solid.
    pub pos: Vec2,
    /// Velocity after reflecting the blocked axes.
    pub vel: Vec2,
    /// Number of axes that bounced off a solid tile.
    pub bounces: u32,
}

/// Result of moving an axis-aligned box for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxMove {
    /// Centre of the box after all sub-steps.
    pub pos: Vec2,
    /// Velocity after every reflection applied during the sub-steps.
    pub vel: Vec2,
}

/// Moves a point by `vel` in a single step, bouncing off solid tiles.
///
/// If the destination is free the point moves and keeps its velocity.
/// Otherwise it stays put and each axis whose isolated probe is solid has its
/// velocity reflected and scaled by `elasticity`. A destination blocked only
/// diagonally reflects both axes without counting a bounce.
pub fn move_point<Q>(grid: &Q, pos: Vec2, vel: Vec2, elasticity: f32) -> PointMove
where
    Q: TileQuery + ?Sized,
{
    if !grid.is_solid_at(pos + vel) {
        return PointMove {
            pos: pos + vel,
            vel,
            bounces: 0,
        };
    }

    let mut resolved = vel;
    let mut bounces = 0;
    if grid.is_solid_at(Vec2::new(pos.x + vel.x, pos.y)) {
        resolved.x *= -elasticity;
        bounces += 1;
    }
    if grid.is_solid_at(Vec2::new(pos.x, pos.y + vel.y)) {
        resolved.y *= -elasticity;
        bounces += 1;
    }
    if bounces == 0 {
        resolved *= -elasticity;
    }

    PointMove {
        pos,
        vel: resolved,
        bounces,
    }
}

/// Moves a box of `size` centred on `pos` by `vel`, sub-stepping so that it
/// never tunnels through a tile.
///
/// The move is split into `trunc(|vel|) + 1` equal steps, so no step exceeds
/// one world unit. Whenever a step would overlap a solid tile, the blocked axes
/// keep their previous coordinate and have their velocity reflected and scaled
/// by `elasticity`; later steps continue with the reflected velocity.
///
/// Velocities outside `(MIN_BOX_SPEED, MAX_BOX_SPEED]` return the inputs
/// unchanged.
pub fn move_box<Q>(grid: &Q, pos: Vec2, vel: Vec2, size: Vec2, elasticity: f32) -> BoxMove
where
    Q: TileQuery + ?Sized,
{
    let speed = vel.length();
    if speed <= MIN_BOX_SPEED || !speed.is_finite() || speed > MAX_BOX_SPEED {
        return BoxMove { pos, vel };
    }

    let steps = speed as u32 + 1;
    let fraction = 1.0 / steps as f32;
    let mut pos = pos;
    let mut vel = vel;

    for _ in 0..steps {
        let mut next = pos + vel * fraction;
        if grid.is_box_blocked(next, size) {
            let mut hits = 0;
            if grid.is_box_blocked(Vec2::new(pos.x, next.y), size) {
                next.y = pos.y;
                vel.y *= -elasticity;
                hits += 1;
            }
            if grid.is_box_blocked(Vec2::new(next.x, pos.y), size) {
                next.x = pos.x;
                vel.x *= -elasticity;
                hits += 1;
            }
            if hits == 0 {
                next = pos;
                vel *= -elasticity;
            }
        }
        pos = next;
    }

    BoxMove { pos, vel }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbound_core::{TileFlags, TILE_SIZE};

    /// Everything at or below y = 64 is solid.
    struct Floor;

    impl TileQuery for Floor {
        fn tile_flags(&self, _x: i32, y: i32) -> TileFlags {
            if y >= 2 * TILE_SIZE {
                TileFlags::SOLID
            } else {
                TileFlags::empty()
            }
        }
    }

    #[test]
    fn free_point_moves_by_full_velocity() {
        let moved = move_point(&Floor, Vec2::new(10.0, 10.0), Vec2::new(3.0, 4.0), 0.5);
        assert_eq!(moved.pos, Vec2::new(13.0, 14.0));
        assert_eq!(moved.vel, Vec2::new(3.0, 4.0));
        assert_eq!(moved.bounces, 0);
    }

    #[test]
    fn imperceptible_box_velocity_is_ignored() {
        let pos = Vec2::new(10.0, 10.0);
        let vel = Vec2::new(0.000_001, 0.0);
        let moved = move_box(&Floor, pos, vel, Vec2::splat(8.0), 1.0);
        assert_eq!(moved, BoxMove { pos, vel });
    }

    #[test]
    fn non_finite_box_velocity_is_ignored() {
        let pos = Vec2::new(10.0, 10.0);
        for vel in [
            Vec2::new(f32::INFINITY, 0.0),
            Vec2::new(0.0, f32::NEG_INFINITY),
            Vec2::new(f32::NAN, 1.0),
        ] {
            let moved = move_box(&Floor, pos, vel, Vec2::splat(8.0), 1.0);
            assert_eq!(moved.pos, pos);
            assert_eq!(moved.vel.x.to_bits(), vel.x.to_bits());
            assert_eq!(moved.vel.y.to_bits(), vel.y.to_bits());
        }
    }

    #[test]
    fn box_resolver_works_through_trait_objects() {
        let grid: &dyn TileQuery = &Floor;
        let moved = move_box(
            grid,
            Vec2::new(10.0, 10.0),
            Vec2::new(2.0, 0.0),
            Vec2::splat(8.0),
            1.0,
        );
        assert!((moved.pos.x - 12.0).abs() < 1e-4);
    }
}
