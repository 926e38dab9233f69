//! Seeded body simulation used to exercise the resolvers end to end.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use glam::Vec2;
use gridbound_core::{map::MapSource, AnimationSource, SimRng, TileFlags, TileQuery};
use gridbound_system_movement::move_box;
use gridbound_world::{query, Collision};
use log::{debug, info};
use serde::Serialize;

/// Placement attempts per body before the body is dropped.
const PLACEMENT_ATTEMPTS: u32 = 64;

/// Parameters of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimulationConfig {
    pub(crate) seed: u64,
    pub(crate) bodies: u32,
    pub(crate) ticks: u32,
    pub(crate) gravity: f32,
    pub(crate) elasticity: f32,
    pub(crate) time_step: f64,
    pub(crate) body_size: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            bodies: 8,
            ticks: 300,
            gravity: 0.5,
            elasticity: 0.5,
            time_step: 0.02,
            body_size: 28.0,
        }
    }
}

/// Final state of one simulated body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct BodyReport {
    pub(crate) pos: [f32; 2],
    pub(crate) vel: [f32; 2],
    /// Tick on which the body touched a death tile, if it did.
    pub(crate) died_at: Option<u32>,
}

/// Outcome of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct SimulationReport {
    pub(crate) bodies: Vec<BodyReport>,
    pub(crate) fingerprint: u64,
}

#[derive(Clone, Copy, Debug)]
struct Body {
    pos: Vec2,
    vel: Vec2,
    died_at: Option<u32>,
}

/// Scatters bodies over free space and advances them under gravity.
///
/// The animation clock advances by one time step before every tick. Bodies
/// that touch a death tile stop moving.
pub(crate) fn run<M, A>(
    collision: &mut Collision<'_, M, A>,
    config: &SimulationConfig,
) -> SimulationReport
where
    M: MapSource + ?Sized,
    A: AnimationSource + ?Sized,
{
    let mut rng = SimRng::seeded(config.seed);
    let size = Vec2::splat(config.body_size);
    let mut bodies = scatter(&*collision, &mut rng, config, size);
    info!(
        "simulating {} bodies for {} ticks (seed {})",
        bodies.len(),
        config.ticks,
        config.seed
    );

    let mut time = query::time(&*collision);
    for tick in 0..config.ticks {
        time += config.time_step;
        collision.set_time(time);

        for body in bodies.iter_mut().filter(|body| body.died_at.is_none()) {
            body.vel.y += config.gravity;
            let moved = move_box(&*collision, body.pos, body.vel, size, config.elasticity);
            body.pos = moved.pos;
            body.vel = moved.vel;

            if touches_death(&*collision, body.pos, size) {
                debug!("body died at tick {tick} at {:?}", body.pos);
                body.died_at = Some(tick);
            }
        }
    }

    let bodies: Vec<BodyReport> = bodies
        .into_iter()
        .map(|body| BodyReport {
            pos: body.pos.to_array(),
            vel: body.vel.to_array(),
            died_at: body.died_at,
        })
        .collect();
    let fingerprint = fingerprint(&bodies);
    SimulationReport {
        bodies,
        fingerprint,
    }
}

fn scatter<M, A>(
    collision: &Collision<'_, M, A>,
    rng: &mut SimRng,
    config: &SimulationConfig,
    size: Vec2,
) -> Vec<Body>
where
    M: ?Sized,
    A: ?Sized,
{
    let extent = query::world_size(collision);
    let max_x = (extent.x as i32 - 1).max(0);
    let max_y = (extent.y as i32 - 1).max(0);

    let mut bodies = Vec::new();
    for index in 0..config.bodies {
        let spot = (0..PLACEMENT_ATTEMPTS)
            .map(|_| {
                Vec2::new(
                    rng.random_int(0, max_x) as f32,
                    rng.random_int(0, max_y) as f32,
                )
            })
            .find(|&pos| {
                !collision.is_box_blocked(pos, size) && !touches_death(collision, pos, size)
            });
        let Some(pos) = spot else {
            debug!("no free spot for body {index}");
            continue;
        };

        let vel = Vec2::new(rng.random_float() * 8.0 - 4.0, rng.random_float() * -4.0);
        bodies.push(Body {
            pos,
            vel,
            died_at: None,
        });
    }
    bodies
}

fn touches_death<Q>(grid: &Q, center: Vec2, size: Vec2) -> bool
where
    Q: TileQuery + ?Sized,
{
    let half = size * 0.5;
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(-half.x, half.y),
        Vec2::new(half.x, half.y),
    ]
    .into_iter()
    .any(|corner| grid.flags_at(center + corner).contains(TileFlags::DEATH))
}

fn fingerprint(bodies: &[BodyReport]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for body in bodies {
        body.pos.map(f32::to_bits).hash(&mut hasher);
        body.vel.map(f32::to_bits).hash(&mut hasher);
        body.died_at.hash(&mut hasher);
    }
    hasher.finish()
}
