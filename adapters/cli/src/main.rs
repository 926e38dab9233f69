#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that probes, traces and simulates against a gridbound map.

mod document;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use gridbound_core::{map::MapSource, round_to_int, AnimationSource, TileQuery};
use gridbound_system_line_of_sight::intersect_line;
use gridbound_world::{query, Collision};
use log::warn;

use crate::{
    document::MapDocument,
    simulation::{SimulationConfig, SimulationReport},
};

/// Collision queries against a JSON map document.
#[derive(Debug, Parser)]
#[command(name = "gridbound", version, about)]
struct Cli {
    /// Path to the JSON map document.
    #[arg(long, global = true, default_value = "adapters/cli/maps/arena.json")]
    map: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the tile flags and zone values at a world position.
    Probe {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        /// Zone to evaluate; may be repeated.
        #[arg(long = "zone")]
        zones: Vec<String>,
        /// Animation time in seconds used for animated zones.
        #[arg(long, default_value_t = 0.0)]
        time: f64,
    },
    /// Traces a line of sight between two world positions.
    Trace {
        #[arg(allow_negative_numbers = true)]
        x0: f32,
        #[arg(allow_negative_numbers = true)]
        y0: f32,
        #[arg(allow_negative_numbers = true)]
        x1: f32,
        #[arg(allow_negative_numbers = true)]
        y1: f32,
    },
    /// Drops seeded boxes into the map and reports where they come to rest.
    Simulate {
        #[arg(long, default_value_t = SimulationConfig::default().seed)]
        seed: u64,
        #[arg(long, default_value_t = SimulationConfig::default().bodies)]
        bodies: u32,
        #[arg(long, default_value_t = SimulationConfig::default().ticks)]
        ticks: u32,
        #[arg(long, default_value_t = SimulationConfig::default().gravity)]
        gravity: f32,
        #[arg(long, default_value_t = SimulationConfig::default().elasticity)]
        elasticity: f32,
        /// Seconds of animation time per tick.
        #[arg(long, default_value_t = SimulationConfig::default().time_step)]
        time_step: f64,
        /// Edge length of every body in world units.
        #[arg(long, default_value_t = SimulationConfig::default().body_size)]
        body_size: f32,
        /// Prints the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the gridbound command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let document = MapDocument::load(&cli.map)?;
    let map = document
        .to_map()
        .with_context(|| format!("invalid map document {}", cli.map.display()))?;
    let animation = document.animation();
    let mut collision =
        Collision::load(&map, &animation).context("failed to build the collision world")?;

    match cli.command {
        Command::Probe { x, y, zones, time } => {
            collision.set_time(time);
            probe(&mut collision, Vec2::new(x, y), &zones);
        }
        Command::Trace { x0, y0, x1, y1 } => {
            let hit = intersect_line(&collision, Vec2::new(x0, y0), Vec2::new(x1, y1));
            if hit.is_blocked() {
                println!(
                    "blocked by {:?} at ({}, {}); last free point ({}, {})",
                    hit.flags,
                    hit.collision.x,
                    hit.collision.y,
                    hit.before_collision.x,
                    hit.before_collision.y
                );
            } else {
                println!("clear to ({}, {})", hit.collision.x, hit.collision.y);
            }
        }
        Command::Simulate {
            seed,
            bodies,
            ticks,
            gravity,
            elasticity,
            time_step,
            body_size,
            json,
        } => {
            let config = SimulationConfig {
                seed,
                bodies,
                ticks,
                gravity,
                elasticity,
                time_step,
                body_size,
            };
            let report = simulation::run(&mut collision, &config);
            if json {
                let text =
                    serde_json::to_string_pretty(&report).context("failed to encode report")?;
                println!("{text}");
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn probe<M, A>(collision: &mut Collision<'_, M, A>, pos: Vec2, zones: &[String])
where
    M: MapSource + ?Sized,
    A: AnimationSource + ?Sized,
{
    let (x, y) = (round_to_int(pos.x), round_to_int(pos.y));
    println!(
        "tile at ({x}, {y}): {:?} (solid: {})",
        collision.flags_at(pos),
        query::is_tile_solid(&*collision, x, y)
    );

    for name in zones {
        match collision.zone_handle(name) {
            Some(handle) => println!(
                "zone {name}: {}",
                query::zone_value_at(&*collision, handle, pos)
            ),
            None => warn!("map has no zone group; cannot evaluate zone {name}"),
        }
    }
}

fn print_report(report: &SimulationReport) {
    for (index, body) in report.bodies.iter().enumerate() {
        let [x, y] = body.pos;
        let [vx, vy] = body.vel;
        match body.died_at {
            Some(tick) => println!("body {index}: died at tick {tick} at ({x:.2}, {y:.2})"),
            None => println!("body {index}: ({x:.2}, {y:.2}) moving ({vx:.2}, {vy:.2})"),
        }
    }
    println!("fingerprint: {:#018x}", report.fingerprint);
}
