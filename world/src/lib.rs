#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative collision state for gridbound.
//!
//! A [`Collision`] is built once from a decoded map. Loading classifies the
//! game layer into a [`TileGrid`] and fails with [`LoadError`] instead of
//! producing a partially initialised world. Afterwards the world is read-only
//! apart from zone allocation and the per-tick animation time, both of which
//! require exclusive access; every per-entity query goes through [`query`] or
//! the [`TileQuery`] implementation and never fails.

use std::fmt;

use gridbound_core::{
    map::MapSource, AnimationSource, StaticAnimation, TileFlags, TileQuery, ZoneHandle,
};
use log::{error, info};

mod error;
mod geometry;
mod grid;
mod zones;

pub use error::LoadError;
pub use grid::TileGrid;
pub use zones::{Zone, ZoneLayerSet};

/// Collision world backed by a borrowed map and animation source.
pub struct Collision<'map, M: ?Sized, A: ?Sized = StaticAnimation> {
    map: &'map M,
    animation: &'map A,
    grid: TileGrid,
    zones: ZoneLayerSet,
    time: f64,
}

impl<'map, M, A> Collision<'map, M, A>
where
    M: MapSource + ?Sized,
    A: AnimationSource + ?Sized,
{
    /// Builds the collision world from the map's game layer and zone group.
    pub fn load(map: &'map M, animation: &'map A) -> Result<Self, LoadError> {
        let grid = load_grid(map).map_err(|load_error| {
            error!("collision map rejected: {load_error}");
            load_error
        })?;
        info!(
            "collision grid loaded: {} x {} tiles",
            grid.width(),
            grid.height()
        );

        Ok(Self {
            map,
            animation,
            grid,
            zones: ZoneLayerSet::new(map.zone_group()),
            time: 0.0,
        })
    }

    /// Returns the handle of the zone named `name`, allocating it on first use.
    ///
    /// Returns `None` when the map has no zone group. Handles stay valid for
    /// the lifetime of the world.
    pub fn zone_handle(&mut self, name: &str) -> Option<ZoneHandle> {
        self.zones.handle_for(self.map, name)
    }

    /// Sets the animation time observed by zone queries until the next call.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

fn load_grid<M>(map: &M) -> Result<TileGrid, LoadError>
where
    M: MapSource + ?Sized,
{
    let layer = map.game_layer().ok_or(LoadError::MissingGameLayer)?;
    TileGrid::from_layer(layer, map.data(layer.data))
}

impl<M, A> TileQuery for Collision<'_, M, A>
where
    M: ?Sized,
    A: ?Sized,
{
    fn tile_flags(&self, x: i32, y: i32) -> TileFlags {
        self.grid.tile_flags(x, y)
    }
}

impl<M, A> fmt::Debug for Collision<'_, M, A>
where
    M: ?Sized,
    A: ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collision")
            .field("grid", &self.grid)
            .field("zones", &self.zones)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

/// Query functions that provide read-only access to the collision world.
pub mod query {
    use glam::Vec2;
    use gridbound_core::{
        map::MapSource, AnimationSource, TileFlags, TileQuery, ZoneHandle, TILE_SIZE,
    };

    use super::{Collision, TileGrid, ZoneLayerSet};

    /// Provides read-only access to the classified tile grid.
    #[must_use]
    pub fn tile_grid<'a, M: ?Sized, A: ?Sized>(
        collision: &'a Collision<'_, M, A>,
    ) -> &'a TileGrid {
        &collision.grid
    }

    /// Provides read-only access to the zones allocated so far.
    #[must_use]
    pub fn zones<'a, M: ?Sized, A: ?Sized>(
        collision: &'a Collision<'_, M, A>,
    ) -> &'a ZoneLayerSet {
        &collision.zones
    }

    /// Flags of the tile containing the integer world coordinate.
    ///
    /// Coordinates beyond the map resolve to the nearest border tile, so
    /// entities cannot leave through the map edge.
    #[must_use]
    pub fn tile_at<M: ?Sized, A: ?Sized>(
        collision: &Collision<'_, M, A>,
        x: i32,
        y: i32,
    ) -> TileFlags {
        collision.tile_flags(x, y)
    }

    /// Reports whether the tile containing the integer world coordinate is solid.
    #[must_use]
    pub fn is_tile_solid<M: ?Sized, A: ?Sized>(
        collision: &Collision<'_, M, A>,
        x: i32,
        y: i32,
    ) -> bool {
        tile_at(collision, x, y).contains(TileFlags::SOLID)
    }

    /// Value of the zone at a world-space point; 0 when nothing claims it.
    ///
    /// Layers are evaluated in declared order and quads in record order; the
    /// last contributor wins. Unknown handles and maps without a zone group
    /// report 0.
    #[must_use]
    pub fn zone_value_at<M, A>(
        collision: &Collision<'_, M, A>,
        handle: ZoneHandle,
        pos: Vec2,
    ) -> i32
    where
        M: MapSource + ?Sized,
        A: AnimationSource + ?Sized,
    {
        collision.zones.value_at(
            collision.map,
            collision.animation,
            collision.time,
            handle,
            pos,
        )
    }

    /// Number of tile columns in the game layer.
    #[must_use]
    pub fn width<M: ?Sized, A: ?Sized>(collision: &Collision<'_, M, A>) -> u32 {
        collision.grid.width()
    }

    /// Number of tile rows in the game layer.
    #[must_use]
    pub fn height<M: ?Sized, A: ?Sized>(collision: &Collision<'_, M, A>) -> u32 {
        collision.grid.height()
    }

    /// Extent of the playable area in world units.
    #[must_use]
    pub fn world_size<M: ?Sized, A: ?Sized>(collision: &Collision<'_, M, A>) -> Vec2 {
        Vec2::new(
            (collision.grid.width() as f32) * TILE_SIZE as f32,
            (collision.grid.height() as f32) * TILE_SIZE as f32,
        )
    }

    /// Animation time currently observed by zone queries.
    #[must_use]
    pub fn time<M: ?Sized, A: ?Sized>(collision: &Collision<'_, M, A>) -> f64 {
        collision.time
    }
}
