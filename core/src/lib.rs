#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the gridbound collision engine.
//!
//! This crate defines the vocabulary that connects the authoritative collision
//! world, the pure resolver systems, and the adapters. The world loads a
//! decoded map through the [`map::MapSource`] contract and answers tile
//! queries through [`TileQuery`]; systems are written against that trait only,
//! so they stay free functions over plain position and velocity data.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

mod animation;
pub mod map;
mod rng;

pub use animation::{AnimationSource, AnimationTransform, StaticAnimation};
pub use rng::SimRng;

/// Edge length of a single square tile measured in world units.
///
/// Shared with the map format; changing it breaks every existing map asset.
pub const TILE_SIZE: i32 = 32;

/// Highest tile index that still participates in collision.
///
/// Stored indices above this value are out-of-band and read back as empty.
pub const DECORATIVE_INDEX_THRESHOLD: u8 = 128;

bitflags! {
    /// Collision flags carried by a classified tile.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TileFlags: u8 {
        /// Blocks movement and line of sight.
        const SOLID = 1;
        /// Kills entities that touch the tile.
        const DEATH = 2;
        /// Marks a solid tile that hooks cannot attach to.
        const NOHOOK = 4;
    }
}

impl TileFlags {
    /// Interprets a stored tile index, treating out-of-band indices as empty.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        if index > DECORATIVE_INDEX_THRESHOLD {
            Self::empty()
        } else {
            Self::from_bits_retain(index)
        }
    }
}

/// Tile type codes as authored in the map's game layer, before classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RawTileKind {
    /// Empty space.
    Air,
    /// Regular solid ground.
    Solid,
    /// Instant-death area.
    Death,
    /// Solid ground that rejects hooks.
    NoHook,
    /// Any other code up to the decorative threshold; passable.
    Decoration(u8),
    /// Codes above the decorative threshold; kept verbatim and never colliding.
    OutOfBand(u8),
}

impl RawTileKind {
    /// Decodes a raw tile code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Air,
            1 => Self::Solid,
            2 => Self::Death,
            3 => Self::NoHook,
            code if code > DECORATIVE_INDEX_THRESHOLD => Self::OutOfBand(code),
            code => Self::Decoration(code),
        }
    }

    /// Raw code as stored in map data.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Air => 0,
            Self::Solid => 1,
            Self::Death => 2,
            Self::NoHook => 3,
            Self::Decoration(code) | Self::OutOfBand(code) => code,
        }
    }

    /// Index stored in the tile grid once this code has been classified.
    #[must_use]
    pub const fn classified_index(self) -> u8 {
        match self {
            Self::Air | Self::Decoration(_) => 0,
            Self::Solid => TileFlags::SOLID.bits(),
            Self::Death => TileFlags::DEATH.bits(),
            Self::NoHook => TileFlags::SOLID.union(TileFlags::NOHOOK).bits(),
            Self::OutOfBand(code) => code,
        }
    }
}

/// Identifier of a zone allocated by the collision world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneHandle(u32);

impl ZoneHandle {
    /// Creates a zone handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Rounds half away from zero and truncates to an integer world coordinate.
///
/// Every float-to-tile conversion goes through this function so that server
/// and client prediction land in the same cell.
#[must_use]
pub fn round_to_int(value: f32) -> i32 {
    if value > 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

/// Read-only access to the collision flags of a tile grid.
///
/// Implementors only provide [`TileQuery::tile_flags`]; the float probes used
/// by the resolvers are derived from it.
pub trait TileQuery {
    /// Flags of the tile containing the integer world coordinate.
    ///
    /// Coordinates outside the grid resolve to the nearest border tile.
    fn tile_flags(&self, x: i32, y: i32) -> TileFlags;

    /// Flags of the tile containing the world-space point.
    fn flags_at(&self, pos: Vec2) -> TileFlags {
        self.tile_flags(round_to_int(pos.x), round_to_int(pos.y))
    }

    /// Reports whether the world-space point lies in a solid tile.
    fn is_solid_at(&self, pos: Vec2) -> bool {
        self.flags_at(pos).contains(TileFlags::SOLID)
    }

    /// Reports whether any corner of the box centred on `center` is solid.
    fn is_box_blocked(&self, center: Vec2, size: Vec2) -> bool {
        let half = size * 0.5;
        self.is_solid_at(Vec2::new(center.x - half.x, center.y - half.y))
            || self.is_solid_at(Vec2::new(center.x + half.x, center.y - half.y))
            || self.is_solid_at(Vec2::new(center.x - half.x, center.y + half.y))
            || self.is_solid_at(Vec2::new(center.x + half.x, center.y + half.y))
    }
}

#[cfg(test)]
mod tests {
    use super::{round_to_int, RawTileKind, TileFlags, TileQuery, TILE_SIZE};
    use glam::Vec2;

    /// Solid everywhere right of x = 64.
    struct RightWall;

    impl TileQuery for RightWall {
        fn tile_flags(&self, x: i32, _y: i32) -> TileFlags {
            if x / TILE_SIZE >= 2 {
                TileFlags::SOLID
            } else {
                TileFlags::empty()
            }
        }
    }

    #[test]
    fn round_to_int_rounds_half_away_from_zero() {
        assert_eq!(round_to_int(1.5), 2);
        assert_eq!(round_to_int(1.49), 1);
        assert_eq!(round_to_int(-1.5), -2);
        assert_eq!(round_to_int(-0.4), 0);
        assert_eq!(round_to_int(0.0), 0);
    }

    #[test]
    fn classification_maps_every_raw_code() {
        assert_eq!(RawTileKind::from_code(0).classified_index(), 0);
        assert_eq!(RawTileKind::from_code(1).classified_index(), 1);
        assert_eq!(RawTileKind::from_code(2).classified_index(), 2);
        assert_eq!(RawTileKind::from_code(3).classified_index(), 5);
        assert_eq!(RawTileKind::from_code(77).classified_index(), 0);
        assert_eq!(RawTileKind::from_code(128).classified_index(), 0);
        assert_eq!(RawTileKind::from_code(129).classified_index(), 129);
        assert_eq!(RawTileKind::from_code(200).code(), 200);
    }

    #[test]
    fn out_of_band_indices_read_as_empty() {
        assert_eq!(TileFlags::from_index(129), TileFlags::empty());
        assert_eq!(TileFlags::from_index(255), TileFlags::empty());
        assert_eq!(
            TileFlags::from_index(5),
            TileFlags::SOLID | TileFlags::NOHOOK
        );
    }

    #[test]
    fn box_probe_checks_every_corner() {
        let wall = RightWall;
        assert!(!wall.is_box_blocked(Vec2::new(40.0, 10.0), Vec2::new(20.0, 20.0)));
        assert!(wall.is_box_blocked(Vec2::new(50.0, 10.0), Vec2::new(28.0, 20.0)));
        assert!(wall.is_solid_at(Vec2::new(63.5, 0.0)));
        assert!(!wall.is_solid_at(Vec2::new(63.4, 0.0)));
    }
}
