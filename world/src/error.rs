//! Load-time failures of the collision world.

use thiserror::Error;

/// Reasons a map cannot back a collision world.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The map does not declare a game layer.
    #[error("map has no game layer")]
    MissingGameLayer,
    /// The tile layer claims no tiles, or negative dimensions.
    #[error("tile layer is empty ({width} x {height})")]
    EmptyTilemap {
        /// Claimed number of columns.
        width: i32,
        /// Claimed number of rows.
        height: i32,
    },
    /// The tile count or the byte size of the layer does not fit in 32 bits.
    #[error("map layer too big ({width} * {height} * {record_size} causes an integer overflow)")]
    TilemapOverflow {
        /// Claimed number of columns.
        width: i32,
        /// Claimed number of rows.
        height: i32,
        /// Size of one tile record in bytes.
        record_size: usize,
    },
    /// The data blob referenced by the tile layer does not exist.
    #[error("tile layer data blob is missing")]
    MissingTileData,
    /// The data blob holds fewer bytes than the claimed dimensions need.
    #[error("tile layer data truncated: expected {expected} bytes, found {actual}")]
    TruncatedTileData {
        /// Bytes required by the claimed dimensions.
        expected: usize,
        /// Bytes present in the blob.
        actual: usize,
    },
}
