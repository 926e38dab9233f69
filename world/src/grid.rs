//! Classified collision tiles of the game layer.

use gridbound_core::{
    map::{TilemapItem, TILE_RECORD_SIZE},
    RawTileKind, TileFlags, TileQuery, TILE_SIZE,
};

use crate::LoadError;

/// Dense, row-major grid of classified tile indices.
///
/// The only way to obtain a grid is to classify raw tile codes, so a grid can
/// never be classified twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<u8>,
}

impl TileGrid {
    /// Classifies raw tile codes laid out row-major.
    ///
    /// `codes` may be longer than `width * height`; trailing codes are ignored.
    pub fn from_codes(width: i32, height: i32, codes: &[u8]) -> Result<Self, LoadError> {
        let count = checked_tile_count(width, height)?;
        if codes.len() < count {
            return Err(LoadError::TruncatedTileData {
                expected: count,
                actual: codes.len(),
            });
        }

        Ok(Self::classified(width, height, codes.iter().copied().take(count)))
    }

    /// Classifies a tile layer whose blob stores one record per tile.
    pub(crate) fn from_layer(layer: &TilemapItem, blob: Option<&[u8]>) -> Result<Self, LoadError> {
        let count = checked_tile_count(layer.width, layer.height)?;
        let blob = blob.ok_or(LoadError::MissingTileData)?;
        check_blob_len(blob, count * TILE_RECORD_SIZE)?;

        let codes = blob
            .chunks_exact(TILE_RECORD_SIZE)
            .take(count)
            .map(|record| record[0]);
        Ok(Self::classified(layer.width, layer.height, codes))
    }

    fn classified(width: i32, height: i32, codes: impl Iterator<Item = u8>) -> Self {
        Self {
            width: width.unsigned_abs(),
            height: height.unsigned_abs(),
            tiles: codes
                .map(|code| RawTileKind::from_code(code).classified_index())
                .collect(),
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Stored index of the tile at the given cell, if it lies inside the grid.
    ///
    /// Out-of-band indices are returned verbatim.
    #[must_use]
    pub fn index(&self, column: u32, row: u32) -> Option<u8> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let offset = usize::try_from(row)
            .ok()?
            .checked_mul(usize::try_from(self.width).ok()?)?
            .checked_add(usize::try_from(column).ok()?)?;
        self.tiles.get(offset).copied()
    }
}

impl TileQuery for TileGrid {
    fn tile_flags(&self, x: i32, y: i32) -> TileFlags {
        let offset = clamped_cell(x, y, self.width as i32, self.height as i32);
        self.tiles
            .get(offset)
            .map_or(TileFlags::empty(), |&index| TileFlags::from_index(index))
    }
}

/// Validates tile layer dimensions and returns the tile count.
///
/// Both the element count and the byte size must fit in an `i32`, matching the
/// arithmetic the map format was authored against.
pub(crate) fn checked_tile_count(width: i32, height: i32) -> Result<usize, LoadError> {
    if width <= 0 || height <= 0 {
        return Err(LoadError::EmptyTilemap { width, height });
    }

    let overflow = || LoadError::TilemapOverflow {
        width,
        height,
        record_size: TILE_RECORD_SIZE,
    };
    let count = width.checked_mul(height).ok_or_else(overflow)?;
    let _ = count
        .checked_mul(TILE_RECORD_SIZE as i32)
        .ok_or_else(overflow)?;
    usize::try_from(count).map_err(|_| overflow())
}

pub(crate) fn check_blob_len(blob: &[u8], expected: usize) -> Result<(), LoadError> {
    if blob.len() < expected {
        return Err(LoadError::TruncatedTileData {
            expected,
            actual: blob.len(),
        });
    }
    Ok(())
}

/// Row-major offset of the cell containing `(x, y)`, clamped to the grid.
///
/// Division truncates toward zero, so small negative coordinates land in the
/// first row or column just like far-out ones.
pub(crate) fn clamped_cell(x: i32, y: i32, width: i32, height: i32) -> usize {
    let column = (x / TILE_SIZE).clamp(0, width - 1);
    let row = (y / TILE_SIZE).clamp(0, height - 1);
    row as usize * width as usize + column as usize
}
