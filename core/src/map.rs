//! Contract with the external map decoder.
//!
//! The container format is parsed elsewhere. What reaches the collision world
//! is a layer table, the game layer, the zone group, and raw data blobs. Tile
//! and quad blobs keep their on-disk record layout; the helpers below encode
//! and decode single records but never touch the container itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Size in bytes of one tile record: index, flags, skip, reserved.
pub const TILE_RECORD_SIZE: usize = 4;

/// Size in bytes of one quad record.
pub const QUAD_RECORD_SIZE: usize = QUAD_WORDS * 4;

const QUAD_WORDS: usize = 38;
const FIXED_SCALE: f32 = 1024.0;

/// Handle of a raw data blob inside the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataRef(u32);

impl DataRef {
    /// Creates a data reference from its numeric index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index of the blob.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Contiguous run of layers in the global layer table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroup {
    /// Index of the first layer in the global table.
    pub start_layer: u32,
    /// Number of layers the group spans.
    pub num_layers: u32,
}

/// Tile layer header as decoded from the map.
///
/// Dimensions stay signed because they come straight from untrusted data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilemapItem {
    /// Number of tile columns claimed by the layer.
    pub width: i32,
    /// Number of tile rows claimed by the layer.
    pub height: i32,
    /// Layer name used to group zone layers.
    pub name: String,
    /// Blob holding `width * height` tile records.
    pub data: DataRef,
}

/// Quad layer header as decoded from the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadsItem {
    /// Number of quads claimed by the layer.
    pub num_quads: i32,
    /// Layer name used to group zone layers.
    pub name: String,
    /// Blob holding `num_quads` quad records.
    pub data: DataRef,
}

/// Entry of the global layer table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerItem {
    /// Layer of square tiles.
    Tiles(TilemapItem),
    /// Layer of free-form quads.
    Quads(QuadsItem),
    /// Any layer type the collision world ignores.
    Other,
}

impl LayerItem {
    /// Name of the layer, if its type carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Tiles(tiles) => Some(&tiles.name),
            Self::Quads(quads) => Some(&quads.name),
            Self::Other => None,
        }
    }
}

/// Decoded map structure consumed by the collision world.
pub trait MapSource {
    /// Number of entries in the global layer table.
    fn layer_count(&self) -> u32;

    /// Layer stored at `index` in the global table.
    fn layer(&self, index: u32) -> Option<&LayerItem>;

    /// Tile layer that carries world collision, if the map has one.
    fn game_layer(&self) -> Option<&TilemapItem>;

    /// Group whose layers may be combined into zones.
    fn zone_group(&self) -> Option<LayerGroup>;

    /// Raw bytes of a data blob.
    fn data(&self, data: DataRef) -> Option<&[u8]>;
}

/// Converts a 22.10 fixed-point map coordinate into world units.
#[must_use]
pub fn fixed_to_float(value: i32) -> f32 {
    value as f32 * (1.0 / FIXED_SCALE)
}

/// Converts world units into a 22.10 fixed-point map coordinate.
#[must_use]
pub fn float_to_fixed(value: f32) -> i32 {
    (value * FIXED_SCALE) as i32
}

/// Encodes tile indices as a blob of tile records with zeroed flags.
#[must_use]
pub fn encode_tiles(indices: &[u8]) -> Vec<u8> {
    indices
        .iter()
        .flat_map(|&index| [index, 0, 0, 0])
        .collect()
}

/// One quad record in its map layout.
///
/// Points are fixed-point; the fifth point is the rotation centre. The colour
/// envelope offset doubles as the value reported by zone queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadRecord {
    /// Four corners followed by the rotation centre.
    pub points: [[i32; 2]; 5],
    /// Corner colours.
    pub colors: [[i32; 4]; 4],
    /// Corner texture coordinates.
    pub texcoords: [[i32; 2]; 4],
    /// Position envelope, or a negative value when the quad is static.
    pub pos_env: i32,
    /// Time offset into the position envelope.
    pub pos_env_offset: i32,
    /// Colour envelope, or a negative value when unused.
    pub color_env: i32,
    /// Time offset into the colour envelope; reported as the zone value.
    pub color_env_offset: i32,
}

impl QuadRecord {
    /// Creates a static quad from world-space corners carrying a zone value.
    ///
    /// The rotation centre defaults to the average of the corners.
    #[must_use]
    pub fn new(corners: [Vec2; 4], value: i32) -> Self {
        let center = (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25;
        let mut points = [[0; 2]; 5];
        for (point, corner) in points.iter_mut().zip(corners.iter().chain([&center])) {
            *point = [float_to_fixed(corner.x), float_to_fixed(corner.y)];
        }
        Self {
            points,
            colors: [[255; 4]; 4],
            texcoords: [[0; 2]; 4],
            pos_env: -1,
            pos_env_offset: 0,
            color_env: -1,
            color_env_offset: value,
        }
    }

    /// Replaces the rotation centre.
    #[must_use]
    pub fn with_rotation_center(mut self, center: Vec2) -> Self {
        self.points[4] = [float_to_fixed(center.x), float_to_fixed(center.y)];
        self
    }

    /// Attaches a position envelope.
    #[must_use]
    pub fn with_position_envelope(mut self, envelope: i32) -> Self {
        self.pos_env = envelope;
        self
    }

    /// Corner `index` (0..4) or the rotation centre (4) in world units.
    ///
    /// Indices past the rotation centre resolve to the rotation centre.
    #[must_use]
    pub fn point(&self, index: usize) -> Vec2 {
        let [x, y] = self.points[index.min(4)];
        Vec2::new(fixed_to_float(x), fixed_to_float(y))
    }

    /// Value reported by zone queries that land inside the quad.
    #[must_use]
    pub const fn zone_value(&self) -> i32 {
        self.color_env_offset
    }

    /// Decodes a little-endian quad record from the start of `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut words = [0_i32; QUAD_WORDS];
        for (index, word) in words.iter_mut().enumerate() {
            let start = index * 4;
            let chunk = bytes.get(start..start + 4)?;
            *word = i32::from_le_bytes(chunk.try_into().ok()?);
        }

        let mut record = Self {
            points: [[0; 2]; 5],
            colors: [[0; 4]; 4],
            texcoords: [[0; 2]; 4],
            pos_env: words[34],
            pos_env_offset: words[35],
            color_env: words[36],
            color_env_offset: words[37],
        };
        for (point, pair) in record.points.iter_mut().zip(words[0..10].chunks_exact(2)) {
            *point = [pair[0], pair[1]];
        }
        for (color, quad) in record.colors.iter_mut().zip(words[10..26].chunks_exact(4)) {
            *color = [quad[0], quad[1], quad[2], quad[3]];
        }
        for (texcoord, pair) in record
            .texcoords
            .iter_mut()
            .zip(words[26..34].chunks_exact(2))
        {
            *texcoord = [pair[0], pair[1]];
        }
        Some(record)
    }

    /// Encodes the record in its little-endian map layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; QUAD_RECORD_SIZE] {
        let words = self
            .points
            .iter()
            .flatten()
            .chain(self.colors.iter().flatten())
            .chain(self.texcoords.iter().flatten())
            .chain([
                &self.pos_env,
                &self.pos_env_offset,
                &self.color_env,
                &self.color_env_offset,
            ]);

        let mut bytes = [0_u8; QUAD_RECORD_SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// In-memory map used by adapters and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMap {
    layers: Vec<LayerItem>,
    game_layer: Option<u32>,
    zone_group: Option<LayerGroup>,
    data: Vec<Vec<u8>>,
}

impl MemoryMap {
    /// Creates an empty map without layers or data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a data blob and returns its reference.
    pub fn push_data(&mut self, bytes: Vec<u8>) -> DataRef {
        let reference = DataRef::new(self.data.len() as u32);
        self.data.push(bytes);
        reference
    }

    /// Appends a layer to the global table and returns its index.
    pub fn push_layer(&mut self, layer: LayerItem) -> u32 {
        let index = self.layers.len() as u32;
        self.layers.push(layer);
        index
    }

    /// Appends a tile layer built from raw tile indices.
    ///
    /// The claimed dimensions are stored verbatim, even if they disagree with
    /// the number of indices provided.
    pub fn push_tile_layer(&mut self, name: &str, width: i32, height: i32, indices: &[u8]) -> u32 {
        let data = self.push_data(encode_tiles(indices));
        self.push_layer(LayerItem::Tiles(TilemapItem {
            width,
            height,
            name: name.to_owned(),
            data,
        }))
    }

    /// Appends a quad layer holding the provided records.
    pub fn push_quad_layer(&mut self, name: &str, quads: &[QuadRecord]) -> u32 {
        let bytes = quads.iter().flat_map(QuadRecord::to_bytes).collect();
        let data = self.push_data(bytes);
        self.push_layer(LayerItem::Quads(QuadsItem {
            num_quads: i32::try_from(quads.len()).unwrap_or(i32::MAX),
            name: name.to_owned(),
            data,
        }))
    }

    /// Marks the tile layer at `layer` as the game layer.
    pub fn set_game_layer(&mut self, layer: u32) {
        self.game_layer = Some(layer);
    }

    /// Declares the group of layers that zones are built from.
    pub fn set_zone_group(&mut self, group: LayerGroup) {
        self.zone_group = Some(group);
    }
}

impl MapSource for MemoryMap {
    fn layer_count(&self) -> u32 {
        self.layers.len() as u32
    }

    fn layer(&self, index: u32) -> Option<&LayerItem> {
        self.layers.get(usize::try_from(index).ok()?)
    }

    fn game_layer(&self) -> Option<&TilemapItem> {
        match self.layer(self.game_layer?)? {
            LayerItem::Tiles(tiles) => Some(tiles),
            LayerItem::Quads(_) | LayerItem::Other => None,
        }
    }

    fn zone_group(&self) -> Option<LayerGroup> {
        self.zone_group
    }

    fn data(&self, data: DataRef) -> Option<&[u8]> {
        self.data
            .get(usize::try_from(data.get()).ok()?)
            .map(Vec::as_slice)
    }
}
