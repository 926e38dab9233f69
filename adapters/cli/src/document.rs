//! JSON map documents accepted by the command-line adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use glam::Vec2;
use gridbound_core::{
    map::{LayerGroup, MapSource, MemoryMap, QuadRecord},
    AnimationSource, AnimationTransform,
};
use serde::Deserialize;
use thiserror::Error;

/// Name given to the collision layer built from [`MapDocument::rows`].
pub(crate) const GAME_LAYER_NAME: &str = "Game";

/// Hand-authored map: the game layer, optional zone layers and envelopes.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MapDocument {
    /// Raw tile codes of the game layer, one inner vector per row.
    pub(crate) rows: Vec<Vec<u8>>,
    /// Layers of the zone group, in evaluation order.
    #[serde(default)]
    pub(crate) zones: Vec<ZoneLayerDocument>,
    /// Position envelopes referenced by animated quads, indexed by channel.
    #[serde(default)]
    pub(crate) envelopes: Vec<EnvelopeDocument>,
}

/// Layer of the zone group.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum ZoneLayerDocument {
    /// Zone values laid out on the tile grid.
    Tiles {
        /// Zone name shared by every layer contributing to the zone.
        name: String,
        /// Zone values, one inner vector per row.
        rows: Vec<Vec<u8>>,
    },
    /// Free-form quads carrying a zone value.
    Quads {
        /// Zone name shared by every layer contributing to the zone.
        name: String,
        /// Quads in evaluation order.
        quads: Vec<QuadDocument>,
    },
}

/// Quad described with world-space corners.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct QuadDocument {
    /// Top-left, top-right, bottom-left and bottom-right corners.
    pub(crate) corners: [[f32; 2]; 4],
    /// Rotation centre; defaults to the average of the corners.
    #[serde(default)]
    pub(crate) center: Option<[f32; 2]>,
    /// Position envelope animating the quad.
    #[serde(default)]
    pub(crate) envelope: Option<i32>,
    /// Value reported for points inside the quad.
    pub(crate) value: i32,
}

/// Envelope that moves and spins at a constant rate.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EnvelopeDocument {
    /// Offset gained per second, in world units.
    #[serde(default)]
    pub(crate) velocity: [f32; 2],
    /// Rotation gained per second, in radians.
    #[serde(default)]
    pub(crate) angular_velocity: f32,
    /// Length of one cycle in seconds; the motion restarts after each cycle.
    #[serde(default)]
    pub(crate) period: Option<f64>,
}

/// Reasons a map document cannot be turned into a map.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum DocumentError {
    /// The game layer has no rows or no columns.
    #[error("game layer has no tiles")]
    EmptyGameLayer,
    /// A row's length differs from the first row of the same layer.
    #[error("layer '{layer}' row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        /// Name of the offending layer.
        layer: String,
        /// Index of the offending row.
        row: usize,
        /// Length of the layer's first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A layer holds more rows, columns or quads than the map format can address.
    #[error("layer '{layer}' is too large")]
    TooLarge {
        /// Name of the offending layer.
        layer: String,
    },
}

impl MapDocument {
    /// Reads and parses a map document from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read map document {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse map document {}", path.display()))
    }

    /// Builds the in-memory map described by the document.
    pub(crate) fn to_map(&self) -> Result<MemoryMap, DocumentError> {
        let (width, height, codes) = flatten_rows(GAME_LAYER_NAME, &self.rows)?;
        if width == 0 || height == 0 {
            return Err(DocumentError::EmptyGameLayer);
        }

        let mut map = MemoryMap::new();
        let game = map.push_tile_layer(GAME_LAYER_NAME, width, height, &codes);
        map.set_game_layer(game);

        if self.zones.is_empty() {
            return Ok(map);
        }

        let start_layer = map.layer_count();
        for layer in &self.zones {
            let _ = match layer {
                ZoneLayerDocument::Tiles { name, rows } => {
                    let (width, height, values) = flatten_rows(name, rows)?;
                    map.push_tile_layer(name, width, height, &values)
                }
                ZoneLayerDocument::Quads { name, quads } => {
                    let records: Vec<QuadRecord> = quads.iter().map(QuadDocument::record).collect();
                    map.push_quad_layer(name, &records)
                }
            };
        }
        map.set_zone_group(LayerGroup {
            start_layer,
            num_layers: u32::try_from(self.zones.len()).map_err(|_| DocumentError::TooLarge {
                layer: "zones".to_owned(),
            })?,
        });

        Ok(map)
    }

    /// Animation source evaluating the document's envelopes.
    pub(crate) fn animation(&self) -> DocumentAnimation {
        DocumentAnimation {
            envelopes: self.envelopes.clone(),
        }
    }
}

impl QuadDocument {
    fn record(&self) -> QuadRecord {
        let corners = self.corners.map(|[x, y]| Vec2::new(x, y));
        let mut record = QuadRecord::new(corners, self.value);
        if let Some([x, y]) = self.center {
            record = record.with_rotation_center(Vec2::new(x, y));
        }
        if let Some(envelope) = self.envelope {
            record = record.with_position_envelope(envelope);
        }
        record
    }
}

/// Evaluates the constant-rate envelopes declared by a map document.
#[derive(Clone, Debug, Default)]
pub(crate) struct DocumentAnimation {
    envelopes: Vec<EnvelopeDocument>,
}

impl AnimationSource for DocumentAnimation {
    fn transform(&self, time: f64, channel: i32) -> AnimationTransform {
        let Some(envelope) = usize::try_from(channel)
            .ok()
            .and_then(|index| self.envelopes.get(index))
        else {
            return AnimationTransform::IDENTITY;
        };

        let local = match envelope.period {
            Some(period) if period > 0.0 => time.rem_euclid(period),
            _ => time,
        } as f32;
        let [vx, vy] = envelope.velocity;
        AnimationTransform::new(
            Vec2::new(vx, vy) * local,
            envelope.angular_velocity * local,
        )
    }
}

fn flatten_rows(layer: &str, rows: &[Vec<u8>]) -> Result<(i32, i32, Vec<u8>), DocumentError> {
    let expected = rows.first().map_or(0, Vec::len);
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(DocumentError::RaggedRow {
                layer: layer.to_owned(),
                row,
                expected,
                actual: cells.len(),
            });
        }
    }

    let too_large = || DocumentError::TooLarge {
        layer: layer.to_owned(),
    };
    let width = i32::try_from(expected).map_err(|_| too_large())?;
    let height = i32::try_from(rows.len()).map_err(|_| too_large())?;
    Ok((width, height, rows.concat()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbound_core::{StaticAnimation, TileFlags};
    use gridbound_world::{query, Collision};

    const ARENA: &str = include_str!("../maps/arena.json");

    #[test]
    fn bundled_arena_builds_a_collision_world() {
        let document: MapDocument = serde_json::from_str(ARENA).expect("arena parses");
        let map = document.to_map().expect("arena converts");
        let animation = document.animation();
        let mut collision = Collision::load(&map, &animation).expect("arena loads");

        assert_eq!(query::tile_at(&collision, 0, 0), TileFlags::SOLID);
        assert!(collision.zone_handle("water").is_some());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let document: MapDocument =
            serde_json::from_str(r#"{ "rows": [[1, 1, 1], [1, 0]] }"#).expect("parses");
        assert_eq!(
            document.to_map().unwrap_err(),
            DocumentError::RaggedRow {
                layer: GAME_LAYER_NAME.to_owned(),
                row: 1,
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn empty_game_layer_is_rejected() {
        let document: MapDocument = serde_json::from_str(r#"{ "rows": [] }"#).expect("parses");
        assert_eq!(document.to_map().unwrap_err(), DocumentError::EmptyGameLayer);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<MapDocument>(r#"{ "rows": [[0]], "tiles": [] }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn zone_layers_form_the_zone_group() {
        let document: MapDocument = serde_json::from_str(
            r#"{
                "rows": [[0, 0], [0, 0]],
                "zones": [
                    { "kind": "tiles", "name": "switch", "rows": [[0, 6], [0, 0]] },
                    { "kind": "quads", "name": "switch", "quads": [
                        { "corners": [[0, 0], [32, 0], [0, 32], [32, 32]], "value": 3 }
                    ] }
                ]
            }"#,
        )
        .expect("parses");
        let map = document.to_map().expect("converts");
        assert_eq!(
            map.zone_group(),
            Some(LayerGroup {
                start_layer: 1,
                num_layers: 2
            })
        );

        let mut collision = Collision::load(&map, &StaticAnimation).expect("loads");
        let switch = collision.zone_handle("switch").expect("zone group present");
        assert_eq!(query::zone_value_at(&collision, switch, Vec2::new(8.0, 8.0)), 3);
        assert_eq!(query::zone_value_at(&collision, switch, Vec2::new(48.0, 8.0)), 6);
    }

    #[test]
    fn envelopes_move_at_a_constant_rate() {
        let animation = DocumentAnimation {
            envelopes: vec![EnvelopeDocument {
                velocity: [10.0, 0.0],
                angular_velocity: 0.5,
                period: Some(4.0),
            }],
        };

        let halfway = animation.transform(2.0, 0);
        assert_eq!(halfway.offset, Vec2::new(20.0, 0.0));
        assert_eq!(halfway.angle, 1.0);
        assert_eq!(animation.transform(5.0, 0).offset, Vec2::new(10.0, 0.0));
        assert_eq!(animation.transform(5.0, 3), AnimationTransform::IDENTITY);
        assert_eq!(animation.transform(5.0, -1), AnimationTransform::IDENTITY);
    }
}
