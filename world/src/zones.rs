//! Named zones assembled from the tile and quad layers of the zone group.

use glam::Vec2;
use gridbound_core::{
    map::{
        DataRef, LayerGroup, LayerItem, MapSource, QuadRecord, QUAD_RECORD_SIZE, TILE_RECORD_SIZE,
    },
    round_to_int, AnimationSource, AnimationTransform, ZoneHandle, DECORATIVE_INDEX_THRESHOLD,
};
use log::{debug, warn};

use crate::{
    geometry::{inside_quad, rotate_about},
    grid::{check_blob_len, checked_tile_count, clamped_cell},
};

/// Layer of a zone whose header passed validation.
///
/// Only headers are cached; tile and quad payloads are read from the map on
/// every query.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ZoneLayer {
    Tiles {
        width: i32,
        height: i32,
        data: DataRef,
    },
    Quads {
        count: usize,
        data: DataRef,
    },
}

/// Ordered set of layers sharing a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zone {
    name: String,
    layers: Vec<ZoneLayer>,
}

impl Zone {
    /// Name shared by every layer of the zone.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of layers contributing to the zone.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// Append-only registry of zones built from the map's zone group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneLayerSet {
    group: Option<LayerGroup>,
    zones: Vec<Zone>,
}

impl ZoneLayerSet {
    pub(crate) fn new(group: Option<LayerGroup>) -> Self {
        Self {
            group,
            zones: Vec::new(),
        }
    }

    /// Zone registered under `handle`, if any.
    #[must_use]
    pub fn zone(&self, handle: ZoneHandle) -> Option<&Zone> {
        self.zones.get(usize::try_from(handle.get()).ok()?)
    }

    /// Number of zones allocated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Reports whether no zone has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub(crate) fn handle_for<M>(&mut self, map: &M, name: &str) -> Option<ZoneHandle>
    where
        M: MapSource + ?Sized,
    {
        let group = self.group?;

        if let Some(existing) = self.zones.iter().position(|zone| zone.name == name) {
            return Some(ZoneHandle::new(existing as u32));
        }

        let layers: Vec<ZoneLayer> = (0..group.num_layers)
            .filter_map(|offset| {
                let index = group.start_layer.checked_add(offset)?;
                let layer = map.layer(index)?;
                if layer.name() != Some(name) {
                    return None;
                }
                validate_layer(map, index, layer)
            })
            .collect();

        let handle = ZoneHandle::new(self.zones.len() as u32);
        debug!(
            "zone {:?} allocated as handle {} with {} layers",
            name,
            handle.get(),
            layers.len()
        );
        self.zones.push(Zone {
            name: name.to_owned(),
            layers,
        });
        Some(handle)
    }

    pub(crate) fn value_at<M, A>(
        &self,
        map: &M,
        animation: &A,
        time: f64,
        handle: ZoneHandle,
        pos: Vec2,
    ) -> i32
    where
        M: MapSource + ?Sized,
        A: AnimationSource + ?Sized,
    {
        if self.group.is_none() {
            return 0;
        }
        let Some(zone) = self.zone(handle) else {
            return 0;
        };

        let mut value = 0;
        for layer in &zone.layers {
            match *layer {
                ZoneLayer::Tiles {
                    width,
                    height,
                    data,
                } => {
                    let Some(blob) = map.data(data) else {
                        continue;
                    };
                    let (x, y) = (round_to_int(pos.x), round_to_int(pos.y));
                    let cell = clamped_cell(x, y, width, height);
                    let index = blob.get(cell * TILE_RECORD_SIZE).copied().unwrap_or(0);
                    if index > 0 && index <= DECORATIVE_INDEX_THRESHOLD {
                        value = i32::from(index);
                    }
                }
                ZoneLayer::Quads { count, data } => {
                    let Some(blob) = map.data(data) else {
                        continue;
                    };
                    let quads = blob
                        .chunks_exact(QUAD_RECORD_SIZE)
                        .take(count)
                        .filter_map(QuadRecord::from_bytes);
                    for quad in quads {
                        let transform = if quad.pos_env >= 0 {
                            animation.transform(time, quad.pos_env)
                        } else {
                            AnimationTransform::IDENTITY
                        };
                        if inside_quad(placed_corners(&quad, transform), pos) {
                            value = quad.zone_value();
                        }
                    }
                }
            }
        }
        value
    }
}

/// Corners of `quad` after applying its animation transform.
fn placed_corners(quad: &QuadRecord, transform: AnimationTransform) -> [Vec2; 4] {
    let mut corners = [0, 1, 2, 3].map(|index| transform.offset + quad.point(index));
    if transform.angle != 0.0 {
        let center = quad.point(4);
        for corner in &mut corners {
            *corner = rotate_about(center, *corner, transform.angle);
        }
    }
    corners
}

fn validate_layer<M>(map: &M, index: u32, layer: &LayerItem) -> Option<ZoneLayer>
where
    M: MapSource + ?Sized,
{
    match layer {
        LayerItem::Tiles(tiles) => {
            let checked = checked_tile_count(tiles.width, tiles.height).and_then(|count| {
                let blob = map.data(tiles.data).unwrap_or_default();
                check_blob_len(blob, count * TILE_RECORD_SIZE)
            });
            match checked {
                Ok(()) => Some(ZoneLayer::Tiles {
                    width: tiles.width,
                    height: tiles.height,
                    data: tiles.data,
                }),
                Err(error) => {
                    warn!("skipping zone tile layer {index} ({:?}): {error}", tiles.name);
                    None
                }
            }
        }
        LayerItem::Quads(quads) => {
            let count = usize::try_from(quads.num_quads).unwrap_or(0);
            let available = map.data(quads.data).map_or(0, <[u8]>::len);
            let expected = count.checked_mul(QUAD_RECORD_SIZE)?;
            if available < expected {
                warn!(
                    "skipping zone quad layer {index} ({:?}): expected {expected} bytes, \
                     found {available}",
                    quads.name
                );
                return None;
            }
            Some(ZoneLayer::Quads {
                count,
                data: quads.data,
            })
        }
        LayerItem::Other => None,
    }
}
