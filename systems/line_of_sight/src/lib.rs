#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-of-sight tracing against the collision grid.

use glam::Vec2;
use gridbound_core::{TileFlags, TileQuery};

/// Longest segment, in world units, that [`intersect_line`] traces. Every
/// world unit costs one sample.
pub const MAX_TRACE_DISTANCE: f32 = 1.0e6;

/// Outcome of tracing a segment through the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineIntersection {
    /// Flags of the first solid sample; empty when the segment is clear.
    pub flags: TileFlags,
    /// First solid sample, or the segment end when clear.
    pub collision: Vec2,
    /// Last free sample before the collision, or the segment end when clear.
    pub before_collision: Vec2,
}

impl LineIntersection {
    fn clear(end: Vec2) -> Self {
        Self {
            flags: TileFlags::empty(),
            collision: end,
            before_collision: end,
        }
    }

    /// Reports whether the segment hit solid geometry.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Walks from `from` to `to` one world unit at a time and reports the first
/// solid sample.
///
/// Samples are taken at `i / distance` along the segment for
/// `i in 0..trunc(distance + 1)`, starting at `from`. A zero-length segment is
/// always clear, and so is one longer than [`MAX_TRACE_DISTANCE`] or with a
/// non-finite end point, which is not traced at all.
pub fn intersect_line<Q>(grid: &Q, from: Vec2, to: Vec2) -> LineIntersection
where
    Q: TileQuery + ?Sized,
{
    let distance = from.distance(to);
    if distance == 0.0 || !distance.is_finite() || distance > MAX_TRACE_DISTANCE {
        return LineIntersection::clear(to);
    }

    let samples = (distance + 1.0) as u32;
    let mut last = from;
    for step in 0..samples {
        let sample = from.lerp(to, step as f32 / distance);
        if grid.is_solid_at(sample) {
            return LineIntersection {
                flags: grid.flags_at(sample),
                collision: sample,
                before_collision: last,
            };
        }
        last = sample;
    }

    LineIntersection::clear(to)
}
