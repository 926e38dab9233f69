//! Contract for the envelope evaluator that animates zone quads.

use glam::Vec2;

/// Position offset and rotation produced by an animation channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationTransform {
    /// Translation applied to every corner of the animated quad.
    pub offset: Vec2,
    /// Rotation in radians applied about the quad's rotation centre.
    pub angle: f32,
}

impl AnimationTransform {
    /// Transform that leaves geometry untouched.
    pub const IDENTITY: Self = Self {
        offset: Vec2::ZERO,
        angle: 0.0,
    };

    /// Creates a transform from an offset and an angle in radians.
    #[must_use]
    pub const fn new(offset: Vec2, angle: f32) -> Self {
        Self { offset, angle }
    }
}

impl Default for AnimationTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Evaluates animation channels at a point in simulation time.
pub trait AnimationSource {
    /// Interpolated transform of `channel` at `time` seconds.
    fn transform(&self, time: f64, channel: i32) -> AnimationTransform;
}

/// Animation source for maps without animated geometry.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticAnimation;

impl AnimationSource for StaticAnimation {
    fn transform(&self, _time: f64, _channel: i32) -> AnimationTransform {
        AnimationTransform::IDENTITY
    }
}

impl<F> AnimationSource for F
where
    F: Fn(f64, i32) -> AnimationTransform,
{
    fn transform(&self, time: f64, channel: i32) -> AnimationTransform {
        self(time, channel)
    }
}
