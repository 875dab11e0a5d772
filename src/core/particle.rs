//! Particle entity and the per-frame integration step
//!
//! Units are logical surface pixels; time advances one frame per step.

use std::ops::Range;

use glam::DVec2;
use rand::Rng;
use serde::Serialize;

/// Max initial speed per axis (pixels per frame)
pub const INITIAL_SPEED: f64 = 0.25;
/// Dot radius range, half-open
pub const RADIUS_RANGE: Range<f64> = 1.2..2.8;
/// Dot opacity range, half-open
pub const ALPHA_RANGE: Range<f64> = 0.12..0.37;
/// How far past an edge a particle may drift before it wraps around
pub const WRAP_MARGIN: f64 = 20.0;

/// Pointer attraction only applies inside this radius
pub const MOUSE_INFLUENCE_RADIUS: f64 = 240.0;
/// Pull coefficient applied to the raw particle-to-pointer delta
pub const MOUSE_PULL: f64 = 0.03;
/// Fixed scale on top of [`MOUSE_PULL`]
pub const MOUSE_PULL_SCALE: f64 = 0.0008;

/// A single point in the field.
///
/// `radius` and `alpha` are fixed at creation; only position and velocity
/// change between frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    radius: f64,
    alpha: f64,
}

impl Particle {
    pub fn new(position: DVec2, velocity: DVec2, radius: f64, alpha: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
            alpha,
        }
    }

    /// Fresh particle uniformly placed in `[0, bounds.x) × [0, bounds.y)`.
    ///
    /// Scaling a unit sample (rather than `gen_range(0.0..width)`) keeps a
    /// zero-sized surface valid: every particle lands on the origin.
    pub fn random<R: Rng>(rng: &mut R, bounds: DVec2) -> Self {
        let position = DVec2::new(rng.gen::<f64>() * bounds.x, rng.gen::<f64>() * bounds.y);
        let velocity = DVec2::new(
            rng.gen_range(-INITIAL_SPEED..=INITIAL_SPEED),
            rng.gen_range(-INITIAL_SPEED..=INITIAL_SPEED),
        );
        let radius = RADIUS_RANGE.start + rng.gen::<f64>() * (RADIUS_RANGE.end - RADIUS_RANGE.start);
        let alpha = ALPHA_RANGE.start + rng.gen::<f64>() * (ALPHA_RANGE.end - ALPHA_RANGE.start);
        Self::new(position, velocity, radius, alpha)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Velocity change caused by the pointer this frame.
    ///
    /// The pull is proportional to the raw delta, so it grows with distance
    /// up to the cutoff and drops to zero outside it.
    pub fn pointer_pull(&self, pointer: DVec2) -> DVec2 {
        let delta = pointer - self.position;
        if delta.length() < MOUSE_INFLUENCE_RADIUS {
            delta * MOUSE_PULL * MOUSE_PULL_SCALE
        } else {
            DVec2::ZERO
        }
    }

    /// One frame: pointer pull, Euler step, edge wrap.
    pub fn step(&mut self, pointer: DVec2, bounds: DVec2) {
        self.velocity += self.pointer_pull(pointer);
        self.position += self.velocity;
        self.wrap(bounds);
    }

    /// Teleport to the opposite edge once past the margin. Never clamps.
    pub fn wrap(&mut self, bounds: DVec2) {
        self.position.x = wrap_axis(self.position.x, bounds.x);
        self.position.y = wrap_axis(self.position.y, bounds.y);
    }
}

fn wrap_axis(mut value: f64, extent: f64) -> f64 {
    if value < -WRAP_MARGIN {
        value = extent + WRAP_MARGIN;
    }
    if value > extent + WRAP_MARGIN {
        value = -WRAP_MARGIN;
    }
    value
}
