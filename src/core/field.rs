//! The particle batch and the proximity-link pass
//!
//! The batch has a fixed size for the lifetime of a session and is thrown
//! away and regenerated whole on every reseed; particles are never removed
//! or remapped individually.

use glam::DVec2;
use rand::Rng;
use tracing::{debug, trace};

use super::particle::Particle;

/// Number of particles in every batch
pub const PARTICLE_COUNT: usize = 90;
/// Pairs closer than this (strictly) get a connecting line
pub const LINK_DISTANCE: f64 = 120.0;
/// Line opacity at the link cutoff
pub const LINK_ALPHA_MIN: f64 = 0.06;
/// Extra line opacity as a pair closes from the cutoff to zero distance
pub const LINK_ALPHA_RANGE: f64 = 0.16;

/// A line to draw between two particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub from: DVec2,
    pub to: DVec2,
    pub distance: f64,
    pub alpha: f64,
}

/// Line opacity for a pair at `distance`, or None if the pair is too far apart
pub fn link_alpha(distance: f64) -> Option<f64> {
    if distance < LINK_DISTANCE {
        let closeness = 1.0 - distance / LINK_DISTANCE;
        Some(LINK_ALPHA_MIN + closeness * LINK_ALPHA_RANGE)
    } else {
        None
    }
}

/// Fixed-size set of particles living on a surface of `bounds` logical pixels
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: DVec2,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field from explicit particles (mostly useful for tests)
    pub fn from_particles(particles: Vec<Particle>, bounds: DVec2) -> Self {
        Self { particles, bounds }
    }

    /// Drop the current batch and generate [`PARTICLE_COUNT`] fresh particles
    /// uniformly over the new bounds.
    pub fn reseed<R: Rng>(&mut self, bounds: DVec2, rng: &mut R) {
        let bounds = bounds.max(DVec2::ZERO);
        self.bounds = bounds;
        self.particles = (0..PARTICLE_COUNT)
            .map(|_| Particle::random(rng, bounds))
            .collect();

        debug!(
            width = bounds.x,
            height = bounds.y,
            count = self.particles.len(),
            "Particle field reseeded"
        );
    }

    /// Advance every particle by one frame
    pub fn step(&mut self, pointer: DVec2) {
        let bounds = self.bounds;
        for particle in &mut self.particles {
            particle.step(pointer, bounds);
        }
    }

    /// All links for the current frame.
    ///
    /// Plain pass over every unordered pair (i < j); at 90 particles that is
    /// 4005 distance checks per frame.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        let particles = &self.particles;
        particles.iter().enumerate().flat_map(move |(i, a)| {
            particles[i + 1..].iter().filter_map(move |b| {
                let distance = a.position.distance(b.position);
                link_alpha(distance).map(|alpha| Link {
                    from: a.position,
                    to: b.position,
                    distance,
                    alpha,
                })
            })
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> DVec2 {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Mean speed in pixels per frame
    pub fn mean_speed(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        let total: f64 = self.particles.iter().map(|p| p.velocity.length()).sum();
        let mean = total / self.particles.len() as f64;
        trace!(mean, "Mean particle speed");
        mean
    }
}
