//! Particle field simulator - lifecycle around the field
//!
//! Owns everything one mounted instance needs: the drawing surface, the
//! frame clock, the random source, the particle field and pointer state.
//! Hosts feed it window events and frame callbacks; it never reaches for
//! globals, so any number of instances can run side by side.
//!
//! All entry points take `&mut self`. Browser hosts share one instance
//! between the animation-frame callback and event listeners through
//! `Rc<RefCell<_>>`, which is only sound because both run on the same
//! single-threaded event loop. A multi-threaded host must put the
//! simulator behind a lock instead.

use glam::DVec2;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use super::clock::{FrameClock, ManualClock};
use super::field::ParticleField;
use super::particle::Particle;
use super::pointer::PointerTracker;
use super::render::{render_frame, FrameStats, Surface};

/// Pixel-ratio clamp applied when sizing the backing raster
pub const MIN_PIXEL_RATIO: f64 = 1.0;
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Raster size for a logical box at a given pixel ratio.
///
/// The ratio is clamped to [1, 2]; each axis is floored.
pub fn raster_size(logical: DVec2, pixel_ratio: f64) -> (u32, u32, f64) {
    let ratio = clamp_pixel_ratio(pixel_ratio);
    let raster = (logical.max(DVec2::ZERO) * ratio).floor();
    (raster.x as u32, raster.y as u32, ratio)
}

fn clamp_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.clamp(MIN_PIXEL_RATIO, MAX_PIXEL_RATIO)
    } else {
        MIN_PIXEL_RATIO
    }
}

/// Serializable view of one simulator instance
#[derive(Clone, Debug, Serialize)]
pub struct FieldSnapshot {
    pub frame: u64,
    pub width: f64,
    pub height: f64,
    pub pointer: DVec2,
    pub particles: Vec<Particle>,
}

/// One mounted particle-field instance
pub struct FieldSimulator<S: Surface, C: FrameClock, R: Rng> {
    surface: S,
    clock: C,
    rng: R,
    field: ParticleField,
    pointer: PointerTracker,
    pending: Option<C::Handle>,
    mounted: bool,
    frames: u64,
    last_stats: FrameStats,
}

impl<S: Surface, C: FrameClock, R: Rng> FieldSimulator<S, C, R> {
    /// Start a simulator on an acquired surface.
    ///
    /// A missing surface (the host could not create a drawing context) is
    /// not an error: nothing is created, no frame is scheduled and None is
    /// returned.
    pub fn mount(surface: Option<S>, clock: C, rng: R) -> Option<Self> {
        let Some(surface) = surface else {
            debug!("No drawing surface available, particle field not started");
            return None;
        };

        let mut sim = Self {
            surface,
            clock,
            rng,
            field: ParticleField::new(),
            pointer: PointerTracker::new(),
            pending: None,
            mounted: true,
            frames: 0,
            last_stats: FrameStats::default(),
        };
        sim.initialize();
        sim.schedule();

        debug!(particles = sim.field.len(), "Particle field mounted");
        Some(sim)
    }

    /// Size the raster to the surface and regenerate every particle.
    fn initialize(&mut self) {
        let logical = self.surface.logical_size();
        let (width, height, scale) = raster_size(logical, self.surface.pixel_ratio());
        self.surface.configure(width, height, scale);
        self.field.reseed(logical, &mut self.rng);

        debug!(
            logical_width = logical.x,
            logical_height = logical.y,
            raster_width = width,
            raster_height = height,
            scale,
            "Surface configured"
        );
    }

    fn schedule(&mut self) {
        self.pending = self.clock.request_frame();
        if self.pending.is_none() {
            debug!(frame = self.frames, "Host refused to schedule a frame, loop stopped");
        }
    }

    /// Window resize: new raster, new particles. Prior state is dropped.
    pub fn resize(&mut self) {
        if !self.mounted {
            return;
        }
        self.initialize();
    }

    /// Pointer moved; `client` and `surface_origin` share one coordinate space
    pub fn pointer_moved(&mut self, client: DVec2, surface_origin: DVec2) {
        if !self.mounted {
            return;
        }
        self.pointer.move_to(client, surface_origin);
    }

    pub fn pointer_left(&mut self) {
        if !self.mounted {
            return;
        }
        self.pointer.leave();
    }

    /// Frame callback: update, render, schedule the next frame.
    pub fn on_frame(&mut self) {
        if !self.mounted {
            return;
        }
        self.pending = None;

        self.field.step(self.pointer.position());
        self.last_stats = render_frame(&self.field, &mut self.surface);
        self.frames += 1;

        trace!(frame = self.frames, links = self.last_stats.links, "Frame done");
        self.schedule();
    }

    /// Teardown: cancel the pending frame and ignore everything afterwards
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Some(handle) = self.pending.take() {
            self.clock.cancel_frame(handle);
        }
        debug!(frames = self.frames, "Particle field unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Frames rendered since mount
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn pending_frame(&self) -> Option<C::Handle> {
        self.pending
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Direct access to particles, for hosts and tests that place them
    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        let bounds = self.field.bounds();
        FieldSnapshot {
            frame: self.frames,
            width: bounds.x,
            height: bounds.y,
            pointer: self.pointer.position(),
            particles: self.field.particles().to_vec(),
        }
    }
}

impl<S: Surface, R: Rng> FieldSimulator<S, ManualClock, R> {
    /// Fire the pending frame, if any. Returns whether a frame ran.
    pub fn advance(&mut self) -> bool {
        if self.clock.take_pending().is_none() {
            return false;
        }
        self.on_frame();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::PARTICLE_COUNT;
    use crate::core::particle::WRAP_MARGIN;
    use crate::core::pointer::POINTER_FAR_AWAY;
    use crate::core::render::RecordingSurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestSim = FieldSimulator<RecordingSurface, ManualClock, StdRng>;

    fn mount(size: DVec2, ratio: f64) -> TestSim {
        FieldSimulator::mount(
            Some(RecordingSurface::new(size, ratio)),
            ManualClock::new(),
            StdRng::seed_from_u64(42),
        )
        .expect("surface given")
    }

    fn only_particle(sim: &mut TestSim, position: DVec2, velocity: DVec2) {
        let bounds = sim.field().bounds();
        *sim.field_mut() =
            ParticleField::from_particles(vec![Particle::new(position, velocity, 2.0, 0.2)], bounds);
    }

    #[test]
    fn missing_surface_is_a_silent_no_op() {
        let sim: Option<TestSim> =
            FieldSimulator::mount(None, ManualClock::new(), StdRng::seed_from_u64(1));
        assert!(sim.is_none());
    }

    #[test]
    fn mount_creates_full_batch_and_schedules_frame() {
        let sim = mount(DVec2::new(800.0, 600.0), 1.0);
        assert_eq!(sim.field().len(), PARTICLE_COUNT);
        assert!(sim.pending_frame().is_some());
        assert_eq!(sim.clock().requested(), 1);
        assert_eq!(sim.frames(), 0);
    }

    #[test]
    fn mount_on_empty_surface_still_has_full_batch() {
        let sim = mount(DVec2::ZERO, 1.0);
        assert_eq!(sim.field().len(), PARTICLE_COUNT);
        assert_eq!(sim.surface().raster(), (0, 0));
    }

    #[test]
    fn raster_scales_by_clamped_ratio() {
        assert_eq!(raster_size(DVec2::new(300.5, 200.2), 1.5), (450, 300, 1.5));
        assert_eq!(raster_size(DVec2::new(100.0, 50.0), 3.0), (200, 100, 2.0));
        assert_eq!(raster_size(DVec2::new(100.0, 50.0), 0.5), (100, 50, 1.0));
        assert_eq!(raster_size(DVec2::new(100.0, 50.0), f64::NAN), (100, 50, 1.0));

        let sim = mount(DVec2::new(640.0, 480.0), 3.0);
        assert_eq!(sim.surface().raster(), (1280, 960));
        assert_eq!(sim.surface().scale(), 2.0);
    }

    #[test]
    fn each_frame_updates_renders_and_reschedules() {
        let mut sim = mount(DVec2::new(800.0, 600.0), 1.0);
        for expected in 1..=5 {
            assert!(sim.advance());
            assert_eq!(sim.frames(), expected);
            assert!(sim.pending_frame().is_some());
        }
        assert_eq!(sim.surface().frames_drawn(), 5);
        assert_eq!(sim.surface().circle_count(), PARTICLE_COUNT);
        assert_eq!(sim.surface().line_count(), sim.last_stats().links);
    }

    #[test]
    fn no_frame_runs_without_a_pending_request() {
        let mut sim = mount(DVec2::new(800.0, 600.0), 1.0);
        sim.clock_mut().take_pending();
        assert!(!sim.advance());
        assert_eq!(sim.frames(), 0);
    }

    #[test]
    fn resize_regenerates_for_new_bounds() {
        let mut sim = mount(DVec2::new(100.0, 100.0), 1.0);
        for _ in 0..20 {
            sim.advance();
        }
        let before: Vec<DVec2> = sim.field().particles().iter().map(|p| p.position).collect();

        let bigger = DVec2::new(1920.0, 1080.0);
        sim.surface_mut().set_logical_size(bigger);
        sim.resize();

        assert_eq!(sim.field().len(), PARTICLE_COUNT);
        assert_eq!(sim.field().bounds(), bigger);
        assert_eq!(sim.surface().raster(), (1920, 1080));
        let after: Vec<DVec2> = sim.field().particles().iter().map(|p| p.position).collect();
        assert!(before.iter().zip(&after).all(|(a, b)| a != b));
        assert!(after.iter().all(|p| p.x >= 0.0 && p.x < bigger.x && p.y >= 0.0 && p.y < bigger.y));
        assert!(after.iter().any(|p| p.x > 150.0 || p.y > 150.0));
    }

    #[test]
    fn pointer_events_drive_attraction() {
        let mut sim = mount(DVec2::new(800.0, 600.0), 1.0);
        only_particle(&mut sim, DVec2::new(100.0, 100.0), DVec2::ZERO);

        // Pointer 50px right of the particle, surface offset by (10, 20)
        sim.pointer_moved(DVec2::new(160.0, 120.0), DVec2::new(10.0, 20.0));
        assert_eq!(sim.pointer().position(), DVec2::new(150.0, 100.0));
        sim.advance();
        let v = sim.field().particles()[0].velocity;
        assert!(v.x > 0.0);
        assert_eq!(v.y, 0.0);

        sim.pointer_left();
        assert_eq!(sim.pointer().position(), POINTER_FAR_AWAY);
        sim.advance();
        assert_eq!(sim.field().particles()[0].velocity, v);
    }

    #[test]
    fn integration_is_plain_euler_with_pointer_away() {
        let mut sim = mount(DVec2::new(800.0, 600.0), 1.0);
        let start = DVec2::new(300.0, 200.0);
        let velocity = DVec2::new(0.2, -0.1);
        only_particle(&mut sim, start, velocity);

        for _ in 0..250 {
            sim.advance();
        }
        let p = sim.field().particles()[0];
        assert_eq!(p.velocity, velocity);
        assert!((p.position - (start + velocity * 250.0)).length() < 1e-9);
    }

    #[test]
    fn particle_wraps_across_the_surface() {
        let mut sim = mount(DVec2::new(800.0, 600.0), 1.0);
        only_particle(&mut sim, DVec2::new(800.0 + 25.0, 300.0), DVec2::new(0.25, 0.0));
        sim.advance();
        assert_eq!(sim.field().particles()[0].position.x, -WRAP_MARGIN);
    }

    #[test]
    fn unmount_stops_frames_and_ignores_events() {
        let mut sim = mount(DVec2::new(800.0, 600.0), 1.0);
        sim.advance();
        sim.advance();
        let pending = sim.pending_frame();
        assert!(pending.is_some());

        sim.unmount();
        assert!(!sim.is_mounted());
        assert_eq!(sim.pending_frame(), None);
        assert_eq!(sim.clock().pending(), None);
        assert_eq!(sim.clock().cancelled(), 1);

        let frames = sim.frames();
        let positions: Vec<DVec2> = sim.field().particles().iter().map(|p| p.position).collect();
        let pointer = *sim.pointer();

        // A stray callback or late events must not change anything
        assert!(!sim.advance());
        sim.on_frame();
        sim.surface_mut().set_logical_size(DVec2::new(50.0, 50.0));
        sim.resize();
        sim.pointer_moved(DVec2::new(10.0, 10.0), DVec2::ZERO);
        sim.pointer_left();

        assert_eq!(sim.frames(), frames);
        assert_eq!(sim.field().bounds(), DVec2::new(800.0, 600.0));
        let after: Vec<DVec2> = sim.field().particles().iter().map(|p| p.position).collect();
        assert_eq!(positions, after);
        assert_eq!(*sim.pointer(), pointer);
        assert_eq!(sim.clock().requested(), 3);
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut a = mount(DVec2::new(400.0, 300.0), 1.0);
        let b = mount(DVec2::new(400.0, 300.0), 1.0);
        a.pointer_moved(DVec2::new(5.0, 5.0), DVec2::ZERO);
        a.advance();
        assert_eq!(b.pointer().position(), POINTER_FAR_AWAY);
        assert_eq!(b.frames(), 0);
    }

    #[test]
    fn snapshot_serializes_particles() {
        let mut sim = mount(DVec2::new(400.0, 300.0), 1.0);
        sim.advance();
        let json = serde_json::to_value(sim.snapshot()).expect("serializable");
        assert_eq!(json["frame"], 1);
        assert_eq!(json["width"], 400.0);
        assert_eq!(json["particles"].as_array().map(Vec::len), Some(PARTICLE_COUNT));
        assert!(json["particles"][0]["radius"].is_number());
    }
}
