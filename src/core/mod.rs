//! Platform-agnostic core - shared between the browser host, the native viewer and the CLI

pub mod clock;
pub mod field;
pub mod particle;
pub mod pointer;
pub mod render;
pub mod simulator;

pub use clock::{FrameClock, FrameId, ManualClock};
pub use field::{link_alpha, Link, ParticleField, LINK_DISTANCE, PARTICLE_COUNT};
pub use particle::{Particle, MOUSE_INFLUENCE_RADIUS, WRAP_MARGIN};
pub use pointer::{PointerTracker, POINTER_FAR_AWAY};
pub use render::{render_frame, DrawOp, FrameStats, RecordingSurface, Surface};
pub use simulator::{raster_size, FieldSimulator, FieldSnapshot};
