//! Neon violet/indigo palette
//!
//! Platform-neutral RGBA colors. Hosts convert them to whatever their
//! drawing API wants (CSS strings for canvas, `Color32` for egui).

use std::fmt;

/// Straight (non-premultiplied) RGBA color, alpha in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Same hue, different opacity
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation of every channel, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Alpha as a byte, for hosts with 8-bit color
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// CSS `rgba(...)` string for the canvas 2D API
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

pub mod colors {
    use super::Rgba;

    // === Background ===
    pub const BG_PRIMARY: Rgba = Rgba::new(2, 6, 23, 1.0);         // #020617 - slate-950

    // === Field ===
    pub const LINK: Rgba = Rgba::new(99, 102, 241, 1.0);           // #6366F1 - indigo-500
    pub const DOT: Rgba = Rgba::new(167, 139, 250, 1.0);           // #A78BFA - violet-400

    // === Ambient haze ===
    pub const HAZE_INDIGO: Rgba = Rgba::new(99, 102, 241, 0.10);
    pub const HAZE_PURPLE: Rgba = Rgba::new(168, 85, 247, 0.06);   // #A855F7 - purple-500
    pub const HAZE_CLEAR: Rgba = Rgba::new(2, 6, 23, 0.0);
    pub const GLOW_PURPLE: Rgba = Rgba::new(168, 85, 247, 0.12);
    pub const GLOW_CLEAR: Rgba = Rgba::new(168, 85, 247, 0.0);

    // === Text (viewer header) ===
    pub const TEXT_SECONDARY: Rgba = Rgba::new(160, 160, 160, 1.0);
    pub const TEXT_MUTED: Rgba = Rgba::new(80, 80, 80, 1.0);
}
