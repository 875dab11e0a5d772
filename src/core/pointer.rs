//! Pointer position as seen by the field

use glam::DVec2;
use tracing::trace;

/// Stand-in position while the pointer is outside the tracked region.
/// Far enough from any surface that the attraction gate never opens.
pub const POINTER_FAR_AWAY: DVec2 = DVec2::new(-9999.0, -9999.0);

/// Last known pointer position in surface-local coordinates.
///
/// Listeners overwrite it, the frame step reads it; last writer wins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerTracker {
    position: DVec2,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            position: POINTER_FAR_AWAY,
        }
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move given window (client) coordinates and the surface's
    /// top-left corner in the same space.
    pub fn move_to(&mut self, client: DVec2, surface_origin: DVec2) {
        self.position = client - surface_origin;
        trace!(x = self.position.x, y = self.position.y, "Pointer moved");
    }

    /// Pointer left the window
    pub fn leave(&mut self) {
        self.position = POINTER_FAR_AWAY;
        trace!("Pointer left");
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn is_tracking(&self) -> bool {
        self.position != POINTER_FAR_AWAY
    }
}
