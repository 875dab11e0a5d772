//! Frame scheduling
//!
//! The simulator never talks to a real animation-frame API directly; it asks
//! an injected [`FrameClock`] for the next frame and cancels through it on
//! teardown. Browser hosts wrap `requestAnimationFrame`, everything else
//! (tests, the headless CLI, the native viewer) drives a [`ManualClock`].

use std::fmt;

use tracing::trace;

/// "Call me on the next frame" capability
pub trait FrameClock {
    type Handle: Copy + PartialEq + fmt::Debug;

    /// Schedule one frame callback. None if the host refused to schedule.
    fn request_frame(&mut self) -> Option<Self::Handle>;

    /// Cancel a previously scheduled callback
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Identifier of a frame scheduled on a [`ManualClock`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Clock that advances one logical frame per explicit call.
///
/// Holds at most one pending request, like an animation-frame loop that
/// schedules its successor from inside the callback.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    pending: Option<FrameId>,
    requested: u64,
    cancelled: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending frame, if any, so the caller can run it
    pub fn take_pending(&mut self) -> Option<FrameId> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Total frames requested so far
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total frames cancelled so far
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameClock for ManualClock {
    type Handle = FrameId;

    fn request_frame(&mut self) -> Option<FrameId> {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.pending = Some(id);
        trace!(id = id.0, "Frame requested");
        Some(id)
    }

    fn cancel_frame(&mut self, handle: FrameId) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
            trace!(id = handle.0, "Frame cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_take() {
        let mut clock = ManualClock::new();
        assert_eq!(clock.take_pending(), None);

        let id = clock.request_frame().expect("manual clock always schedules");
        assert_eq!(clock.pending(), Some(id));
        assert_eq!(clock.take_pending(), Some(id));
        assert_eq!(clock.take_pending(), None);
        assert_eq!(clock.requested(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let mut clock = ManualClock::new();
        let a = clock.request_frame();
        let b = clock.request_frame();
        assert_ne!(a, b);
        assert_eq!(clock.pending(), b);
    }

    #[test]
    fn cancel_only_hits_matching_handle() {
        let mut clock = ManualClock::new();
        let stale = clock.request_frame().expect("scheduled");
        let current = clock.request_frame().expect("scheduled");

        clock.cancel_frame(stale);
        assert_eq!(clock.pending(), Some(current));
        assert_eq!(clock.cancelled(), 0);

        clock.cancel_frame(current);
        assert_eq!(clock.pending(), None);
        assert_eq!(clock.cancelled(), 1);
    }
}
