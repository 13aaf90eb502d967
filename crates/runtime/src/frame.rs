use foundation::time::Millis;

/// Handle for one outstanding animation-frame request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// A source of animation-frame callbacks (`requestAnimationFrame` in a browser).
///
/// Implementations only bookkeep requests; the host delivers the callback by
/// calling back into whoever requested the frame.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Frame scheduler for tests and offline simulation.
///
/// Tracks at most one outstanding request, like a render loop that re-requests
/// itself every frame.
#[derive(Debug, Default, Clone)]
pub struct ManualFrames {
    next: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn requested_count(&self) -> u64 {
        self.requested
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next);
        self.next = self.next.wrapping_add(1);
        self.pending = Some(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Admits a frame only when strictly more than `min_interval_ms` passed since the
/// last admitted one, independent of the display refresh rate.
///
/// The first observed frame only establishes the baseline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameThrottle {
    min_interval_ms: f64,
    last: Option<Millis>,
}

impl FrameThrottle {
    pub fn new(min_interval_ms: f64) -> Self {
        Self {
            min_interval_ms,
            last: None,
        }
    }

    pub fn admit(&mut self, now: Millis) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            return false;
        };
        if now.since(last) > self.min_interval_ms {
            self.last = Some(now);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameScheduler, FrameThrottle, ManualFrames};
    use foundation::time::Millis;

    #[test]
    fn throttle_admits_roughly_25_per_second_at_60hz() {
        let mut throttle = FrameThrottle::new(40.0);
        let admitted = (0..=60)
            .map(|i| Millis(i as f64 * 1000.0 / 60.0))
            .filter(|t| throttle.admit(*t))
            .count();
        // 60 Hz frames are 16.7 ms apart, so every third frame (50 ms) passes.
        assert_eq!(admitted, 20);
    }

    #[test]
    fn throttle_interval_is_strict() {
        let mut throttle = FrameThrottle::new(40.0);
        assert!(!throttle.admit(Millis(0.0)));
        assert!(!throttle.admit(Millis(40.0)));
        assert!(throttle.admit(Millis(40.5)));
        throttle.reset();
        assert!(!throttle.admit(Millis(100.0)));
    }

    #[test]
    fn manual_frames_track_one_outstanding_request() {
        let mut frames = ManualFrames::new();
        let a = frames.request_frame();
        let b = frames.request_frame();
        assert_ne!(a, b);
        assert_eq!(frames.pending(), Some(b));
        frames.cancel_frame(a);
        assert_eq!(frames.pending(), Some(b));
        frames.cancel_frame(b);
        assert_eq!(frames.pending(), None);
        assert_eq!(frames.requested_count(), 2);
        assert_eq!(frames.cancelled_count(), 1);
    }
}
