/// Time primitives
///
/// Timestamps are milliseconds on the host's monotonic timeline (the same basis as
/// animation-frame callbacks), so frames and timers can be compared directly.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Millis(pub f64);

impl Millis {
    pub const ZERO: Millis = Millis(0.0);

    /// The timestamp `delay_ms` after `self`.
    pub fn after(self, delay_ms: f64) -> Self {
        Millis(self.0 + delay_ms)
    }

    /// Milliseconds elapsed since `earlier` (negative if `earlier` is later).
    pub fn since(self, earlier: Millis) -> f64 {
        self.0 - earlier.0
    }
}
