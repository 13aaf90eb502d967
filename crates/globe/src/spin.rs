use foundation::time::Millis;
use runtime::frame::FrameThrottle;

use crate::camera::{CameraEase, Easing, MoveOrigin};
use crate::config::SpinConfig;
use crate::interaction::InteractionState;
use crate::map::MapHandle;

/// Longitude change per admitted frame at `zoom`, in degrees. Negative (the globe
/// turns west to east) or zero.
pub fn rotation_delta(zoom: f64, spin: &SpinConfig) -> f64 {
    if zoom >= spin.max_spin_zoom {
        return 0.0;
    }
    let mut speed = 360.0 / spin.seconds_per_revolution;
    if zoom > spin.slow_spin_zoom {
        speed *= (spin.max_spin_zoom - zoom) / (spin.max_spin_zoom - spin.slow_spin_zoom);
    }
    -speed / spin.increment_divisor
}

/// Throttled idle rotation.
#[derive(Debug, Clone)]
pub struct SpinLoop {
    throttle: FrameThrottle,
}

impl SpinLoop {
    pub fn new(spin: &SpinConfig) -> Self {
        Self {
            throttle: FrameThrottle::new(spin.frame_interval_ms),
        }
    }

    /// Runs one animation frame. Returns the longitude change issued, if any.
    pub fn tick<M: MapHandle>(
        &mut self,
        now: Millis,
        state: &InteractionState,
        map: &mut M,
        spin: &SpinConfig,
    ) -> Option<f64> {
        if !self.throttle.admit(now) {
            return None;
        }
        let camera = map.camera();
        if !state.can_rotate(now, camera.zoom, spin) {
            return None;
        }
        let delta = rotation_delta(camera.zoom, spin);
        if delta == 0.0 {
            return None;
        }

        let mut center = camera.center;
        center.lng += delta;
        map.ease_to(
            &CameraEase {
                center,
                zoom: None,
                duration_ms: spin.step_duration_ms,
                easing: Easing::Linear,
                essential: false,
            },
            MoveOrigin::Spin,
        );
        Some(delta)
    }

    /// Forgets the last admitted frame, so the next one only sets a new baseline.
    pub fn reset(&mut self) {
        self.throttle.reset();
    }
}
