use foundation::geo::LngLat;
use serde::{Deserialize, Serialize};

/// Full camera state, as read back from the map.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    pub center: LngLat,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInOutQuad,
}

impl Easing {
    /// Maps progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// An animated camera move. `zoom: None` keeps the current zoom.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraEase {
    pub center: LngLat,
    pub zoom: Option<f64>,
    pub duration_ms: f64,
    pub easing: Easing,
    /// Played even when the user prefers reduced motion.
    pub essential: bool,
}

/// Who started a camera movement. Reported back with the matching move-end.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveOrigin {
    /// Dragging, scrolling, fit-bounds and anything else not started by the controller.
    User,
    Spin,
    Focus,
}

#[cfg(test)]
mod tests {
    use super::Easing;

    #[test]
    fn ease_in_out_quad_is_symmetric() {
        let e = Easing::EaseInOutQuad;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(0.5), 0.5);
        assert_eq!(e.apply(1.0), 1.0);
        assert_eq!(e.apply(0.25), 0.125);
        assert!((e.apply(0.75) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn linear_clamps() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(0.3), 0.3);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }
}
