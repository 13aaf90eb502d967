use foundation::bounds::LngLatBounds;
use layers::LayerSpec;
use serde_json::Value;

use crate::camera::{CameraEase, CameraPose, MoveOrigin};

/// The map library as seen by the controller.
///
/// Camera calls start movements; the host reports their end back through
/// `GlobeController::on_move_end` together with the origin passed here.
pub trait MapHandle {
    fn camera(&self) -> CameraPose;

    /// Instant move; also interrupts any running animation.
    fn jump_to(&mut self, pose: &CameraPose);

    fn ease_to(&mut self, ease: &CameraEase, origin: MoveOrigin);

    fn fly_to(&mut self, ease: &CameraEase, origin: MoveOrigin);

    fn add_source(&mut self, id: &str, data: &Value);

    fn set_source_data(&mut self, id: &str, data: &Value);

    fn add_layer(&mut self, layer: &LayerSpec);

    fn fit_bounds(&mut self, bounds: &LngLatBounds, padding_px: f64);

    /// `""` restores the default cursor.
    fn set_cursor(&mut self, cursor: &str);

    /// Tears down the map. No other method is called afterwards.
    fn remove(&mut self);
}
