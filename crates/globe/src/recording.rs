use std::collections::BTreeMap;

use foundation::bounds::LngLatBounds;
use layers::LayerSpec;
use serde_json::Value;

use crate::camera::{CameraEase, CameraPose, MoveOrigin};
use crate::map::MapHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    JumpTo(CameraPose),
    EaseTo { ease: CameraEase, origin: MoveOrigin },
    FlyTo { ease: CameraEase, origin: MoveOrigin },
    AddSource(String),
    SetSourceData(String),
    AddLayer(String),
    FitBounds { bounds: LngLatBounds, padding_px: f64 },
    SetCursor(String),
    Remove,
}

/// In-memory [`MapHandle`] that logs every call.
///
/// Camera moves complete instantly: after `ease_to`/`fly_to` the camera sits at
/// the destination. No move-end events are generated; tests deliver them.
#[derive(Debug, Clone, Default)]
pub struct RecordingMap {
    camera: CameraPose,
    commands: Vec<MapCommand>,
    sources: BTreeMap<String, Value>,
    layers: Vec<LayerSpec>,
    cursor: String,
    removed: bool,
}

impl RecordingMap {
    pub fn new(camera: CameraPose) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Moves the camera without logging, like a user drag would.
    pub fn set_camera(&mut self, camera: CameraPose) {
        self.camera = camera;
    }

    pub fn source(&self, id: &str) -> Option<&Value> {
        self.sources.get(id)
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id()).collect()
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn spin_steps(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MapCommand::EaseTo { origin: MoveOrigin::Spin, .. }))
            .count()
    }

    fn apply(&mut self, ease: &CameraEase) {
        self.camera.center = ease.center;
        if let Some(zoom) = ease.zoom {
            self.camera.zoom = zoom;
        }
    }
}

impl MapHandle for RecordingMap {
    fn camera(&self) -> CameraPose {
        self.camera
    }

    fn jump_to(&mut self, pose: &CameraPose) {
        self.camera = *pose;
        self.commands.push(MapCommand::JumpTo(*pose));
    }

    fn ease_to(&mut self, ease: &CameraEase, origin: MoveOrigin) {
        self.apply(ease);
        self.commands.push(MapCommand::EaseTo {
            ease: *ease,
            origin,
        });
    }

    fn fly_to(&mut self, ease: &CameraEase, origin: MoveOrigin) {
        self.apply(ease);
        self.commands.push(MapCommand::FlyTo {
            ease: *ease,
            origin,
        });
    }

    fn add_source(&mut self, id: &str, data: &Value) {
        self.sources.insert(id.to_string(), data.clone());
        self.commands.push(MapCommand::AddSource(id.to_string()));
    }

    fn set_source_data(&mut self, id: &str, data: &Value) {
        self.sources.insert(id.to_string(), data.clone());
        self.commands.push(MapCommand::SetSourceData(id.to_string()));
    }

    fn add_layer(&mut self, layer: &LayerSpec) {
        self.layers.push(layer.clone());
        self.commands.push(MapCommand::AddLayer(layer.id().to_string()));
    }

    fn fit_bounds(&mut self, bounds: &LngLatBounds, padding_px: f64) {
        self.commands.push(MapCommand::FitBounds {
            bounds: *bounds,
            padding_px,
        });
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.cursor = cursor.to_string();
        self.commands.push(MapCommand::SetCursor(cursor.to_string()));
    }

    fn remove(&mut self) {
        self.removed = true;
        self.commands.push(MapCommand::Remove);
    }
}
