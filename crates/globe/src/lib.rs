//! Interactive globe controller: auto-rotation, interaction pauses and marker
//! click choreography over an abstract map handle.

pub mod camera;
pub mod choreography;
pub mod config;
pub mod controller;
pub mod interaction;
pub mod map;
pub mod recording;
pub mod spin;

pub use camera::{CameraEase, CameraPose, Easing, MoveOrigin};
pub use choreography::{Phase, PhaseQueue};
pub use config::{ConfigError, GlobeConfig, MapOptions, RenderConfig, SpinConfig, TimingConfig};
pub use controller::GlobeController;
pub use interaction::{Deferred, GlobeMode, InteractionEvent, InteractionState, Step};
pub use map::MapHandle;
pub use recording::{MapCommand, RecordingMap};
pub use spin::{SpinLoop, rotation_delta};
