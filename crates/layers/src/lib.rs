pub mod layer;
pub mod symbology;
pub mod vector;

pub use layer::*;
pub use symbology::{ColorRamp, ColorStop, Rgb, health_ramp};
pub use vector::{CentroidPoint, DEFAULT_FEATURE_CAP, RenderSet, centroid, is_renderable};
