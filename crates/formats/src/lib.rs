pub mod geojson;
pub mod region;

pub use geojson::*;
pub use region::*;
