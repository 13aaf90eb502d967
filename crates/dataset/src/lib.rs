pub mod fallback;
pub mod loader;
pub mod source;
pub mod tier;

pub use fallback::*;
pub use loader::*;
pub use source::*;
pub use tier::*;
