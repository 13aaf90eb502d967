pub mod frame;
pub mod timers;

pub use frame::*;
pub use timers::*;
