// Process killer module

mod policy;
pub mod signals;

pub use policy::should_terminate;
pub use signals::{KillCommand, Terminator};
