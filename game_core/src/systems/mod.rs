pub mod claw;
pub mod movement;
pub mod replay;
pub mod scoring;
pub mod sync;
pub mod timer;

pub use claw::*;
pub use movement::*;
pub use replay::*;
pub use scoring::*;
pub use sync::*;
pub use timer::*;
