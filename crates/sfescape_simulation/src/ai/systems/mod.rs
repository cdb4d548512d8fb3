//! AI systems (enemy FSM в ECS)

pub mod audio;
pub mod driver;
pub mod fsm;
pub mod hazards;
pub mod movement;
pub mod perception;
pub mod power;
pub mod reactions;

pub use audio::*;
pub use driver::*;
pub use fsm::*;
pub use hazards::*;
pub use movement::*;
pub use perception::*;
pub use power::*;
pub use reactions::*;
