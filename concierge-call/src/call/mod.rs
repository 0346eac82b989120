mod call_command;
mod call_event;
mod call_state;
mod engine;

pub use call_command::*;
pub use call_event::*;
pub use call_state::*;
pub use engine::*;
