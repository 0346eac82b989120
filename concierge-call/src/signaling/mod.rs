mod channel;
mod channel_event;
mod retry_policy;
mod signaling_output;

pub use channel::*;
pub use channel_event::*;
pub use retry_policy::*;
pub use signaling_output::*;
