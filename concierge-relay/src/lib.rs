mod config;
mod server;
mod signaling;

pub use config::*;
pub use server::*;
pub use signaling::*;
