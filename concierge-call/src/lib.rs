pub mod call;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod media;
pub mod signaling;
pub mod transport;

pub use call::{CallCommand, CallEvent, CallStatus, Notification, RosterUpdate, Severity};
pub use client::{CallClient, CallHandle};
pub use config::CallConfig;
pub use controller::{CustomerController, OwnerController, Roster, RosterEntry};
pub use error::{CallError, DeviceError};
pub use media::{MediaSource, SyntheticMediaSource};
pub use signaling::{Registration, RetryPolicy};
