mod local_stream;
mod media_session;
mod media_source;
mod remote_stream;

pub use local_stream::*;
pub use media_session::*;
pub use media_source::*;
pub use remote_stream::*;
