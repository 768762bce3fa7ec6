mod channel;
mod error;
mod frame;
mod socket_io;

pub use channel::*;
pub use error::*;
pub use frame::*;
pub use socket_io::*;
