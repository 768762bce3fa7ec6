mod call_command;
mod controller;
mod error;
mod handle;
mod mailbox;
mod retry;
mod status;
mod worker;

pub use call_command::*;
pub use controller::*;
pub use error::*;
pub use handle::*;
pub use mailbox::*;
pub use retry::*;
pub use status::*;
pub use worker::*;
