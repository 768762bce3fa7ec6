mod call_machine;
mod input;

pub use call_machine::*;
pub use input::*;
