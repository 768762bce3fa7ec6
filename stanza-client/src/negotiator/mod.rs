mod error;
mod negotiator;
mod rtc;

pub use error::*;
pub use negotiator::*;
pub use rtc::*;
