pub mod call;
pub mod negotiator;
pub mod signaling;

pub use call::*;
pub use negotiator::*;
pub use signaling::*;
