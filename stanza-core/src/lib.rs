pub mod config;
pub mod error;
pub mod machine;
pub mod model;

pub use config::*;
pub use error::*;
pub use machine::*;
pub use model::*;
