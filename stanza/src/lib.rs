pub use stanza_core::model::{PeerId, RoomId, SignalingState};
pub use stanza_core::{ClientConfig, ConfigError};

pub mod model {
    pub use stanza_core::model::*;
}

pub mod machine {
    pub use stanza_core::machine::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use stanza_client::*;
}
