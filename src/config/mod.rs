mod initialize;
pub use initialize::{Context, Initializer};

mod config;
pub use config::{ClientConfig, Config, SessionConfig};

pub mod env {
    pub const LOG_DIRECTIVE: &str = "INVCTL_LOG";
}

pub(crate) mod filepath {
    pub const SESSION_FILE: &str = "session.json";
}
