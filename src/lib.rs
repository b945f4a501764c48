#![allow(clippy::module_inception)]

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod protocol;
pub mod storage;

pub use crate::error::InvctlError;
pub type Result<T, E = crate::error::InvctlError> = std::result::Result<T, E>;

pub use crate::core::{Credential, Role, Session, SessionState, SessionStore, UserProfile};
pub use crate::gateway::{ForcingPolicy, Gateway};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub(crate) type Time = chrono::DateTime<chrono::Utc>;

    pub use tracing::{debug, error, info, trace, warn};
}
