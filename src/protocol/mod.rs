//! Wire types exchanged with the backend REST api.

mod request;
pub use request::{ApiRequest, Body, Method};

mod response;
pub use response::ApiResponse;

pub mod message;

/// Path prefix shared by the backend's authentication endpoints.
pub const AUTH_PATH: &str = "/auth";
/// Token issuance endpoint.
pub const AUTH_TOKEN_PATH: &str = "/auth/token";
/// Current user endpoint.
pub const AUTH_ME_PATH: &str = "/auth/me";
