use async_trait::async_trait;

use crate::protocol::{ApiRequest, ApiResponse};
use crate::Result;

pub mod http;

/// Sends requests to the backend.
///
/// Implementations only move bytes: any answer the backend gives, including
/// non-2xx ones, is returned as `Ok`. Authorization handling is left to the
/// session store and the gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
