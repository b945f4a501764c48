use async_trait::async_trait;

use crate::protocol::{ApiRequest, ApiResponse};
use crate::Result;

#[async_trait]
pub(crate) trait Middleware: Send + Sync {
    async fn apply(&self, request: ApiRequest) -> Result<ApiResponse>;
}
