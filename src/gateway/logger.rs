use async_trait::async_trait;
use tokio::time::Instant;

use crate::common::{info, warn};
use crate::gateway::Middleware;
use crate::protocol::{ApiRequest, ApiResponse};
use crate::Result;

pub(crate) struct Logger<MW> {
    next: MW,
}

impl<MW> Logger<MW> {
    pub(crate) fn new(next: MW) -> Self {
        Self { next }
    }
}

#[async_trait]
impl<MW> Middleware for Logger<MW>
where
    MW: Middleware + 'static,
{
    async fn apply(&self, request: ApiRequest) -> Result<ApiResponse> {
        let start = Instant::now();
        let method = request.method();
        let path = request.path().to_owned();

        let result = self.next.apply(request).await;

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                info!(%method, %path, status = response.status(), elapsed_ms = elapsed, "Request done")
            }
            Err(err) => {
                warn!(%method, %path, status = ?err.status(), elapsed_ms = elapsed, "Request failed: {}", err)
            }
        }

        result
    }
}
