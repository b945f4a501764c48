use std::sync::Arc;

use async_trait::async_trait;

use crate::client::Transport;
use crate::gateway::Middleware;
use crate::protocol::{ApiRequest, ApiResponse};
use crate::Result;

pub(crate) struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Middleware for Dispatcher {
    async fn apply(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }
}
