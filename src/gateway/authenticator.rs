use std::sync::Arc;

use async_trait::async_trait;

use crate::common::trace;
use crate::core::SessionStore;
use crate::gateway::Middleware;
use crate::protocol::{ApiRequest, ApiResponse};
use crate::Result;

/// Attaches the session's bearer token to outgoing requests.
pub(crate) struct Authenticator<MW> {
    session: Arc<SessionStore>,
    next: MW,
}

impl<MW> Authenticator<MW> {
    pub(crate) fn new(session: Arc<SessionStore>, next: MW) -> Self {
        Self { session, next }
    }
}

#[async_trait]
impl<MW> Middleware for Authenticator<MW>
where
    MW: Middleware + 'static,
{
    async fn apply(&self, request: ApiRequest) -> Result<ApiResponse> {
        // An explicit bearer wins; without any token the request goes out as is.
        let request = match (request.bearer(), self.session.token()) {
            (None, Some(token)) => {
                trace!(path = request.path(), "Attach bearer token");
                request.with_bearer(token)
            }
            _ => request,
        };
        self.next.apply(request).await
    }
}
