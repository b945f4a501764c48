use std::sync::Arc;

use crate::client::Transport;
use crate::core::SessionStore;
use crate::gateway::{Authenticator, Authorizer, Dispatcher, ForcingPolicy, Logger, Middleware};
use crate::navigation::Navigator;
use crate::protocol::{ApiRequest, ApiResponse};
use crate::Result;

pub(crate) struct MiddlewareChain {
    root: Logger<Authenticator<Authorizer<Dispatcher>>>,
}

impl MiddlewareChain {
    pub(crate) fn new(
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        policy: ForcingPolicy,
    ) -> Self {
        let dispatcher = Dispatcher::new(transport);

        let authorizer = Authorizer::new(session.clone(), navigator, policy, dispatcher);

        let authenticator = Authenticator::new(session, authorizer);

        let logger = Logger::new(authenticator);

        Self { root: logger }
    }

    pub(crate) async fn apply(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.root.apply(request).await
    }
}
