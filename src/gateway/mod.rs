//! Every backend call other than the session's own auth requests goes
//! through the [`Gateway`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::Transport;
use crate::core::SessionStore;
use crate::navigation::Navigator;
use crate::protocol::{ApiRequest, ApiResponse, Method};
use crate::Result;

mod chain;
use self::chain::MiddlewareChain;

mod middleware;
use self::middleware::Middleware;

mod authenticator;
use self::authenticator::Authenticator;

mod authorizer;
use self::authorizer::Authorizer;
pub use self::authorizer::ForcingPolicy;

mod logger;
use self::logger::Logger;

mod dispatcher;
use self::dispatcher::Dispatcher;

pub struct Gateway {
    chain: MiddlewareChain,
}

impl Gateway {
    pub fn new(
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        policy: ForcingPolicy,
    ) -> Self {
        Self {
            chain: MiddlewareChain::new(session, transport, navigator, policy),
        }
    }

    /// Send `request`. Non-2xx answers come back as errors.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.chain.apply(request).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Post, path, body).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Put, path, body).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Patch, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::json(method, path, body)?;
        self.send(request).await?.json()
    }
}
