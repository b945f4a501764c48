use std::time::Duration;

use async_trait::async_trait;

use crate::client::Transport;
use crate::common::{trace, ErrorKind};
use crate::protocol::{ApiRequest, ApiResponse, Body, Method};
use crate::Result;

/// [`Transport`] over http(s) backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the api rooted at `base_url`,
    /// e.g. `http://localhost:8000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        HttpTransport::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        HttpTransport::with_client(builder.build()?, base_url)
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if let Err(err) = reqwest::Url::parse(&base_url) {
            return Err(crate::error::InternalError::from(ErrorKind::InvalidUrl {
                url: base_url,
                description: err.to_string(),
            })
            .into());
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, self.url(request.path()));
        if let Some(token) = request.bearer() {
            builder = builder.bearer_auth(token.expose());
        }
        builder = match request.body() {
            Body::Empty => builder,
            Body::Form(fields) => builder.form(fields),
            Body::Json(value) => builder.json(value),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        trace!(status, len = bytes.len(), "Response received");

        Ok(ApiResponse::from_bytes(status, &bytes))
    }
}
