use std::fmt;

use serde::Serialize;

use crate::core::Credential;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    // application/x-www-form-urlencoded, order preserved.
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

/// A request against the backend api, path relative to the api base url.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    bearer: Option<Credential>,
    body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        ApiRequest::new(Method::Delete, path)
    }

    pub fn post_form<K, V>(path: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        ApiRequest::new(Method::Post, path).with_body(Body::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn json<T: Serialize + ?Sized>(
        method: Method,
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self> {
        Ok(ApiRequest::new(method, path).with_body(Body::Json(serde_json::to_value(body)?)))
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_bearer(mut self, token: Credential) -> Self {
        self.bearer = Some(token);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bearer(&self) -> Option<&Credential> {
        self.bearer.as_ref()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}
