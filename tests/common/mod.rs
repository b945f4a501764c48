#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use invctl::config::{Config, Context, Initializer};
use invctl::storage::TokenStorage;

pub const API_PREFIX: &str = "/api/v1";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn api_path(p: &str) -> String {
    format!("{}{}", API_PREFIX, p)
}

pub fn profile(id: i64, username: &str, role: &str) -> Value {
    json!({"id": id, "username": username, "role": role, "is_active": true})
}

/// Token endpoint issuing `token` for `username`.
pub async fn mount_token(server: &MockServer, username: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(api_path("/auth/token")))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains(format!("username={}", username)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": token, "token_type": "bearer"})),
        )
        .mount(server)
        .await;
}

/// Current user endpoint answering `user` for `token`.
pub async fn mount_me(server: &MockServer, token: &str, user: Value) {
    mount_me_with(server, token, ResponseTemplate::new(200).set_body_json(user)).await;
}

pub async fn mount_me_with(server: &MockServer, token: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(api_path("/auth/me")))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"}))
}

/// Build a context talking to `server`, persisting into `storage`, on `page`.
pub async fn context(server: &MockServer, storage: Arc<dyn TokenStorage>, page: &str) -> Context {
    context_with(server, Config::default(), storage, page).await
}

/// Like [`context`], on top of `config`.
pub async fn context_with(
    server: &MockServer,
    mut config: Config,
    storage: Arc<dyn TokenStorage>,
    page: &str,
) -> Context {
    config
        .client
        .set_base_url(&mut Some(format!("{}{}", server.uri(), API_PREFIX)));

    let mut initializer = Initializer::from_config(config);
    initializer.set_storage(storage);
    initializer.set_initial_page(page);
    initializer.build().await.unwrap()
}
