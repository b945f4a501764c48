use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::client::Transport;
use crate::common::{debug, info, warn};
use crate::core::{Credential, Epoch, Password, Session, UserProfile};
use crate::protocol::message::{self, TokenResponse};
use crate::protocol::{ApiRequest, ApiResponse, AUTH_ME_PATH, AUTH_TOKEN_PATH};
use crate::storage::TokenStorage;
use crate::{InvctlError, Result};

/// Owner of the current token and user.
///
/// Every transition is published on a watch channel; consumers either take
/// snapshots or [`subscribe`](SessionStore::subscribe) to be notified. The
/// store is the only writer of the persisted token.
pub struct SessionStore {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn TokenStorage>,
    session: watch::Sender<Session>,
    // Serialises persisted-slot writes with the transition they belong to.
    // Never held across a network call.
    slot: Mutex<()>,
}

impl SessionStore {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn TokenStorage>) -> Self {
        let (session, _) = watch::channel(Session::new());
        Self {
            transport,
            storage,
            session,
            slot: Mutex::new(()),
        }
    }

    /// Construct a store and resolve the token persisted by a previous run.
    pub async fn start(transport: Arc<dyn Transport>, storage: Arc<dyn TokenStorage>) -> Self {
        let store = SessionStore::new(transport, storage);
        store.restore().await;
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn token(&self) -> Option<Credential> {
        self.session.borrow().token().cloned()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.borrow().user().cloned()
    }

    /// Exchange username and password for a token, then resolve its user.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let password = Password::new(username, password);
        info!(user = %password.username, "Try login");

        let token = match self.request_token(&password).await {
            Ok(token) => token,
            Err(err) => {
                warn!(user = %password.username, "Login failed: {}", err);
                self.abandon(err.to_string()).await;
                return Err(err);
            }
        };

        let epoch = {
            let _slot = self.slot.lock().await;
            if let Err(err) = self.storage.store(&token).await {
                // The token still works for this run, it just won't survive a restart.
                warn!("Failed to persist token: {}", err);
            }
            self.begin(token.clone())
        };

        let user = self.resolve(epoch, token).await?;
        info!(user = %user.username, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Drop the session. Calling it while logged out does nothing.
    pub async fn logout(&self) {
        if self.clear() {
            info!("Logged out");
        }
        self.erase_if_logged_out().await;
    }

    /// Forced sign-out after the backend rejected the token.
    pub async fn expire(&self, reason: &str) {
        if self.clear() {
            warn!(reason, "Session expired");
        }
        self.erase_if_logged_out().await;
    }

    /// Pick up the token persisted by a previous run, if any, and resolve its user.
    pub async fn restore(&self) -> Option<UserProfile> {
        let token = match self.storage.load().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted token");
                return None;
            }
            Err(err) => {
                warn!("Failed to load persisted token: {}", err);
                return None;
            }
        };

        let epoch = self.begin(token.clone());
        match self.resolve(epoch, token).await {
            Ok(user) => {
                info!(user = %user.username, "Session restored");
                Some(user)
            }
            Err(err) => {
                info!("Persisted token dropped: {}", err);
                None
            }
        }
    }

    /// Re-fetch the profile of the current token.
    pub async fn refresh(&self) -> Result<Option<UserProfile>> {
        let (epoch, token) = {
            let session = self.session.borrow();
            match session.token() {
                Some(token) => (session.epoch(), token.clone()),
                None => return Ok(None),
            }
        };
        self.resolve(epoch, token).await.map(Some)
    }

    async fn request_token(&self, password: &Password<'_>) -> Result<Credential> {
        let request = ApiRequest::post_form(AUTH_TOKEN_PATH, message::password_grant(password));
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(InvctlError::CredentialRejected {
                status: response.status(),
                message: response
                    .detail()
                    .unwrap_or_else(|| message::LOGIN_FAILED_MESSAGE.to_owned()),
            });
        }

        TokenResponse::from_body(response.body())
            .credential()
            .ok_or(InvctlError::Integrity)
    }

    async fn fetch_profile(&self, token: Credential) -> Result<UserProfile> {
        let response = self
            .transport
            .send(ApiRequest::get(AUTH_ME_PATH).with_bearer(token))
            .await?;

        if !response.is_success() {
            return Err(status_error(AUTH_ME_PATH, &response));
        }
        response.json()
    }

    // Fetch the user of `token` and commit it if `epoch` is still current.
    // On failure the token is dropped, unless a newer transition superseded it.
    async fn resolve(&self, epoch: Epoch, token: Credential) -> Result<UserProfile> {
        match self.fetch_profile(token).await {
            Ok(user) => {
                let committed = self
                    .session
                    .send_if_modified(|session| session.resolve(epoch, user.clone()));
                if !committed {
                    debug!(epoch, "Discard stale profile");
                }
                Ok(user)
            }
            Err(err) => {
                let _slot = self.slot.lock().await;
                let reason = err.to_string();
                if self
                    .session
                    .send_if_modified(|session| session.reject(epoch, reason))
                {
                    warn!(epoch, "Failed to resolve user, dropping token: {}", err);
                    if let Err(err) = self.storage.erase().await {
                        warn!("Failed to erase persisted token: {}", err);
                    }
                } else {
                    debug!(epoch, "Discard stale profile failure");
                }
                Err(InvctlError::profile_fetch(err))
            }
        }
    }

    async fn abandon(&self, reason: String) {
        let _slot = self.slot.lock().await;
        self.session.send_if_modified(|session| session.fail(reason));
        if let Err(err) = self.storage.erase().await {
            warn!("Failed to erase persisted token: {}", err);
        }
    }

    fn begin(&self, token: Credential) -> Epoch {
        let mut epoch = 0;
        self.session.send_modify(|session| epoch = session.begin(token));
        epoch
    }

    fn clear(&self) -> bool {
        self.session.send_if_modified(Session::clear)
    }

    // The in-memory transition already happened; only touch the slot when no
    // login installed a newer token in the meantime.
    async fn erase_if_logged_out(&self) {
        let _slot = self.slot.lock().await;
        if self.session.borrow().token().is_some() {
            return;
        }
        if let Err(err) = self.storage.erase().await {
            warn!("Failed to erase persisted token: {}", err);
        }
    }
}

fn status_error(path: &str, response: &ApiResponse) -> InvctlError {
    let message = response
        .detail()
        .unwrap_or_else(|| format!("status {}", response.status()));
    if response.is_unauthorized() {
        InvctlError::Unauthorized {
            path: path.to_owned(),
            message,
            forced: false,
        }
    } else {
        InvctlError::Api {
            status: response.status(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::core::Phase;
    use crate::storage::MemoryStorage;

    // Answers requests from a fixed script and records what was sent.
    #[derive(Default)]
    struct Scripted {
        responses: StdMutex<VecDeque<ApiResponse>>,
        sent: StdMutex<Vec<ApiRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<ApiResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(responses.into()),
                sent: StdMutex::default(),
            })
        }

        fn sent(&self) -> Vec<ApiRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.sent.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request"))
        }
    }

    fn alice() -> serde_json::Value {
        json!({"id": 1, "username": "alice", "role": "viewer"})
    }

    #[test]
    fn login_sends_password_grant_then_profile_request() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![
                ApiResponse::new(200, json!({"access_token": "T1", "token_type": "bearer"})),
                ApiResponse::new(200, alice()),
            ]);
            let storage = MemoryStorage::new();
            let store = SessionStore::new(transport.clone(), Arc::new(storage.clone()));
            let mut rx = store.subscribe();

            let user = store.login("alice", "correct").await.unwrap();
            assert_eq!(user.username, "alice");
            assert_eq!(store.token().unwrap().expose(), "T1");
            assert_eq!(store.snapshot().phase(), Phase::LoggedIn);
            assert_eq!(storage.load().await.unwrap().unwrap().expose(), "T1");
            assert!(rx.has_changed().unwrap());
            assert_eq!(rx.borrow_and_update().user().unwrap().username, "alice");

            let sent = transport.sent();
            assert_eq!(sent.len(), 2);
            assert_eq!(sent[0].path(), AUTH_TOKEN_PATH);
            assert!(sent[0].bearer().is_none());
            assert_eq!(sent[1].path(), AUTH_ME_PATH);
            assert_eq!(sent[1].bearer().unwrap().expose(), "T1");
        });
    }

    #[test]
    fn rejected_login_keeps_logged_out() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![ApiResponse::new(
                401,
                json!({"detail": "Incorrect username or password"}),
            )]);
            let storage = MemoryStorage::new();
            let store = SessionStore::new(transport, Arc::new(storage.clone()));

            let err = store.login("alice", "wrong").await.unwrap_err();
            assert!(matches!(err, InvctlError::CredentialRejected { status: 401, .. }));
            assert!(err.to_string().contains("Incorrect username or password"));
            assert!(store.token().is_none());
            assert!(store.user().is_none());
            assert!(storage.load().await.unwrap().is_none());
        });
    }

    #[test]
    fn rejected_login_without_detail_uses_generic_message() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![ApiResponse::new(500, serde_json::Value::Null)]);
            let store = SessionStore::new(transport, Arc::new(MemoryStorage::new()));

            let err = store.login("alice", "pw").await.unwrap_err();
            assert_eq!(err.to_string(), message::LOGIN_FAILED_MESSAGE);
        });
    }

    #[test]
    fn missing_access_token_is_integrity_error() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![ApiResponse::new(200, json!({"token_type": "bearer"}))]);
            let store = SessionStore::new(transport.clone(), Arc::new(MemoryStorage::new()));

            let err = store.login("alice", "correct").await.unwrap_err();
            assert!(matches!(err, InvctlError::Integrity));
            assert!(store.token().is_none());
            // No profile request without a token.
            assert_eq!(transport.sent().len(), 1);
        });
    }

    #[test]
    fn token_answer_without_object_body_is_integrity_error() {
        for body in [&b""[..], &b"OK"[..]] {
            tokio_test::block_on(async move {
                let transport = Scripted::new(vec![ApiResponse::from_bytes(200, body)]);
                let storage = MemoryStorage::new();
                let store = SessionStore::new(transport.clone(), Arc::new(storage.clone()));

                let err = store.login("alice", "correct").await.unwrap_err();
                assert!(matches!(err, InvctlError::Integrity), "{:?}", err);
                assert!(store.token().is_none());
                assert!(storage.snapshot().await.is_empty());
                assert_eq!(transport.sent().len(), 1);
            });
        }
    }

    #[test]
    fn failed_login_drops_previous_session() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![ApiResponse::new(
                401,
                json!({"detail": "Incorrect username or password"}),
            )]);
            let storage = MemoryStorage::with_token("OLD");
            let store = SessionStore::new(transport, Arc::new(storage.clone()));
            store.begin(Credential::new("OLD"));

            store.login("alice", "wrong").await.unwrap_err();
            assert!(store.token().is_none());
            assert!(storage.snapshot().await.is_empty());
        });
    }

    #[test]
    fn profile_failure_after_login_self_heals() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![
                ApiResponse::new(200, json!({"access_token": "T1"})),
                ApiResponse::new(401, json!({"detail": "Could not validate credentials"})),
            ]);
            let storage = MemoryStorage::new();
            let store = SessionStore::new(transport, Arc::new(storage.clone()));

            let err = store.login("alice", "correct").await.unwrap_err();
            assert!(matches!(err, InvctlError::ProfileFetch { .. }));
            assert!(err.is_auth_failure());
            assert!(store.token().is_none());
            assert_eq!(store.snapshot().phase(), Phase::Error);
            assert!(storage.load().await.unwrap().is_none());
        });
    }

    #[test]
    fn restore_with_expired_token() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![ApiResponse::new(
                401,
                json!({"detail": "Could not validate credentials"}),
            )]);
            let storage = MemoryStorage::with_token("EXPIRED");
            let store = SessionStore::start(transport, Arc::new(storage.clone())).await;

            assert!(store.user().is_none());
            assert!(store.token().is_none());
            assert!(storage.load().await.unwrap().is_none());
        });
    }

    #[test]
    fn restore_drops_token_on_any_profile_failure() {
        let answers = vec![
            ApiResponse::new(500, json!({"detail": "database unavailable"})),
            ApiResponse::new(200, json!({"id": 1, "username": "alice", "role": "owner"})),
        ];
        for answer in answers {
            tokio_test::block_on(async move {
                let transport = Scripted::new(vec![answer]);
                let storage = MemoryStorage::with_token("T1");
                let store = SessionStore::start(transport, Arc::new(storage.clone())).await;

                assert!(store.token().is_none());
                assert_eq!(store.snapshot().phase(), Phase::Error);
                assert!(storage.load().await.unwrap().is_none());
            });
        }
    }

    #[test]
    fn restore_without_token_sends_nothing() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![]);
            let store = SessionStore::start(transport.clone(), Arc::new(MemoryStorage::new())).await;
            assert_eq!(store.snapshot().phase(), Phase::LoggedOut);
            assert!(transport.sent().is_empty());
        });
    }

    #[test]
    fn logout_twice() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![ApiResponse::new(200, alice())]);
            let storage = MemoryStorage::with_token("T1");
            let store = SessionStore::start(transport, Arc::new(storage.clone())).await;
            assert!(store.user().is_some());

            let mut rx = store.subscribe();
            store.logout().await;
            assert!(rx.has_changed().unwrap());
            rx.borrow_and_update();
            assert!(store.token().is_none());
            assert!(storage.load().await.unwrap().is_none());

            store.logout().await;
            assert!(!rx.has_changed().unwrap());
            assert_eq!(store.snapshot().phase(), Phase::LoggedOut);
        });
    }

    #[test]
    fn refresh_keeps_session_logged_in() {
        tokio_test::block_on(async move {
            let transport = Scripted::new(vec![
                ApiResponse::new(200, alice()),
                ApiResponse::new(
                    200,
                    json!({"id": 1, "username": "alice", "role": "admin", "full_name": "Alice"}),
                ),
            ]);
            let store =
                SessionStore::start(transport, Arc::new(MemoryStorage::with_token("T1"))).await;
            let epoch = store.snapshot().epoch();

            let user = store.refresh().await.unwrap().unwrap();
            assert_eq!(user.full_name.as_deref(), Some("Alice"));
            assert!(store.user().unwrap().is_admin());
            assert_eq!(store.snapshot().epoch(), epoch);
        });
    }
}
