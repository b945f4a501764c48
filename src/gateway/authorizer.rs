use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{debug, warn};
use crate::core::SessionStore;
use crate::gateway::Middleware;
use crate::navigation::{Navigator, LOGIN_PATH};
use crate::protocol::{ApiRequest, ApiResponse, AUTH_PATH};
use crate::{InvctlError, Result};

/// Decides whether a 401 tears the session down.
///
/// Only failures of authentication endpoints, or failures while the user is
/// already on the login page, force a logout and redirect. Any other 401 is
/// handed back to the caller with the session left alone.
#[derive(Debug, Clone)]
pub struct ForcingPolicy {
    auth_path: String,
    login_path: String,
}

impl Default for ForcingPolicy {
    fn default() -> Self {
        ForcingPolicy::new(LOGIN_PATH)
    }
}

impl ForcingPolicy {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            auth_path: AUTH_PATH.to_owned(),
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn should_force(&self, request_path: &str, current_page: &str) -> bool {
        request_path.contains(self.auth_path.as_str()) || current_page == self.login_path
    }
}

/// Turns non-2xx answers into errors and applies the [`ForcingPolicy`] to 401s.
pub(crate) struct Authorizer<MW> {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    policy: ForcingPolicy,
    next: MW,
}

impl<MW> Authorizer<MW> {
    pub(crate) fn new(
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        policy: ForcingPolicy,
        next: MW,
    ) -> Self {
        Self {
            session,
            navigator,
            policy,
            next,
        }
    }
}

#[async_trait]
impl<MW> Middleware for Authorizer<MW>
where
    MW: Middleware + 'static,
{
    async fn apply(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path().to_owned();
        let response = self.next.apply(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .detail()
            .unwrap_or_else(|| format!("status {}", response.status()));

        if !response.is_unauthorized() {
            return Err(InvctlError::Api {
                status: response.status(),
                message,
            });
        }

        let current_page = self.navigator.current_path();
        let forced = self.policy.should_force(&path, &current_page);
        if forced {
            warn!(path = %path, page = %current_page, "Unauthorized, redirect to login");
            self.session.expire(&message).await;
            self.navigator.navigate(self.policy.login_path());
        } else {
            debug!(path = %path, page = %current_page, "Unauthorized, left to caller");
        }

        Err(InvctlError::Unauthorized {
            path,
            message,
            forced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forcing_policy() {
        let policy = ForcingPolicy::default();

        // Auth endpoints always force.
        assert!(policy.should_force("/auth/me", "/dashboard"));
        assert!(policy.should_force("/auth/token", "/"));
        // Anything while on the login page forces.
        assert!(policy.should_force("/items/", "/login"));
        // Incidental 401s elsewhere do not.
        assert!(!policy.should_force("/items/", "/dashboard"));
        assert!(!policy.should_force("/transactions/", "/"));
        assert!(!policy.should_force("/users/", "/users"));
    }

    #[test]
    fn custom_login_path() {
        let policy = ForcingPolicy::new("/signin");
        assert_eq!(policy.login_path(), "/signin");
        assert!(policy.should_force("/items/", "/signin"));
        assert!(!policy.should_force("/items/", "/login"));
    }
}
