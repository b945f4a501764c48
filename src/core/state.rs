use crate::common::Time;
use crate::core::{Credential, Principal, UserProfile};

/// Counter bumped on every transition that changes the token.
/// Asynchronous results started under an older epoch are stale.
pub type Epoch = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    LoggedOut,
    Resolving { token: Credential },
    LoggedIn { token: Credential, user: UserProfile },
    Failed { reason: String },
}

/// Coarse view of [`SessionState`] for consumers that only branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LoggedOut,
    Resolving,
    LoggedIn,
    Error,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    epoch: Epoch,
    changed_at: Time,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::LoggedOut,
            epoch: 0,
            changed_at: chrono::Utc::now(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn changed_at(&self) -> Time {
        self.changed_at
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::LoggedOut => Phase::LoggedOut,
            SessionState::Resolving { .. } => Phase::Resolving,
            SessionState::LoggedIn { .. } => Phase::LoggedIn,
            SessionState::Failed { .. } => Phase::Error,
        }
    }

    pub fn token(&self) -> Option<&Credential> {
        match &self.state {
            SessionState::Resolving { token } | SessionState::LoggedIn { token, .. } => Some(token),
            SessionState::LoggedOut | SessionState::Failed { .. } => None,
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::LoggedIn { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::from(self.user().cloned())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    // Transitions. Each returns whether the session changed, so callers can
    // feed them to `watch::Sender::send_if_modified`.

    /// Install a new token and start resolving its user. Returns the epoch
    /// the resolution belongs to.
    pub(crate) fn begin(&mut self, token: Credential) -> Epoch {
        self.set(SessionState::Resolving { token }, true);
        self.epoch
    }

    /// Commit a resolved user if `epoch` is still current.
    /// A refresh of an already logged in session replaces the user in place.
    pub(crate) fn resolve(&mut self, epoch: Epoch, user: UserProfile) -> bool {
        if epoch != self.epoch {
            return false;
        }
        let token = match &self.state {
            SessionState::Resolving { token } | SessionState::LoggedIn { token, .. } => {
                token.clone()
            }
            _ => return false,
        };
        self.set(SessionState::LoggedIn { token, user }, false);
        true
    }

    /// Drop the token of `epoch` after its user could not be resolved.
    pub(crate) fn reject(&mut self, epoch: Epoch, reason: impl Into<String>) -> bool {
        if epoch != self.epoch || self.token().is_none() {
            return false;
        }
        self.set(
            SessionState::Failed {
                reason: reason.into(),
            },
            true,
        );
        true
    }

    /// Record a failed login. Any previous token is dropped.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) -> bool {
        let token_changed = self.token().is_some();
        self.set(
            SessionState::Failed {
                reason: reason.into(),
            },
            token_changed,
        );
        true
    }

    /// Clear token and user. No-op when already logged out.
    pub(crate) fn clear(&mut self) -> bool {
        match self.state {
            SessionState::LoggedOut => false,
            SessionState::Failed { .. } => {
                self.set(SessionState::LoggedOut, false);
                true
            }
            SessionState::Resolving { .. } | SessionState::LoggedIn { .. } => {
                self.set(SessionState::LoggedOut, true);
                true
            }
        }
    }

    fn set(&mut self, state: SessionState, token_changed: bool) {
        self.state = state;
        if token_changed {
            self.epoch += 1;
        }
        self.changed_at = chrono::Utc::now();
    }
}
