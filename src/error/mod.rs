pub(crate) mod internal;
pub use internal::Error as InternalError;

/// Errors surfaced to callers of the session store and the gateway.
#[derive(Debug, thiserror::Error)]
pub enum InvctlError {
    /// The token endpoint refused the submitted username/password.
    #[error("{message}")]
    CredentialRejected { status: u16, message: String },

    /// The token endpoint answered 2xx but carried no bearer token.
    #[error("no access token received")]
    Integrity,

    /// A gateway-mediated request was answered with 401.
    /// `forced` tells whether the session was torn down because of it.
    #[error("unauthorized request to {path}: {message}")]
    Unauthorized {
        path: String,
        message: String,
        forced: bool,
    },

    /// Resolving the current user for a freshly installed token failed.
    #[error("failed to fetch current user: {source}")]
    ProfileFetch {
        #[source]
        source: Box<InvctlError>,
    },

    /// Any other non-2xx answer from the backend.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Caller supplied input rejected before any request was sent.
    #[error("{0}")]
    Input(String),

    /// The operation requires a signed-in user.
    #[error("not signed in")]
    Unauthenticated,

    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Internal(#[from] internal::Error),
}

impl InvctlError {
    pub(crate) fn profile_fetch(source: InvctlError) -> Self {
        InvctlError::ProfileFetch {
            source: Box::new(source),
        }
    }

    /// Http status code carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            InvctlError::CredentialRejected { status, .. } | InvctlError::Api { status, .. } => {
                Some(*status)
            }
            InvctlError::Unauthorized { .. } => Some(401),
            InvctlError::ProfileFetch { source } => source.status(),
            InvctlError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether re-authenticating is the way to recover from this error.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            InvctlError::CredentialRejected { .. }
            | InvctlError::Unauthorized { .. }
            | InvctlError::Unauthenticated => true,
            InvctlError::ProfileFetch { source } => source.is_auth_failure(),
            _ => false,
        }
    }
}
