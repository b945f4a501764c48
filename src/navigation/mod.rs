//! Current page tracking and the route guard of the dashboard.

use tokio::sync::watch;

use crate::core::Session;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const USERS_PATH: &str = "/users";

/// Where the user currently is, and the ability to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// In-process [`Navigator`]. Page changes are published on a watch channel.
#[derive(Debug)]
pub struct Location {
    path: watch::Sender<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        let (path, _) = watch::channel(path.into());
        Self { path }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.path.subscribe()
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new(HOME_PATH)
    }
}

impl Navigator for Location {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn navigate(&self, path: &str) {
        self.path.send_if_modified(|current| {
            if current.as_str() == path {
                false
            } else {
                *current = path.to_owned();
                true
            }
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Users,
    Login,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Dashboard),
            USERS_PATH => Some(Route::Users),
            LOGIN_PATH => Some(Route::Login),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Dashboard => HOME_PATH,
            Route::Users => USERS_PATH,
            Route::Login => LOGIN_PATH,
        }
    }

    pub fn is_private(self) -> bool {
        !matches!(self, Route::Login)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    Allow,
    Redirect(&'a str),
}

/// Decide whether `route` may be shown for `session`. Anonymous users are
/// sent to `login_path`.
///
/// Private routes need a resolved user; a token whose user is still being
/// resolved does not count. User management additionally needs a
/// superadmin.
pub fn guard<'a>(route: Route, session: &Session, login_path: &'a str) -> Access<'a> {
    if !route.is_private() {
        return Access::Allow;
    }
    match session.user() {
        None => Access::Redirect(login_path),
        Some(user) if route == Route::Users && !user.can_manage_users() => {
            Access::Redirect(HOME_PATH)
        }
        Some(_) => Access::Allow,
    }
}
