mod user;
pub use user::{Role, UserProfile};

/// Who the current session acts as.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    AnonymousUser,
    User(UserProfile),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Principal::User(user) => Some(user),
            Principal::AnonymousUser => None,
        }
    }

    pub fn can_edit_inventory(&self) -> bool {
        self.user().map_or(false, UserProfile::can_edit_inventory)
    }

    pub fn can_manage_users(&self) -> bool {
        self.user().map_or(false, UserProfile::can_manage_users)
    }
}

impl From<Option<UserProfile>> for Principal {
    fn from(user: Option<UserProfile>) -> Self {
        match user {
            Some(user) => Principal::User(user),
            None => Principal::AnonymousUser,
        }
    }
}
