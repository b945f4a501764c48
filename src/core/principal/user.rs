use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Admin,
    Superadmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Role::Viewer => "viewer",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        };
        f.write_str(s)
    }
}

/// Identity resolved by the backend for the current token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

fn active_by_default() -> bool {
    true
}

impl UserProfile {
    // Viewers only read; every other role records items, categories and transactions.
    pub fn can_edit_inventory(&self) -> bool {
        self.role != Role::Viewer
    }

    pub fn can_manage_users(&self) -> bool {
        self.role == Role::Superadmin
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Superadmin)
    }
}
