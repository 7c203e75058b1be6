//! Role and user models

use serde::{Deserialize, Serialize};

/// Dashboard role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    /// Branch manager
    #[serde(rename = "manager")]
    Manager,
    /// Customer
    #[serde(rename = "user")]
    Customer,
}

impl Role {
    /// Route a user lands on after logging in
    pub fn landing_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin/admin-dashboard",
            Role::Manager => "/manager/manager-dasboard",
            Role::Customer => "/user/customer-dashboard",
        }
    }

    /// Route prefix shared by every page of this role's dashboard
    pub fn route_prefix(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Manager => "/manager",
            Role::Customer => "/user",
        }
    }
}

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl UserInfo {
    /// First word of the display name
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Second word of the display name, or empty
    pub fn last_name(&self) -> &str {
        self.name.split_whitespace().nth(1).unwrap_or("")
    }
}
