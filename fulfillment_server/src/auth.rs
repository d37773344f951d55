use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::config::AccessKeys;

/// The header carrying the caller's access key.
pub const ACCESS_KEY_HEADER: &str = "ofp_access_key";
/// The header naming the operator responsible for an administrative change.
pub const OPERATOR_HEADER: &str = "ofp_operator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May override payment statuses and edit the catalog.
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// The roles granted to a request. Stored in the request extensions by the ACL middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub roles: Vec<Role>,
}

impl AccessClaims {
    /// Maps a presented access key onto the roles it grants. Unknown or missing keys grant nothing.
    pub fn from_access_key(keys: &AccessKeys, presented: Option<&str>) -> Self {
        let mut roles = Vec::new();
        if let Some(key) = presented {
            if keys.admin.matches(key.trim()) {
                roles.push(Role::Admin);
            }
        }
        Self { roles }
    }

    pub fn has_roles(&self, required: &[Role]) -> bool {
        required.iter().all(|role| self.roles.contains(role))
    }
}
