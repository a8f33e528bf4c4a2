use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;

/// Role within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Member => write!(f, "member"),
        }
    }
}

/// A user's role-bearing association with an organization.
/// Composite key (organization_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    #[serde(deserialize_with = "id::string_id")]
    pub organization_id: String,
    #[serde(deserialize_with = "id::string_id")]
    pub user_id: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

fn default_role() -> Role {
    Role::Member
}

/// Request DTO for POST /organization_users/{org_id}.
#[derive(Debug, Clone, Serialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: Role,
}
