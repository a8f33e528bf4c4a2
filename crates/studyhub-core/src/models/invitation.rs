use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;
use super::membership::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

/// An invitation for an email address to join an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(deserialize_with = "id::string_id", alias = "id")]
    pub invitation_id: String,
    #[serde(deserialize_with = "id::string_id")]
    pub organization_id: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_status")]
    pub status: InvitationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_role() -> Role {
    Role::Member
}

fn default_status() -> InvitationStatus {
    InvitationStatus::Pending
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}
