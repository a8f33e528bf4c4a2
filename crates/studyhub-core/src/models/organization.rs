use serde::{Deserialize, Serialize};

use super::id;

/// Top-level tenant grouping users, channels, and invitations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    #[serde(deserialize_with = "id::string_id", alias = "organization_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub organization_name: String,
}

/// Request DTO for POST /organizations.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrganizationRequest {
    pub organization_name: String,
}

/// Dashboard row: an organization enriched with best-effort counts.
/// A 404 from either count endpoint reads as zero.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    pub organization: Organization,
    pub member_count: usize,
    pub channel_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn organization_id_aliases_normalize() {
        let org: Organization =
            serde_json::from_value(json!({"organization_id": 5, "name": "Math101"})).unwrap();
        assert_eq!(org.id, "5");
        assert_eq!(org.organization_name, "Math101");
    }
}
