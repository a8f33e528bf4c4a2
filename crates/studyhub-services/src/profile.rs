//! Profile facade.
//!
//! Profile, memberships, and usage statistics for the account page. Stats
//! endpoints are optional on older backends, so every piece degrades to a
//! fallback value instead of failing the whole page.

use serde::Serialize;
use studyhub_api_client::ApiClient;
use studyhub_core::error::ApiResult;
use studyhub_core::models::{Membership, User};
use studyhub_core::store::Session;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageStats {
    pub note_count: usize,
    pub organization_count: usize,
}

#[derive(Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The profile as the backend sees it, falling back to the cached session
    /// user when /auth/me is missing.
    pub async fn get_profile(&self, session: &Session) -> User {
        match self.api.me().await {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "auth/me unavailable, using cached profile");
                session.user.clone()
            }
        }
    }

    /// The caller's membership rows. 404 reads as "no memberships".
    pub async fn memberships(&self) -> ApiResult<Vec<Membership>> {
        self.api.my_memberships().await
    }

    /// Counts for the stats card. Each count independently degrades to zero
    /// when its endpoint fails; the failure is logged, not surfaced.
    pub async fn usage_stats(&self) -> UsageStats {
        let note_count = match self.api.list_my_notes().await {
            Ok(notes) => notes.len(),
            Err(e) => {
                tracing::debug!(error = %e, "note stats unavailable");
                0
            }
        };
        let organization_count = match self.api.list_my_organizations().await {
            Ok(orgs) => orgs.len(),
            Err(e) => {
                tracing::debug!(error = %e, "organization stats unavailable");
                0
            }
        };
        UsageStats {
            note_count,
            organization_count,
        }
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        self.api
            .change_password(user_id, old_password, new_password)
            .await
    }
}
