//! Dashboard orchestrator.
//!
//! Summarizes the current user's organizations and invitations and mediates
//! the organization lifecycle, including the client-side cascading delete.
//! Per-organization counts load concurrently; either count tolerates a 404
//! (and any other failure) as zero.

use studyhub_api_client::ApiClient;
use studyhub_core::error::{ApiError, ApiResult};
use studyhub_core::models::{Invitation, Organization, OrganizationSummary, Role, User};

use crate::cascade::{CascadeAction, CascadeReport};

pub struct Dashboard {
    api: ApiClient,
    user: User,
    pub organizations: Vec<OrganizationSummary>,
    pub invitations: Vec<Invitation>,
}

impl Dashboard {
    pub fn new(api: ApiClient, user: User) -> Self {
        Self {
            api,
            user,
            organizations: Vec::new(),
            invitations: Vec::new(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Resolve the numeric user id some endpoints require. The session id is
    /// preferred when it is already numeric; otherwise the user list is
    /// scanned by email.
    pub async fn resolve_user_id(&self) -> ApiResult<String> {
        if self.user.id.parse::<i64>().is_ok() {
            return Ok(self.user.id.clone());
        }
        let users = self.api.list_users().await?;
        users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(&self.user.email))
            .map(|u| u.id)
            .ok_or_else(|| ApiError::NotFound {
                detail: format!("No user found with email {}", self.user.email),
            })
    }

    pub async fn load(&mut self) {
        self.reload_organizations().await;
        self.reload_invitations().await;
    }

    async fn reload_organizations(&mut self) {
        let organizations = match self.api.list_my_organizations().await {
            Ok(orgs) => orgs,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load organizations");
                Vec::new()
            }
        };

        let mut handles = Vec::with_capacity(organizations.len());
        for org in organizations {
            let api = self.api.clone();
            handles.push(tokio::spawn(async move {
                summarize_organization(api, org).await
            }));
        }

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::warn!(error = %e, "organization summary task panicked"),
            }
        }
        self.organizations = summaries;
    }

    async fn reload_invitations(&mut self) {
        match self.api.my_invitations().await {
            Ok(invitations) => {
                self.invitations = invitations.into_iter().filter(|i| i.is_pending()).collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load invitations");
                self.invitations = Vec::new();
            }
        }
    }

    /// Accept removes the invitation locally and reloads the organization
    /// list, since a new membership just appeared.
    pub async fn accept_invitation(&mut self, invitation_id: &str) -> ApiResult<()> {
        self.api.accept_invitation(invitation_id).await?;
        self.invitations.retain(|i| i.invitation_id != invitation_id);
        self.reload_organizations().await;
        Ok(())
    }

    pub async fn decline_invitation(&mut self, invitation_id: &str) -> ApiResult<()> {
        self.api.decline_invitation(invitation_id).await?;
        self.invitations.retain(|i| i.invitation_id != invitation_id);
        Ok(())
    }

    /// Create an organization and assign the creator the owner role as a
    /// best-effort follow-up. A failed role assignment downgrades to a
    /// warning; the creation itself still counts as successful.
    pub async fn create_organization(
        &mut self,
        name: &str,
    ) -> ApiResult<(String, Option<String>)> {
        let org_id = self.api.create_organization(name).await?;

        let warning = match self.resolve_user_id().await {
            Ok(user_id) => match self.api.add_member(&org_id, &user_id, Role::Owner).await {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(org_id = %org_id, error = %e, "owner role assignment failed");
                    Some(format!(
                        "Organization created, but assigning the owner role failed: {}",
                        e
                    ))
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve user id for owner role");
                Some(format!(
                    "Organization created, but the creator could not be resolved: {}",
                    e
                ))
            }
        };

        self.reload_organizations().await;
        Ok((org_id, warning))
    }

    /// Delete an organization with the client-side cascade: memberships
    /// first, then per channel its topics and per topic its notes, each
    /// child before its parent, finally the organization itself. Every step
    /// is best-effort and recorded; the top-level delete is attempted
    /// regardless of cascade outcome.
    pub async fn delete_organization(&mut self, org_id: &str) -> CascadeReport {
        let mut report = CascadeReport::new();

        let members = self.api.list_members(org_id).await.unwrap_or_else(|e| {
            tracing::warn!(org_id = %org_id, error = %e, "could not enumerate memberships");
            Vec::new()
        });
        for member in &members {
            let result = self.api.remove_member(org_id, &member.user_id).await;
            report.record(CascadeAction::DeleteMembership, &member.user_id, &result);
        }

        let channels = self.api.list_channels(org_id).await.unwrap_or_else(|e| {
            tracing::warn!(org_id = %org_id, error = %e, "could not enumerate channels");
            Vec::new()
        });
        for channel in &channels {
            let topics = self.api.list_topics(&channel.id).await.unwrap_or_else(|e| {
                tracing::warn!(channel_id = %channel.id, error = %e, "could not enumerate topics");
                Vec::new()
            });
            for topic in &topics {
                let notes = self.api.list_notes(&topic.id).await.unwrap_or_else(|e| {
                    tracing::warn!(topic_id = %topic.id, error = %e, "could not enumerate notes");
                    Vec::new()
                });
                for note in &notes {
                    let result = self.api.delete_note(&note.id).await;
                    report.record(CascadeAction::DeleteNote, &note.id, &result);
                }
                let result = self.api.delete_topic(&topic.id).await;
                report.record(CascadeAction::DeleteTopic, &topic.id, &result);
            }
            let result = self.api.delete_channel(&channel.id).await;
            report.record(CascadeAction::DeleteChannel, &channel.id, &result);
        }

        let result = self.api.delete_organization(org_id).await;
        report.record(CascadeAction::DeleteOrganization, org_id, &result);

        self.organizations
            .retain(|s| s.organization.id != org_id);
        report
    }

    /// Leave an organization: find the caller's membership row (dedicated
    /// my-memberships lookup first, generic id resolution as fallback),
    /// delete it, and drop the organization from the local list.
    pub async fn leave_organization(&mut self, org_id: &str) -> ApiResult<()> {
        let user_id = match self.api.my_memberships().await {
            Ok(rows) => rows
                .into_iter()
                .find(|m| m.organization_id == org_id)
                .map(|m| m.user_id),
            Err(e) => {
                tracing::debug!(error = %e, "my-memberships lookup unavailable");
                None
            }
        };
        let user_id = match user_id {
            Some(id) => id,
            None => self.resolve_user_id().await?,
        };

        self.api.remove_member(org_id, &user_id).await?;
        self.organizations
            .retain(|s| s.organization.id != org_id);
        Ok(())
    }
}

/// Fetch member and channel counts for one organization concurrently. Any
/// failure (a 404 included) reads as zero.
async fn summarize_organization(api: ApiClient, org: Organization) -> OrganizationSummary {
    let (members, channels) = tokio::join!(api.list_members(&org.id), api.list_channels(&org.id));

    let member_count = match members {
        Ok(rows) => rows.len(),
        Err(e) => {
            tracing::debug!(org_id = %org.id, error = %e, "member count unavailable");
            0
        }
    };
    let channel_count = match channels {
        Ok(rows) => rows.len(),
        Err(e) => {
            tracing::debug!(org_id = %org.id, error = %e, "channel count unavailable");
            0
        }
    };

    OrganizationSummary {
        organization: org,
        member_count,
        channel_count,
    }
}
