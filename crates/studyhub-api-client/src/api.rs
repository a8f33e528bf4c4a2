//! Domain methods for the StudyHub backend.
//!
//! Entity types come from `studyhub_core::models`. Every list method maps an
//! expected-empty 404 ("no channels found", etc.) to an empty Vec and filters
//! rows whose id failed normalization, so orchestrators never see either.

use crate::ApiClient;
use studyhub_core::error::{ApiError, ApiResult};
use studyhub_core::models::id::{extract_id, is_valid_id};
use studyhub_core::models::{
    AddMemberRequest, Channel, CreateChannelRequest, CreateNoteRequest,
    CreateOrganizationRequest, CreateTopicRequest, Invitation, Membership, Note, Organization,
    RegisterRequest, Role, TokenResponse, Topic, UploadResponse, User,
};

/// Map an expected-empty 404 to an empty list; pass everything else through.
fn empty_on_missing<T>(result: ApiResult<Vec<T>>) -> ApiResult<Vec<T>> {
    match result {
        Err(err) if err.is_empty_collection() => Ok(Vec::new()),
        other => other,
    }
}

// Auth
impl ApiClient {
    /// POST /auth/login (form-urlencoded, OAuth2 password grant shape).
    /// Does not install the token; the session facade owns that lifecycle.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        self.post_form(
            "/auth/login",
            &[
                ("username", username),
                ("password", password),
                ("grant_type", "password"),
            ],
        )
        .await
    }

    /// POST /auth/register.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        self.post_json("/auth/register", request).await
    }

    /// GET /auth/me (bearer auth).
    pub async fn me(&self) -> ApiResult<User> {
        self.get("/auth/me", &[]).await
    }
}

// Users
impl ApiClient {
    /// GET /users/. Used to resolve a numeric id by email and to enrich the
    /// login response with profile fields.
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        let mut users: Vec<User> = empty_on_missing(self.get("/users/", &[]).await)?;
        users.retain(|u| is_valid_id(&u.id));
        Ok(users)
    }

    /// PUT /users/{id}/change_password (form-urlencoded).
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        self.put_form(
            &format!("/users/{}/change_password", user_id),
            &[("old_password", old_password), ("new_password", new_password)],
        )
        .await
    }
}

// Organizations
impl ApiClient {
    /// GET /organizations/my.
    pub async fn list_my_organizations(&self) -> ApiResult<Vec<Organization>> {
        let mut orgs: Vec<Organization> =
            empty_on_missing(self.get("/organizations/my", &[]).await)?;
        orgs.retain(|o| is_valid_id(&o.id));
        Ok(orgs)
    }

    /// GET /organizations/{id}.
    pub async fn get_organization(&self, org_id: &str) -> ApiResult<Organization> {
        self.get(&format!("/organizations/{}", org_id), &[]).await
    }

    /// POST /organizations. The response envelope varies by backend version,
    /// so the new id is probed out of the raw value.
    pub async fn create_organization(&self, name: &str) -> ApiResult<String> {
        let request = CreateOrganizationRequest {
            organization_name: name.to_string(),
        };
        let value: serde_json::Value = self.post_json("/organizations", &request).await?;
        extract_id(&value).ok_or_else(|| {
            ApiError::Decode(format!("create organization response has no id: {}", value))
        })
    }

    /// DELETE /organizations/{id}.
    pub async fn delete_organization(&self, org_id: &str) -> ApiResult<()> {
        self.delete(&format!("/organizations/{}", org_id)).await
    }
}

// Channels
impl ApiClient {
    /// GET the channels of an organization. The deployed backend serves this
    /// under a misspelled path; newer builds also serve the corrected
    /// spelling. Try the misspelling first and fall back when the route
    /// itself is missing (a 404 that is not an empty-collection answer).
    pub async fn list_channels(&self, org_id: &str) -> ApiResult<Vec<Channel>> {
        let query = [("organization_id", org_id.to_string())];
        let first: ApiResult<Vec<Channel>> =
            self.get("/channels/channels_in_orgazation", &query).await;

        let result = match first {
            Err(ApiError::NotFound { ref detail })
                if !studyhub_core::error::is_empty_collection(detail) =>
            {
                self.get("/channels/channels_in_organization", &query).await
            }
            other => other,
        };

        let mut channels = empty_on_missing(result)?;
        channels.retain(|c| is_valid_id(&c.id));
        Ok(channels)
    }

    /// POST /channels/.
    pub async fn create_channel(&self, name: &str, org_id: &str) -> ApiResult<Channel> {
        let request = CreateChannelRequest {
            channel_name: name.to_string(),
            organization_id: org_id.to_string(),
        };
        self.post_json("/channels/", &request).await
    }

    /// DELETE /channels/{id}.
    pub async fn delete_channel(&self, channel_id: &str) -> ApiResult<()> {
        self.delete(&format!("/channels/{}", channel_id)).await
    }
}

// Topics
impl ApiClient {
    /// GET /topics/topics_in_channel?channel_id=.
    pub async fn list_topics(&self, channel_id: &str) -> ApiResult<Vec<Topic>> {
        let mut topics: Vec<Topic> = empty_on_missing(
            self.get(
                "/topics/topics_in_channel",
                &[("channel_id", channel_id.to_string())],
            )
            .await,
        )?;
        topics.retain(|t| is_valid_id(&t.id));
        Ok(topics)
    }

    /// POST /topics/.
    pub async fn create_topic(
        &self,
        name: &str,
        channel_id: &str,
        org_id: &str,
    ) -> ApiResult<Topic> {
        let request = CreateTopicRequest {
            topic_name: name.to_string(),
            channel_id: channel_id.to_string(),
            organization_id: org_id.to_string(),
        };
        self.post_json("/topics/", &request).await
    }

    /// DELETE /topics/{id}.
    pub async fn delete_topic(&self, topic_id: &str) -> ApiResult<()> {
        self.delete(&format!("/topics/{}", topic_id)).await
    }
}

// Notes
impl ApiClient {
    /// GET /notes/notes_in_topic?topic_id=.
    pub async fn list_notes(&self, topic_id: &str) -> ApiResult<Vec<Note>> {
        let mut notes: Vec<Note> = empty_on_missing(
            self.get("/notes/notes_in_topic", &[("topic_id", topic_id.to_string())])
                .await,
        )?;
        notes.retain(|n| is_valid_id(&n.id));
        Ok(notes)
    }

    /// GET /notes/my.
    pub async fn list_my_notes(&self) -> ApiResult<Vec<Note>> {
        let mut notes: Vec<Note> = empty_on_missing(self.get("/notes/my", &[]).await)?;
        notes.retain(|n| is_valid_id(&n.id));
        Ok(notes)
    }

    /// POST /notes/.
    pub async fn create_note(&self, request: &CreateNoteRequest) -> ApiResult<Note> {
        self.post_json("/notes/", request).await
    }

    /// DELETE /notes/{id}.
    pub async fn delete_note(&self, note_id: &str) -> ApiResult<()> {
        self.delete(&format!("/notes/{}", note_id)).await
    }

    /// POST /notes/give_like?note_id=.
    pub async fn give_like(&self, note_id: &str) -> ApiResult<()> {
        self.post_empty("/notes/give_like", &[("note_id", note_id.to_string())])
            .await
    }

    /// POST /notes/give_dislike?note_id=.
    pub async fn give_dislike(&self, note_id: &str) -> ApiResult<()> {
        self.post_empty("/notes/give_dislike", &[("note_id", note_id.to_string())])
            .await
    }
}

// Memberships
impl ApiClient {
    /// GET /organization_users/{org_id}.
    pub async fn list_members(&self, org_id: &str) -> ApiResult<Vec<Membership>> {
        empty_on_missing(
            self.get(&format!("/organization_users/{}", org_id), &[])
                .await,
        )
    }

    /// GET /organization_users/me — the caller's own membership rows.
    pub async fn my_memberships(&self) -> ApiResult<Vec<Membership>> {
        empty_on_missing(self.get("/organization_users/me", &[]).await)
    }

    /// POST /organization_users/{org_id}.
    pub async fn add_member(&self, org_id: &str, user_id: &str, role: Role) -> ApiResult<()> {
        let request = AddMemberRequest {
            user_id: user_id.to_string(),
            role,
        };
        let _: serde_json::Value = self
            .post_json(&format!("/organization_users/{}", org_id), &request)
            .await?;
        Ok(())
    }

    /// DELETE /organization_users/{org_id}/{user_id}.
    pub async fn remove_member(&self, org_id: &str, user_id: &str) -> ApiResult<()> {
        self.delete(&format!("/organization_users/{}/{}", org_id, user_id))
            .await
    }
}

// Invitations
impl ApiClient {
    /// GET /organization-invitations/my.
    pub async fn my_invitations(&self) -> ApiResult<Vec<Invitation>> {
        let mut invitations: Vec<Invitation> =
            empty_on_missing(self.get("/organization-invitations/my", &[]).await)?;
        invitations.retain(|i| is_valid_id(&i.invitation_id));
        Ok(invitations)
    }

    /// POST /organization-invitations/{id}/accept.
    pub async fn accept_invitation(&self, invitation_id: &str) -> ApiResult<()> {
        self.post_empty(
            &format!("/organization-invitations/{}/accept", invitation_id),
            &[],
        )
        .await
    }

    /// POST /organization-invitations/{id}/decline.
    pub async fn decline_invitation(&self, invitation_id: &str) -> ApiResult<()> {
        self.post_empty(
            &format!("/organization-invitations/{}/decline", invitation_id),
            &[],
        )
        .await
    }
}

// Uploads
impl ApiClient {
    /// POST /upload (multipart). Returns the stored file's URL.
    pub async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> ApiResult<UploadResponse> {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
        );
        self.post_multipart("/upload", form).await
    }
}
