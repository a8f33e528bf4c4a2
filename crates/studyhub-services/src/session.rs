//! Auth facade.
//!
//! Owns the session lifecycle end to end: login installs the bearer token and
//! persists the session file, logout and 401 handling clear both. When the
//! backend is unreachable, login falls back to a small built-in demo-user
//! table so the client stays usable offline; a normal auth rejection never
//! hits the fallback.

use studyhub_api_client::ApiClient;
use studyhub_core::error::{ApiError, ApiResult};
use studyhub_core::models::{RegisterRequest, User};
use studyhub_core::store::{Session, SessionStore};

/// Accounts accepted only when the backend cannot be reached at all.
const DEMO_USERS: &[(&str, &str, &str)] = &[
    ("demo", "demo123", "Demo Student"),
    ("teacher", "teach123", "Demo Teacher"),
];

const OFFLINE_TOKEN: &str = "offline-demo-token";

#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    store: SessionStore,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        // Any 401 on any clone of the client wipes the persisted session.
        api.attach_session_store(store.clone());
        Self { api, store }
    }

    /// Reinstall the token from a stored session, if any. Returns the session
    /// so callers can greet the user.
    pub fn restore(&self) -> Option<Session> {
        match self.store.load() {
            Ok(Some(session)) => {
                self.api.set_token(&session.token);
                Some(session)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session file, treating as logged out");
                None
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        match self.api.login(username, password).await {
            Ok(token) => {
                self.api.set_token(&token.access_token);
                let user = self.resolve_profile(username).await?;
                let session = Session {
                    token: token.access_token,
                    user,
                };
                self.persist(&session);
                Ok(session)
            }
            Err(ApiError::Network(e)) => {
                tracing::warn!(error = %e, "backend unreachable, trying demo fallback");
                match demo_session(username, password) {
                    Some(session) => {
                        self.api.set_token(&session.token);
                        self.persist(&session);
                        Ok(session)
                    }
                    None => Err(ApiError::Network(e)),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the authenticated user's profile. The token endpoint does not
    /// return profile fields, so they come from /auth/me, with /users/ as a
    /// lookup fallback for backends that lack that route.
    async fn resolve_profile(&self, username: &str) -> ApiResult<User> {
        match self.api.me().await {
            Ok(user) => Ok(user),
            Err(err) => {
                tracing::debug!(error = %err, "auth/me unavailable, scanning user list");
                let users = self.api.list_users().await.unwrap_or_default();
                users
                    .into_iter()
                    .find(|u| {
                        u.username.eq_ignore_ascii_case(username)
                            || u.email.eq_ignore_ascii_case(username)
                    })
                    .ok_or(err)
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        self.api.register(request).await
    }

    pub fn logout(&self) {
        self.api.clear_token();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to remove session file");
        }
    }

    /// Global 401 handling: drop credentials so the next action prompts a
    /// fresh login.
    pub fn invalidate(&self) {
        self.logout();
    }

    pub fn current(&self) -> Option<Session> {
        self.store.load().ok().flatten()
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session) {
            tracing::warn!(error = %e, "failed to persist session, login is memory-only");
        }
    }
}

fn demo_session(username: &str, password: &str) -> Option<Session> {
    DEMO_USERS
        .iter()
        .position(|(name, pw, _)| *name == username && *pw == password)
        .map(|idx| {
            let (name, _, display) = DEMO_USERS[idx];
            let mut parts = display.splitn(2, ' ');
            let first = parts.next().unwrap_or(name).to_string();
            let last = parts.next().unwrap_or("").to_string();
            let user: User = serde_json::from_value(serde_json::json!({
                "id": (idx + 1).to_string(),
                "email": format!("{}@studyhub.local", name),
                "username": name,
                "first_name": first,
                "last_name": last,
            }))
            .expect("demo user shape is valid");
            Session {
                token: OFFLINE_TOKEN.to_string(),
                user,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_fallback_accepts_known_pair_only() {
        assert!(demo_session("demo", "demo123").is_some());
        assert!(demo_session("demo", "wrong").is_none());
        assert!(demo_session("nobody", "demo123").is_none());
    }

    #[test]
    fn demo_session_has_profile_fields() {
        let session = demo_session("teacher", "teach123").unwrap();
        assert_eq!(session.token, OFFLINE_TOKEN);
        assert_eq!(session.user.first_name, "Demo");
        assert_eq!(session.user.last_name, "Teacher");
        assert_eq!(session.user.email, "teacher@studyhub.local");
    }
}
