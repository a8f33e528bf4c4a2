//! Orchestrator tests against a mock backend: delete ordering, selection
//! cascade, and dashboard locality.

use std::path::PathBuf;
use std::time::Duration;

use studyhub_api_client::ApiClient;
use studyhub_core::config::ClientConfig;
use studyhub_core::error::ApiError;
use studyhub_core::models::User;
use studyhub_core::store::{RatingStore, Session, SessionStore};
use studyhub_services::cascade::{CascadeAction, StepOutcome};
use studyhub_services::{Dashboard, SessionManager, Workspace};

fn client_for(server: &mockito::ServerGuard) -> ApiClient {
    let config = ClientConfig {
        base_url: server.url(),
        request_timeout: Duration::from_secs(5),
        state_dir: PathBuf::from("/tmp"),
    };
    ApiClient::new(&config).unwrap()
}

fn test_user(id: &str, email: &str) -> User {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": email,
        "username": "tester"
    }))
    .unwrap()
}

#[tokio::test]
async fn deleting_a_channel_deletes_notes_and_topics_before_the_channel() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("GET", "/organizations/1")
        .with_status(200)
        .with_body(r#"{"id": 1, "organization_name": "Math101"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 11, "channel_name": "Algebra", "organization_id": 1}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/topics/topics_in_channel")
        .match_query(mockito::Matcher::UrlEncoded("channel_id".into(), "11".into()))
        .with_status(200)
        .with_body(r#"[{"id": 21, "topic_name": "HW1", "channel_id": 11}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/notes/notes_in_topic")
        .match_query(mockito::Matcher::UrlEncoded("topic_id".into(), "21".into()))
        .with_status(200)
        .with_body(r#"[{"id": 31, "content": "Hello", "topic_id": 21}]"#)
        .create_async()
        .await;

    let delete_note = server
        .mock("DELETE", "/notes/31")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let delete_topic = server
        .mock("DELETE", "/topics/21")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let delete_channel = server
        .mock("DELETE", "/channels/11")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = client_for(&server);
    let mut workspace = Workspace::new(api, RatingStore::new(dir.path()), "1");
    workspace.load().await;
    assert_eq!(workspace.organization_name, "Math101");
    assert_eq!(workspace.channels.len(), 1);

    // After the delete, the sidebar must show zero channels.
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"detail": "No channels found in this organization"}"#)
        .create_async()
        .await;

    let report = workspace.delete_channel("11").await;

    delete_note.assert_async().await;
    delete_topic.assert_async().await;
    delete_channel.assert_async().await;

    // Child deletes are issued before their parents.
    let actions: Vec<CascadeAction> = report.steps.iter().map(|s| s.action).collect();
    assert_eq!(
        actions,
        vec![
            CascadeAction::DeleteNote,
            CascadeAction::DeleteTopic,
            CascadeAction::DeleteChannel,
        ]
    );
    assert!(report.is_clean());

    assert!(workspace.channels.is_empty());
    assert!(workspace.selected_channel.is_none());
    assert!(workspace.selected_topic.is_none());
    assert!(workspace.notes.is_empty());
}

#[tokio::test]
async fn channel_delete_continues_past_failing_topic_deletes() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("GET", "/topics/topics_in_channel")
        .match_query(mockito::Matcher::UrlEncoded("channel_id".into(), "5".into()))
        .with_status(200)
        .with_body(
            r#"[{"id": 51, "topic_name": "a", "channel_id": 5},
                {"id": 52, "topic_name": "b", "channel_id": 5}]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/notes/notes_in_topic")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"detail": "No notes found in this topic"}"#)
        .create_async()
        .await;
    server
        .mock("DELETE", "/topics/51")
        .with_status(500)
        .with_body(r#"{"detail": "boom"}"#)
        .create_async()
        .await;
    let second_topic = server
        .mock("DELETE", "/topics/52")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let channel = server
        .mock("DELETE", "/channels/5")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"detail": "No channels found in this organization"}"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut workspace = Workspace::new(api, RatingStore::new(dir.path()), "1");
    // No prior load: topics are enumerated on demand.
    let report = workspace.delete_channel("5").await;

    // The failed first topic did not stop the second, nor the channel.
    second_topic.assert_async().await;
    channel.assert_async().await;
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.steps[0].outcome, StepOutcome::Failed(_)));
    assert_eq!(report.succeeded(), 2);
}

#[tokio::test]
async fn selecting_a_channel_without_topics_clears_dependent_state() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("GET", "/organizations/2")
        .with_status(404)
        .with_body(r#"{"detail": "Organization not found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "channel_name": "full", "organization_id": 2},
                {"id": 2, "channel_name": "empty", "organization_id": 2}]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/topics/topics_in_channel")
        .match_query(mockito::Matcher::UrlEncoded("channel_id".into(), "1".into()))
        .with_status(200)
        .with_body(r#"[{"id": 10, "topic_name": "t", "channel_id": 1}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/topics/topics_in_channel")
        .match_query(mockito::Matcher::UrlEncoded("channel_id".into(), "2".into()))
        .with_status(404)
        .with_body(r#"{"detail": "No topics found in this channel"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/notes/notes_in_topic")
        .match_query(mockito::Matcher::UrlEncoded("topic_id".into(), "10".into()))
        .with_status(200)
        .with_body(r#"[{"id": 100, "content": "hi", "topic_id": 10}]"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut workspace = Workspace::new(api, RatingStore::new(dir.path()), "2");
    workspace.load().await;
    // Name lookup failed; the placeholder label is used and loading went on.
    assert_eq!(workspace.organization_name, "Organization 2");

    workspace.select_channel("1").await.unwrap();
    assert_eq!(workspace.selected_topic.as_deref(), Some("10"));
    assert_eq!(workspace.notes.len(), 1);

    workspace.select_channel("2").await.unwrap();
    assert!(workspace.selected_topic.is_none());
    assert!(workspace.notes.is_empty());

    let err = workspace.select_channel("99").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn failed_topic_create_leaves_selection_untouched() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("POST", "/topics/")
        .with_status(409)
        .with_body(r#"{"detail": "Topic name already exists"}"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut workspace = Workspace::new(api, RatingStore::new(dir.path()), "2");
    workspace.selected_channel = Some("1".to_string());
    workspace.selected_topic = Some("10".to_string());

    let err = workspace.create_topic("1", "t").await.unwrap_err();
    assert!(matches!(err, ApiError::Duplicate { .. }));
    assert_eq!(workspace.selected_channel.as_deref(), Some("1"));
    assert_eq!(workspace.selected_topic.as_deref(), Some("10"));
}

#[tokio::test]
async fn leaving_an_organization_removes_only_that_one() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/organizations/my")
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "organization_name": "Math101"},
                {"id": 2, "organization_name": "Physics201"}]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/organization_users/1")
        .with_status(404)
        .with_body(r#"{"detail": "No members found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/organization_users/2")
        .with_status(404)
        .with_body(r#"{"detail": "No members found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"detail": "No channels found in this organization"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/organization-invitations/my")
        .with_status(404)
        .with_body(r#"{"detail": "No invitations found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/organization_users/me")
        .with_status(200)
        .with_body(r#"[{"organization_id": 2, "user_id": 7, "role": "member"}]"#)
        .create_async()
        .await;
    let leave = server
        .mock("DELETE", "/organization_users/2/7")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = client_for(&server);
    let mut dashboard = Dashboard::new(api, test_user("7", "tester@example.com"));
    dashboard.load().await;
    assert_eq!(dashboard.organizations.len(), 2);
    // Member/channel count endpoints answered 404; both read as zero.
    assert_eq!(dashboard.organizations[0].member_count, 0);
    assert_eq!(dashboard.organizations[0].channel_count, 0);

    dashboard.leave_organization("2").await.unwrap();
    leave.assert_async().await;
    assert_eq!(dashboard.organizations.len(), 1);
    assert_eq!(dashboard.organizations[0].organization.id, "1");
}

#[tokio::test]
async fn organization_delete_cascade_reaches_every_level() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/organization_users/9")
        .with_status(200)
        .with_body(r#"[{"organization_id": 9, "user_id": 7, "role": "owner"}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::UrlEncoded(
            "organization_id".into(),
            "9".into(),
        ))
        .with_status(200)
        .with_body(r#"[{"id": 11, "channel_name": "Algebra", "organization_id": 9}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/topics/topics_in_channel")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 21, "topic_name": "HW1", "channel_id": 11}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/notes/notes_in_topic")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 31, "content": "Hello", "topic_id": 21}]"#)
        .create_async()
        .await;

    let mocks = [
        server
            .mock("DELETE", "/organization_users/9/7")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await,
        server
            .mock("DELETE", "/notes/31")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await,
        server
            .mock("DELETE", "/topics/21")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await,
        server
            .mock("DELETE", "/channels/11")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await,
        server
            .mock("DELETE", "/organizations/9")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await,
    ];

    let api = client_for(&server);
    let mut dashboard = Dashboard::new(api, test_user("7", "tester@example.com"));
    let report = dashboard.delete_organization("9").await;

    for mock in &mocks {
        mock.assert_async().await;
    }

    let actions: Vec<CascadeAction> = report.steps.iter().map(|s| s.action).collect();
    assert_eq!(
        actions,
        vec![
            CascadeAction::DeleteMembership,
            CascadeAction::DeleteNote,
            CascadeAction::DeleteTopic,
            CascadeAction::DeleteChannel,
            CascadeAction::DeleteOrganization,
        ]
    );
    assert!(report.is_clean());
}

#[tokio::test]
async fn organization_delete_attempts_top_level_despite_cascade_failures() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/organization_users/9")
        .with_status(404)
        .with_body(r#"{"detail": "No members found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 11, "channel_name": "Algebra", "organization_id": 9}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/topics/topics_in_channel")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"detail": "No topics found in this channel"}"#)
        .create_async()
        .await;
    server
        .mock("DELETE", "/channels/11")
        .with_status(500)
        .with_body(r#"{"detail": "boom"}"#)
        .create_async()
        .await;
    let org_delete = server
        .mock("DELETE", "/organizations/9")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = client_for(&server);
    let mut dashboard = Dashboard::new(api, test_user("7", "tester@example.com"));
    let report = dashboard.delete_organization("9").await;

    org_delete.assert_async().await;
    assert_eq!(report.failed(), 1);
    assert_eq!(
        report.steps.last().unwrap().action,
        CascadeAction::DeleteOrganization
    );
    assert_eq!(report.steps.last().unwrap().outcome, StepOutcome::Ok);
}

#[tokio::test]
async fn accepting_an_invitation_removes_it_and_reloads_organizations() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/organizations/my")
        .with_status(404)
        .with_body(r#"{"detail": "No organizations found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/organization-invitations/my")
        .with_status(200)
        .with_body(
            r#"[{"id": 5, "organization_id": 3, "email": "tester@example.com", "status": "pending"},
                {"id": 6, "organization_id": 4, "email": "tester@example.com", "status": "declined"}]"#,
        )
        .create_async()
        .await;
    let accept = server
        .mock("POST", "/organization-invitations/5/accept")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = client_for(&server);
    let mut dashboard = Dashboard::new(api, test_user("7", "tester@example.com"));
    dashboard.load().await;
    // Only pending invitations are listed.
    assert_eq!(dashboard.invitations.len(), 1);

    // The reload after accepting sees the new organization.
    server
        .mock("GET", "/organizations/my")
        .with_status(200)
        .with_body(r#"[{"id": 3, "organization_name": "Math101"}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/organization_users/3")
        .with_status(404)
        .with_body(r#"{"detail": "No members found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/channels/channels_in_orgazation")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"detail": "No channels found in this organization"}"#)
        .create_async()
        .await;

    dashboard.accept_invitation("5").await.unwrap();
    accept.assert_async().await;
    assert!(dashboard.invitations.is_empty());
    assert_eq!(dashboard.organizations.len(), 1);
}

#[tokio::test]
async fn unauthorized_on_a_swallowed_read_still_clears_stored_credentials() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("GET", "/organizations/my")
        .with_status(401)
        .with_body(r#"{"detail": "Could not validate credentials"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/organization-invitations/my")
        .with_status(401)
        .with_body(r#"{"detail": "Could not validate credentials"}"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let store = SessionStore::new(dir.path());
    let session = SessionManager::new(api.clone(), store.clone());
    store
        .save(&Session {
            token: "stale".to_string(),
            user: test_user("7", "tester@example.com"),
        })
        .unwrap();
    let restored = session.restore().expect("stored session");
    assert!(api.has_token());

    // The dashboard degrades the 401 to an empty view, but the credentials
    // must not survive it.
    let mut dashboard = Dashboard::new(api.clone(), restored.user);
    dashboard.load().await;
    assert!(dashboard.organizations.is_empty());

    assert!(!api.has_token());
    assert!(store.load().unwrap().is_none());
    assert!(session.current().is_none());
}

#[tokio::test]
async fn sending_a_note_derives_the_title_and_reloads() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let long_content = "x".repeat(60);
    let expected_title = format!("{}...", "x".repeat(50));

    let create = server
        .mock("POST", "/notes/")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "title": expected_title,
            "content_type": "text",
            "topic_id": "10",
        })))
        .with_status(200)
        .with_body(r#"{"id": 100, "content": "...", "topic_id": 10}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/notes/notes_in_topic")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 100, "content": "...", "topic_id": 10}]"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut workspace = Workspace::new(api, RatingStore::new(dir.path()), "2");
    workspace.selected_topic = Some("10".to_string());

    workspace.send_note(&long_content).await.unwrap();
    create.assert_async().await;
    assert_eq!(workspace.notes.len(), 1);

    // Whitespace-only content never reaches the backend.
    let err = workspace.send_note("   ").await.unwrap_err();
    assert!(err.validation_summary().unwrap().contains("content"));
}

#[tokio::test]
async fn like_toggle_is_optimistic_and_reverts_on_failure() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("POST", "/notes/give_like")
        .match_query(mockito::Matcher::UrlEncoded("note_id".into(), "100".into()))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = client_for(&server);
    let mut workspace = Workspace::new(api, RatingStore::new(dir.path()), "2");
    workspace.notes = vec![serde_json::from_value(serde_json::json!({
        "id": 100, "content": "hi", "topic_id": 10, "likes": 3
    }))
    .unwrap()];

    let likes = workspace.toggle_like("100").await.unwrap();
    assert_eq!(likes, 4);
    // Toggling again withdraws the like.
    let likes = workspace.toggle_like("100").await.unwrap();
    assert_eq!(likes, 3);

    // A failing backend call reverts the optimistic bump.
    server
        .mock("POST", "/notes/give_like")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body(r#"{"detail": "boom"}"#)
        .create_async()
        .await;
    assert!(workspace.toggle_like("100").await.is_err());
    assert_eq!(workspace.notes[0].likes, 3);
}
