//! Integration tests for the assistant conversation flow over HTTP.
//!
//! Unit tests cover the state machine against an in-process fake; these
//! exercise the real wire path: session creation seeded with the profile
//! snapshot, tagged message decoding, context attachments, and the
//! retry and assignment round-trips.

mod common;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use therakit::api::SuggestedActivity;
use therakit::assistant::{
    AssignmentOutcome, AssistantFlow, MessageBody, MessageStatus, Role, SessionPhase,
};
use therakit::config::AssistantConfig;

use common::{goal_json, learner_json, wired_store};

fn no_context() -> AssistantConfig {
    AssistantConfig {
        attach_session_notes: false,
        notes_window_days: 30,
        attach_ai_preferences: false,
    }
}

fn suggestion(id: &str, name: &str) -> SuggestedActivity {
    SuggestedActivity {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        domain: None,
        difficulty_level: None,
        estimated_duration: None,
    }
}

#[tokio::test]
async fn test_first_send_creates_session_and_decodes_turn() {
    let server = MockServer::start().await;
    let (api, store, _dir) = wired_store(&server.uri());

    // Prime the roster so the session is seeded with a real profile.
    Mock::given(method("GET"))
        .and(path("/students"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([learner_json("child-1", "Maya Lin")])),
        )
        .mount(&server)
        .await;
    store
        .fetch_learners()
        .await
        .expect("roster fetch should succeed");

    // Session creation carries the learner profile snapshot.
    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session"))
        .and(body_string_contains("Maya Lin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "sess-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session/sess-1/message"))
        .and(body_string_contains("What should we work on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "sess-1",
            "messages": [
                {"kind": "text", "content": "Try these with Maya."},
                {"kind": "activities", "activities": [{
                    "id": "act-7",
                    "name": "Turn-taking games",
                    "description": "Simple board games",
                    "domain": "social",
                    "difficulty_level": "easy",
                    "estimated_duration": "15 minutes"
                }]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = AssistantFlow::new(api, store, "child-1").with_config(&no_context());

    let appended = flow
        .send("What should we work on?")
        .await
        .expect("send should not error");

    assert_eq!(appended.len(), 3);
    assert_eq!(appended[0].role, Role::User);
    assert_eq!(appended[0].status, MessageStatus::Normal);
    match &appended[1].body {
        MessageBody::Text { content } => assert_eq!(content, "Try these with Maya."),
        other => panic!("unexpected body: {}", other.kind()),
    }
    match &appended[2].body {
        MessageBody::Activities { activities } => {
            assert_eq!(activities.len(), 1);
            assert_eq!(activities[0].id, "act-7");
            assert_eq!(activities[0].domain.as_deref(), Some("social"));
        }
        other => panic!("unexpected body: {}", other.kind()),
    }

    assert!(!flow.is_busy());
    assert_eq!(flow.phase().session_id(), Some("sess-1"));
    assert_eq!(flow.transcript().len(), 3);
}

#[tokio::test]
async fn test_delivery_failure_is_retryable_and_retry_succeeds() {
    let server = MockServer::start().await;
    let (api, store, _dir) = wired_store(&server.uri());

    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "sess-1"})))
        .expect(1)
        .mount(&server)
        .await;
    // First delivery attempt fails, the retry lands.
    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session/sess-1/message"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "model overloaded"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session/sess-1/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "sess-1",
            "messages": [{"kind": "text", "content": "Here is a plan."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = AssistantFlow::new(api, store, "child-1").with_config(&no_context());

    let entries = flow
        .send("Plan the session")
        .await
        .expect("send should not error");
    assert_eq!(entries.len(), 2);

    let failure = &entries[1];
    assert_eq!(failure.status, MessageStatus::Error);
    assert!(failure.is_retryable());
    match &failure.body {
        MessageBody::Text { content } => {
            assert!(content.contains("The assistant did not answer"));
            assert!(content.contains("model overloaded"));
        }
        other => panic!("unexpected body: {}", other.kind()),
    }
    // The session survived the failed delivery.
    assert_eq!(flow.phase().session_id(), Some("sess-1"));

    let retried = flow
        .retry(&failure.id)
        .await
        .expect("retry should not error");
    assert_eq!(retried.len(), 1);
    match &retried[0].body {
        MessageBody::Text { content } => assert_eq!(content, "Here is a plan."),
        other => panic!("unexpected body: {}", other.kind()),
    }

    // The error entry is gone; user message and reply remain.
    assert_eq!(flow.transcript().len(), 2);
    assert!(flow.transcript().last_retryable().is_none());
}

#[tokio::test]
async fn test_assignment_refreshes_shared_goals_cache() {
    let server = MockServer::start().await;
    let (api, store, _dir) = wired_store(&server.uri());

    Mock::given(method("POST"))
        .and(path("/api/activities/assign"))
        .and(body_string_contains("act-7"))
        .and(body_string_contains("child-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    // The write-back after a successful assignment.
    Mock::given(method("GET"))
        .and(path("/api/learners/child-1/goals"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([goal_json("g1", "Turn-taking games", "in_progress")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = AssistantFlow::new(api, store.clone(), "child-1").with_config(&no_context());
    let activity = suggestion("act-7", "Turn-taking games");

    let outcome = flow.assign_activity(&activity).await;
    assert!(matches!(outcome, AssignmentOutcome::Assigned));
    assert!(flow.assigned_ids().contains("act-7"));

    // The refreshed goals are visible to every other store consumer.
    let goals = store.goals("child-1").expect("goals entry should exist");
    assert_eq!(goals.items.len(), 1);
    assert_eq!(goals.items[0].activity_name, "Turn-taking games");

    let confirmation = flow.transcript().last().expect("confirmation expected");
    assert_eq!(confirmation.status, MessageStatus::Normal);
    match &confirmation.body {
        MessageBody::System { content } => {
            assert!(content.contains("Assigned \"Turn-taking games\""));
        }
        other => panic!("unexpected body: {}", other.kind()),
    }

    // Repeating the assignment is a no-op, the mocks see no second call.
    let again = flow.assign_activity(&activity).await;
    assert!(matches!(again, AssignmentOutcome::AlreadyAssigned));
    assert_eq!(flow.transcript().len(), 1);
}

#[tokio::test]
async fn test_assignment_rejection_leaves_goals_untouched() {
    let server = MockServer::start().await;
    let (api, store, _dir) = wired_store(&server.uri());

    Mock::given(method("POST"))
        .and(path("/api/activities/assign"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Goal list is full"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    // A rejected assignment must not trigger a goals refresh.
    Mock::given(method("GET"))
        .and(path("/api/learners/child-1/goals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut flow = AssistantFlow::new(api, store.clone(), "child-1").with_config(&no_context());

    let outcome = flow
        .assign_activity(&suggestion("act-7", "Turn-taking games"))
        .await;
    assert!(matches!(outcome, AssignmentOutcome::Failed));
    assert!(flow.assigned_ids().is_empty());
    assert!(store.goals("child-1").is_none());

    let entry = flow.transcript().last().expect("failure entry expected");
    assert_eq!(entry.status, MessageStatus::Error);
    match &entry.body {
        MessageBody::System { content } => {
            assert!(content.contains("Could not assign \"Turn-taking games\""));
            assert!(content.contains("Goal list is full"));
        }
        other => panic!("unexpected body: {}", other.kind()),
    }
}

#[tokio::test]
async fn test_context_attachments_ride_along_with_message() {
    let server = MockServer::start().await;
    let (api, store, _dir) = wired_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/api/learners/child-1/ai-preferences"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"preferences": "Short visual prompts work best"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/notes"))
        .and(body_string_contains("child-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "session_id": "s1",
            "session_date": "2026-08-10",
            "therapist_notes": "Practiced turn-taking games"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "sess-1"})))
        .expect(1)
        .mount(&server)
        .await;
    // The message body must carry both attachments alongside the text.
    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session/sess-1/message"))
        .and(body_string_contains("Plan tomorrow"))
        .and(body_string_contains("Short visual prompts work best"))
        .and(body_string_contains("Practiced turn-taking games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "sess-1",
            "messages": [{"kind": "text", "content": "Build on the turn-taking work."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Default configuration attaches both kinds of context.
    let mut flow = AssistantFlow::new(api, store, "child-1");

    let entries = flow
        .send("Plan tomorrow")
        .await
        .expect("send should not error");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].status, MessageStatus::Normal);
    match &entries[1].body {
        MessageBody::Text { content } => assert_eq!(content, "Build on the turn-taking work."),
        other => panic!("unexpected body: {}", other.kind()),
    }
}

#[tokio::test]
async fn test_session_create_failure_stays_in_no_session() {
    let server = MockServer::start().await;
    let (api, store, _dir) = wired_store(&server.uri());

    Mock::given(method("POST"))
        .and(path("/api/activities/chat/session"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "session service down"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = AssistantFlow::new(api, store, "child-1").with_config(&no_context());

    let entries = flow.send("Hi").await.expect("send should not error");
    assert_eq!(entries.len(), 2);

    let failure = &entries[1];
    assert_eq!(failure.status, MessageStatus::Error);
    // No session existed yet, so there is nothing to retry into.
    assert!(!failure.is_retryable());
    match &failure.body {
        MessageBody::System { content } => {
            assert!(content.contains("Could not start the assistant session"));
            assert!(content.contains("session service down"));
        }
        other => panic!("unexpected body: {}", other.kind()),
    }

    assert!(matches!(flow.phase(), SessionPhase::NoSession));
    assert_eq!(flow.transcript().len(), 2);
}
