use super::*;
use crate::testing::{MockArtifactStore, MockClient, MockWorkspace, RecordingMessenger, deps_with};
use refassist_core::workflow::{UserIntent, WorkflowStatus};
use std::time::Duration;

struct Fixture {
    supervisor: SessionSupervisor,
    client: Arc<MockClient>,
    events: Arc<RecordingMessenger>,
}

fn spawn_with(client: MockClient, session: ConversationSession) -> Fixture {
    let client = Arc::new(client);
    let events = Arc::new(RecordingMessenger::default());
    let deps = deps_with(
        client.clone(),
        MockWorkspace::with_files(),
        Arc::new(MockArtifactStore::default()),
    );
    let messenger = SessionMessenger::new(session.session_id().to_string(), events.clone());
    Fixture {
        supervisor: SessionSupervisor::spawn(session, deps, messenger),
        client,
        events,
    }
}

fn spawn(client: MockClient) -> Fixture {
    spawn_with(client, ConversationSession::new("tab-1"))
}

fn endless_progress() -> Vec<refassist_core::Result<WorkflowStatus>> {
    (0..10_000).map(|_| Ok(WorkflowStatus::InProgress)).collect()
}

#[tokio::test]
async fn back_to_back_sends_observe_previous_state() {
    let fixture = spawn(
        MockClient::new()
            .with_assessment_statuses(vec![
                Ok(WorkflowStatus::InProgress),
                Ok(WorkflowStatus::Completed),
            ])
            .with_status_delay(Duration::from_millis(30))
            .with_intent(Ok(UserIntent::QuestionAndAnswer)),
    );

    let _first = fixture.supervisor.send("refactor my monolith");
    let _second = fixture.supervisor.send("No, let's start");
    let third = fixture.supervisor.send("explain analysis");

    let state = third.wait().await.unwrap();

    assert_eq!(state, ConversationState::PlanGenerationFollowup);
    assert_eq!(fixture.client.count("create_engagement"), 1);
    assert_eq!(fixture.client.count("derive_user_intent"), 1);

    let calls = fixture.client.calls();
    let download = calls
        .iter()
        .position(|c| c.starts_with("download_artifact"))
        .unwrap();
    let derive = calls
        .iter()
        .position(|c| c.starts_with("derive_user_intent"))
        .unwrap();
    assert!(download < derive, "third send ran before the second finished");
}

#[tokio::test]
async fn cancel_interrupts_polling_and_stops_the_assessment() {
    let fixture = spawn(
        MockClient::new()
            .with_assessment_statuses(endless_progress())
            .with_status_delay(Duration::from_millis(5)),
    );
    let mut snapshots = fixture.supervisor.subscribe();

    fixture.supervisor.send("refactor my monolith");
    let plan = fixture.supervisor.send("No, let's start");

    snapshots
        .wait_for(|s| s.busy && s.state == ConversationState::GenerateInitialPlan)
        .await
        .unwrap();
    assert!(fixture.supervisor.snapshot().busy);
    assert!(fixture.supervisor.cancel());

    let state = plan.wait().await.unwrap();

    assert_eq!(state, ConversationState::StartOfConversation);
    assert_eq!(fixture.client.count("stop_assessment"), 1);
    assert_eq!(fixture.client.count("download_artifact"), 0);
    assert!(!fixture.supervisor.snapshot().busy);
}

#[tokio::test]
async fn cancel_without_running_job_is_a_no_op() {
    let fixture = spawn(MockClient::new());

    assert!(!fixture.supervisor.cancel());

    let state = fixture
        .supervisor
        .send("refactor my monolith")
        .wait()
        .await
        .unwrap();
    assert_eq!(state, ConversationState::GenerateInitialPlan);
    assert!(!fixture.supervisor.cancel());
}

#[tokio::test]
async fn sends_wait_while_unauthenticated() {
    let fixture = spawn(MockClient::new());
    fixture.supervisor.auth_changed(false);

    let handle = fixture.supervisor.send("refactor my monolith");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let snapshot = fixture.supervisor.snapshot();
    assert!(snapshot.is_authenticating);
    assert_eq!(snapshot.state, ConversationState::StartOfConversation);
    assert!(fixture.events.events().is_empty());

    fixture.supervisor.auth_changed(true);
    let state = handle.wait().await.unwrap();

    assert_eq!(state, ConversationState::GenerateInitialPlan);
    assert!(!fixture.supervisor.snapshot().is_authenticating);
}

#[tokio::test]
async fn illegal_state_is_returned_to_the_caller() {
    let mut session = ConversationSession::new("tab-1");
    session.state = ConversationState::ConversationNotStarted;
    let fixture = spawn_with(MockClient::new(), session);

    let err = fixture.supervisor.send("hello").wait().await.unwrap_err();

    assert!(err.is_illegal_state());
    assert_eq!(
        fixture.supervisor.state(),
        ConversationState::ConversationNotStarted
    );
}

#[tokio::test]
async fn disposed_supervisor_rejects_new_work() {
    let fixture = spawn(MockClient::new());

    fixture.supervisor.dispose();
    tokio::task::yield_now().await;

    assert!(fixture.supervisor.is_disposed());
    let err = fixture.supervisor.send("hello").wait().await.unwrap_err();
    assert!(matches!(err, RefAssistError::Internal(_)));
}

#[tokio::test]
async fn snapshot_tracks_remote_identifiers() {
    let fixture = spawn(MockClient::new());

    fixture.supervisor.send("refactor my monolith");
    fixture
        .supervisor
        .send("No, let's start")
        .wait()
        .await
        .unwrap();

    let snapshot = fixture.supervisor.snapshot();
    assert_eq!(snapshot.session_id, "tab-1");
    assert_eq!(snapshot.state, ConversationState::PlanGenerationFollowup);
    assert_eq!(snapshot.engagement_id.as_deref(), Some("E1"));
    assert_eq!(snapshot.assessment_id.as_deref(), Some("A1"));
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn help_runs_while_unauthenticated() {
    let fixture = spawn(MockClient::new());
    fixture.supervisor.auth_changed(false);

    let state = fixture.supervisor.help().wait().await.unwrap();

    assert_eq!(state, ConversationState::StartOfConversation);
    assert_eq!(
        fixture.events.answers(),
        vec![crate::conversation::messages::HELP]
    );
    assert!(fixture.client.calls().is_empty());
}

#[tokio::test]
async fn help_is_queued_behind_pending_utterances() {
    let fixture = spawn(MockClient::new());

    fixture.supervisor.send("refactor my monolith");
    let _plan = fixture.supervisor.send("No, let's start");
    let state = fixture.supervisor.help().wait().await.unwrap();

    assert_eq!(state, ConversationState::StartOfConversation);
    assert_eq!(fixture.client.count("download_artifact"), 1);
    assert!(!fixture.supervisor.cancel());

    let snapshot = fixture.supervisor.snapshot();
    assert_eq!(snapshot.state, ConversationState::StartOfConversation);
    assert_eq!(snapshot.assessment_id.as_deref(), Some("A1"));
}
