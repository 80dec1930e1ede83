use std::time::Duration;

use course_agent_service::{
    AssistantServiceError, ErrorKind, Role, RunId, RunStatus, ThreadMessage,
};
use course_agent_test_service::{Call, PresetRun, TestAssistantService};

use crate::reply::NO_RESPONSE;
use crate::{RunOutcome, Session, SessionConfig, WaitOptions};

fn config() -> SessionConfig {
    SessionConfig::with_assistant_id("asst_courses")
}

#[tokio::test(start_paused = true)]
async fn test_start_creates_one_thread() {
    let service = TestAssistantService::default();
    let session = Session::start(service.clone(), config()).await.unwrap();

    assert_eq!(session.thread_id().as_str(), "thread_1");
    assert_eq!(session.config().assistant_id(), "asst_courses");
    assert_eq!(service.calls(), vec![Call::CreateThread]);
}

#[tokio::test(start_paused = true)]
async fn test_start_error() {
    let service = TestAssistantService::default();
    service.fail_next(ErrorKind::Unauthorized);
    let err = Session::start(service, config()).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test(start_paused = true)]
async fn test_single_turn() {
    let service = TestAssistantService::default();
    service.add_run(
        PresetRun::with_statuses([RunStatus::Queued, RunStatus::Completed])
            .with_reply("Start with CS 101."),
    );
    let session = Session::start(service.clone(), config()).await.unwrap();

    let outcome = session.send("Which course first?").await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed("Start with CS 101.".to_owned()));

    let thread_id = session.thread_id().clone();
    let run_id = RunId::from("run_3");
    assert_eq!(
        service.calls(),
        vec![
            Call::CreateThread,
            Call::PostMessage {
                thread_id: thread_id.clone(),
                content: "Which course first?".to_owned(),
            },
            Call::CreateRun {
                thread_id: thread_id.clone(),
                assistant_id: "asst_courses".to_owned(),
            },
            Call::GetRun {
                thread_id: thread_id.clone(),
                run_id: run_id.clone(),
            },
            Call::GetRun {
                thread_id: thread_id.clone(),
                run_id,
            },
            Call::ListMessages { thread_id },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_turns_reuse_the_thread() {
    let service = TestAssistantService::default();
    service.add_run(PresetRun::completed("first"));
    service.add_run(PresetRun::completed("second"));
    let session = Session::start(service.clone(), config()).await.unwrap();

    assert_eq!(
        session.send("one").await.unwrap(),
        RunOutcome::Completed("first".to_owned())
    );
    assert_eq!(
        session.send("two").await.unwrap(),
        RunOutcome::Completed("second".to_owned())
    );

    let calls = service.calls();
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::CreateThread)).count(),
        1
    );
    assert!(calls.iter().all(|call| match call {
        Call::CreateThread => true,
        Call::PostMessage { thread_id, .. }
        | Call::CreateRun { thread_id, .. }
        | Call::GetRun { thread_id, .. }
        | Call::ListMessages { thread_id } => thread_id == session.thread_id(),
    }));
}

#[tokio::test(start_paused = true)]
async fn test_missing_reply() {
    let service = TestAssistantService::default();
    service.add_run(PresetRun::with_statuses([RunStatus::Completed]));
    let session = Session::start(service, config()).await.unwrap();

    let outcome = session.send("hello").await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed(NO_RESPONSE.to_owned()));
}

#[tokio::test(start_paused = true)]
async fn test_reply_follows_service_order() {
    let service = TestAssistantService::default();
    service.add_run(PresetRun::completed("ignored"));
    service.set_messages(vec![
        ThreadMessage {
            id: "msg_3".to_owned(),
            role: Role::Assistant,
            text: "latest".to_owned(),
        },
        ThreadMessage {
            id: "msg_1".to_owned(),
            role: Role::Assistant,
            text: "older".to_owned(),
        },
    ]);
    let session = Session::start(service, config()).await.unwrap();

    let outcome = session.send("hello").await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed("latest".to_owned()));
}

#[tokio::test(start_paused = true)]
async fn test_failed_run_does_not_list_messages() {
    let service = TestAssistantService::default();
    service.add_run(
        PresetRun::with_statuses([RunStatus::Queued, RunStatus::Failed])
            .with_failure("Something went wrong."),
    );
    let session = Session::start(service.clone(), config()).await.unwrap();

    let outcome = session.send("hello").await.unwrap();
    assert_eq!(outcome, RunOutcome::Failed("Something went wrong.".to_owned()));
    assert!(
        !service
            .calls()
            .iter()
            .any(|call| matches!(call, Call::ListMessages { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_run() {
    let service = TestAssistantService::default();
    service.add_run(PresetRun::with_statuses([RunStatus::InProgress]));
    let config = config().with_wait_options(
        WaitOptions::default()
            .with_interval(Duration::from_millis(10))
            .with_max_polls(Some(3)),
    );
    let session = Session::start(service, config).await.unwrap();

    let outcome = session.send("hello").await.unwrap();
    assert_eq!(outcome, RunOutcome::TimedOut { polls: 3 });
}

#[tokio::test(start_paused = true)]
async fn test_service_error_propagates() {
    let service = TestAssistantService::default();
    let session = Session::start(service.clone(), config()).await.unwrap();

    // No preset run, so creating the run fails.
    let err = session.send("hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
}
