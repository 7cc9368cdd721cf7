//! Tests for before-request and after-request hooks of the todo server.

use super::*;

/// Tests that the bearer token hook authenticates requests that carry no token.
///
/// Expected: Ok with 200 and the test user's name
#[tokio::test]
async fn bearer_hook_authenticates_requests() -> Result<(), Error> {
    let session = start_todo_session("bearer_hook_authenticates_requests").await?;

    let response = session.get("/api/whoami").send().await?;
    response.expect_status(StatusCode::OK)?;
    assert_eq!(response.text(), "test-user");

    session.end().await
}

/// Tests that a token set by the test is not overwritten by the hook.
///
/// Expected: Ok with 401 for the wrong token
#[tokio::test]
async fn explicit_token_wins_over_hook() -> Result<(), Error> {
    let session = start_todo_session("explicit_token_wins_over_hook").await?;

    let response = session
        .get("/api/whoami")
        .bearer("wrong-token")
        .allow_log(LogFilter::matching(
            Level::WARN,
            "Missing or invalid API token",
        ))
        .send()
        .await?;
    response.expect_status(StatusCode::UNAUTHORIZED)?;

    session.end().await
}

/// Tests that after-request hooks see every response through a per-session service.
///
/// Expected: Ok with each session recording only its own statuses
#[tokio::test]
async fn after_request_hook_records_per_session() -> Result<(), Error> {
    use bulletprove_test_utils::fixtures::record::RecordedResponses;

    let manager = ServerManager::new();
    register_todo_server(&manager);

    let first = manager.start_session(TODO_SERVER, "first").await?;
    first.get("/api/health").send().await?;
    first
        .post("/api/todos")
        .json(&factory::create_todo("recorded"))
        .send()
        .await?;

    let second = manager.start_session(TODO_SERVER, "second").await?;
    second.get("/api/health").send().await?;

    assert_eq!(
        first.service::<RecordedResponses>()?.statuses(),
        [StatusCode::OK, StatusCode::CREATED]
    );
    assert_eq!(
        second.service::<RecordedResponses>()?.statuses(),
        [StatusCode::OK]
    );

    second.end().await?;
    first.end().await
}
