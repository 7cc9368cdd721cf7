//! Tests for the mock server reset hook.

use super::*;

/// Tests that upstream mocks registered in one test are gone in the next.
///
/// The first session mocks `/quote` and receives it through the application. After the
/// session ends the mock server is reset, so the second session's upstream call is
/// unmatched and the application reports a bad gateway.
///
/// Expected: Ok with 200 in the first session and 502 in the second
#[tokio::test]
async fn mocks_are_reset_between_sessions() -> Result<(), Error> {
    let manager = ServerManager::new();
    register_todo_server(&manager);

    let first = manager.start_session(TODO_SERVER, "first").await?;
    let upstream = first.service::<MockServer>()?;
    let mock = upstream
        .lock()
        .await
        .mock("GET", "/quote")
        .with_status(200)
        .with_body("carpe diem")
        .expect(1)
        .create_async()
        .await;

    let response = first.get("/api/quote").send().await?;
    response.expect_status(StatusCode::OK)?;
    assert_eq!(response.text(), "carpe diem");
    mock.assert_async().await;
    first.end().await?;

    let second = manager.start_session(TODO_SERVER, "second").await?;
    let response = second
        .get("/api/quote")
        .allow_log(LogFilter::matching(
            Level::ERROR,
            "Upstream quote service responded with status 501",
        ))
        .send()
        .await?;
    response.expect_status(StatusCode::BAD_GATEWAY)?;

    second.end().await
}
