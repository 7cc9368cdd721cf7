//! Tests for building requests and reading responses.

use super::*;

/// Tests a JSON create followed by a read of the created resource.
///
/// Expected: Ok with 201 on create and the same todo returned by id
#[tokio::test]
async fn creates_and_reads_json() -> Result<(), Error> {
    let session = start_todo_session("creates_and_reads_json").await?;

    let response = session
        .post("/api/todos")
        .json(&factory::create_todo("write docs"))
        .send()
        .await?;
    response.expect_status(StatusCode::CREATED)?;
    assert_eq!(response.header("content-type"), Some("application/json"));
    let created: TodoDto = response.json()?;
    assert_eq!(created.title, "write docs");
    assert!(!created.done);

    let fetched: TodoDto = session
        .get(&format!("/api/todos/{}", created.id))
        .send()
        .await?
        .json()?;
    assert_eq!(fetched, created);

    session.end().await
}

/// Tests that validation failures surface as client errors.
///
/// Expected: Ok with 400 and the validation message in the body
#[tokio::test]
async fn rejects_empty_title() -> Result<(), Error> {
    let session = start_todo_session("rejects_empty_title").await?;

    let response = session
        .post("/api/todos")
        .json(&factory::create_todo("   "))
        .allow_log(LogFilter::matching(Level::WARN, "Invalid todo"))
        .send()
        .await?;

    response.expect_status(StatusCode::BAD_REQUEST)?;
    assert!(response.text().contains("title must not be empty"));

    session.end().await
}

/// Tests that a deleted todo can no longer be read.
///
/// Expected: Ok with 204 on delete and 404 afterwards
#[tokio::test]
async fn deletes_todo() -> Result<(), Error> {
    let session = start_todo_session("deletes_todo").await?;

    let todos: Vec<TodoDto> = session.get("/api/todos").send().await?.json()?;
    let last = todos.last().expect("seeded todos");

    let response = session.delete(&format!("/api/todos/{}", last.id)).send().await?;
    response.expect_status(StatusCode::NO_CONTENT)?;
    assert!(response.bytes().is_empty());

    session
        .get(&format!("/api/todos/{}", last.id))
        .allow_log(LogFilter::matching(Level::WARN, "not found"))
        .send()
        .await?
        .expect_status(StatusCode::NOT_FOUND)?;

    session.end().await
}

/// Tests that a status mismatch reports both statuses and the body.
///
/// Expected: Err(Error::UnexpectedStatus) describing the 404
#[tokio::test]
async fn expect_status_reports_mismatch() -> Result<(), Error> {
    let session = start_todo_session("expect_status_reports_mismatch").await?;

    let response = session
        .get("/api/todos/404")
        .allow_log(LogFilter::matching(Level::WARN, "not found"))
        .send()
        .await?;

    match response.expect_status(StatusCode::OK) {
        Err(Error::UnexpectedStatus {
            expected,
            actual,
            body,
        }) => {
            assert_eq!(expected, StatusCode::OK);
            assert_eq!(actual, StatusCode::NOT_FOUND);
            assert!(body.contains("Todo not found"));
        }
        other => panic!("Expected UnexpectedStatus, got {:?}", other.err()),
    }

    session.end().await
}

/// Tests that an invalid header fails the send without reaching the server.
///
/// Expected: Err(Error::Http) and no response recorded by the after-request hook
#[tokio::test]
async fn invalid_header_fails_send() -> Result<(), Error> {
    use bulletprove_test_utils::fixtures::record::RecordedResponses;

    let session = start_todo_session("invalid_header_fails_send").await?;

    let result = session
        .get("/api/health")
        .header("bad header", "value")
        .send()
        .await;

    assert!(matches!(result, Err(Error::Http(_))));
    assert!(session.service::<RecordedResponses>()?.statuses().is_empty());

    session.end().await
}

/// Tests that a plain text body is passed to the handler unchanged.
///
/// Expected: Ok with 415 since the create route only accepts JSON
#[tokio::test]
async fn sends_raw_body() -> Result<(), Error> {
    let session = start_todo_session("sends_raw_body").await?;

    let response = session
        .post("/api/todos")
        .header("content-type", "text/plain")
        .body("not json")
        .send()
        .await?;

    response.expect_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)?;

    session.end().await
}
