//! Tests for opening sessions through the process-wide manager.

use std::sync::atomic::{AtomicUsize, Ordering};

use bulletprove_test_utils::{
    app::{self, AppState},
    setup::connect_database,
};

use super::*;

/// Tests that the global manager builds a server once and reuses it across sessions.
///
/// Expected: Ok with both sessions sharing one server and ids increasing
#[tokio::test]
async fn global_manager_reuses_server() -> Result<(), Error> {
    let manager = ServerManager::global()?;
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);

    manager.register("global_manager_reuses_server", move |builder| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(builder.with_router(echo_router())) }
    });

    let first = manager
        .start_session("global_manager_reuses_server", "first")
        .await?;
    let second = manager
        .start_session("global_manager_reuses_server", "second")
        .await?;

    assert!(Arc::ptr_eq(first.server(), second.server()));
    assert!(second.id() > first.id());
    assert_eq!(first.test_name(), "first");
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(manager
        .running()
        .iter()
        .any(|name| name == "global_manager_reuses_server"));

    first.end().await?;
    second.end().await
}

/// Tests that opening a session on an unknown server fails.
///
/// Expected: Err(Error::ServerNotRegistered) naming the server
#[tokio::test]
async fn unknown_server_fails() {
    let result = ServerManager::global()
        .expect("environment should hold a valid configuration")
        .start_session("no-such-server", "unknown_server_fails")
        .await;

    assert!(matches!(
        result,
        Err(Error::ServerNotRegistered(ref name)) if name == "no-such-server"
    ));
}

/// Tests that a session without a required service reports which type is missing.
///
/// Expected: Err(Error::ServiceNotRegistered) from the session scope
#[tokio::test]
async fn missing_service_is_reported() -> Result<(), Error> {
    let manager = echo_manager(|builder| builder.with_service(7_u64));
    let session = manager.start_session("echo", "missing_service_is_reported").await?;

    assert_eq!(*session.service::<u64>()?, 7);
    assert!(matches!(
        session.service::<String>(),
        Err(Error::ServiceNotRegistered(_))
    ));

    session.end().await
}

/// Tests many sessions running in parallel against one database-backed server.
///
/// Every session creates, reads and completes its own todos while the others do the same,
/// so database work from all sessions shares the server's connection pool.
///
/// Expected: Ok with every session seeing its own todos and capturing only its own events
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_sessions_share_database_server() -> Result<(), Error> {
    init_test_logging();

    let manager = Arc::new(ServerManager::new());
    manager.register("shared-db", |builder| async move {
        let state = AppState::new(connect_database().await?, "http://127.0.0.1:9");

        Ok(builder
            .with_service(state.db.clone())
            .with_router(app::router(state)))
    });

    let handles: Vec<_> = (0..16)
        .map(|index| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                let session = manager
                    .start_session("shared-db", format!("parallel-{}", index))
                    .await?;

                let mut created = Vec::new();
                for round in 0..5 {
                    let todo: TodoDto = session
                        .post("/api/todos")
                        .json(&factory::create_todo(format!("todo {}-{}", index, round)))
                        .send()
                        .await?
                        .expect_status(StatusCode::CREATED)?
                        .json()?;

                    session
                        .post(&format!("/api/todos/{}/complete", todo.id))
                        .send()
                        .await?
                        .expect_status(StatusCode::OK)?;
                    created.push(todo.id);
                }

                let listed: Vec<TodoDto> = session.get("/api/todos").send().await?.json()?;
                for id in &created {
                    assert!(listed.iter().any(|t| t.id == *id && t.done));
                }

                let mut logged: Vec<String> = session
                    .logs()
                    .events()
                    .into_iter()
                    .filter(|e| e.message == "Created todo")
                    .filter_map(|e| e.fields.get("todo_id").cloned())
                    .collect();
                logged.sort();
                let mut expected: Vec<String> = created.iter().map(i32::to_string).collect();
                expected.sort();
                assert_eq!(logged, expected);

                session.end().await
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("session task panicked")?;
    }

    Ok(())
}
