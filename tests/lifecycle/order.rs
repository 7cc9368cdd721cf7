//! Tests for the order in which lifecycle phases and hooks run.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::{body::Body, http::Request};

use super::*;

/// Hook appending `<label>:<phase>` to a shared journal in every phase.
#[derive(Clone)]
struct Recorder {
    label: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn new(label: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            label,
            journal: Arc::clone(journal),
        }
    }

    fn record(&self, phase: &str) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, phase));
    }
}

#[async_trait]
impl BeforeTest for Recorder {
    async fn before_test(&self, _ctx: &HookContext) -> Result<(), Error> {
        self.record("before-test");
        Ok(())
    }
}

#[async_trait]
impl BeforeRequest for Recorder {
    async fn before_request(
        &self,
        _ctx: &HookContext,
        _request: &mut Request<Body>,
    ) -> Result<(), Error> {
        self.record("before-request");
        Ok(())
    }
}

#[async_trait]
impl AfterRequest for Recorder {
    async fn after_request(
        &self,
        _ctx: &HookContext,
        _response: &TestResponse,
    ) -> Result<(), Error> {
        self.record("after-request");
        Ok(())
    }
}

#[async_trait]
impl AfterTest for Recorder {
    async fn after_test(&self, _ctx: &HookContext) -> Result<(), Error> {
        self.record("after-test");
        Ok(())
    }
}

#[async_trait]
impl Cleanup for Recorder {
    async fn cleanup(&self, _ctx: &HookContext) -> Result<(), Error> {
        self.record("cleanup");
        Ok(())
    }
}

/// Hook failing in whichever phase it is registered for.
struct Failing;

#[async_trait]
impl BeforeTest for Failing {
    async fn before_test(&self, _ctx: &HookContext) -> Result<(), Error> {
        Err(Error::custom("seed failed"))
    }
}

#[async_trait]
impl AfterTest for Failing {
    async fn after_test(&self, _ctx: &HookContext) -> Result<(), Error> {
        Err(Error::custom("report failed"))
    }
}

#[async_trait]
impl BeforeRequest for Failing {
    async fn before_request(
        &self,
        _ctx: &HookContext,
        _request: &mut Request<Body>,
    ) -> Result<(), Error> {
        Err(Error::custom("signing failed"))
    }
}

#[async_trait]
impl AfterRequest for Failing {
    async fn after_request(
        &self,
        _ctx: &HookContext,
        _response: &TestResponse,
    ) -> Result<(), Error> {
        Err(Error::custom("recording failed"))
    }
}

fn register_all(builder: ServerBuilder, recorder: &Recorder) -> ServerBuilder {
    builder
        .with_before_test(recorder.clone())
        .with_before_request(recorder.clone())
        .with_after_request(recorder.clone())
        .with_after_test(recorder.clone())
        .with_cleanup(recorder.clone())
}

/// Tests that phases run in lifecycle order and hooks within a phase in registration order.
///
/// Expected: Ok with the journal listing each phase for `a` then `b`
#[tokio::test]
async fn phases_run_in_lifecycle_order() -> Result<(), Error> {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let first = Recorder::new("a", &journal);
    let second = Recorder::new("b", &journal);

    let manager = echo_manager(move |builder| {
        let builder = register_all(builder, &first);
        register_all(builder, &second)
    });

    let session = manager.start_session("echo", "phases_run_in_lifecycle_order").await?;
    session
        .get("/echo/hello")
        .send()
        .await?
        .expect_status(StatusCode::OK)?;
    session.end().await?;

    let expected = [
        "a:before-test",
        "b:before-test",
        "a:before-request",
        "b:before-request",
        "a:after-request",
        "b:after-request",
        "a:after-test",
        "b:after-test",
        "a:cleanup",
        "b:cleanup",
    ];
    assert_eq!(*journal.lock().unwrap(), expected);

    Ok(())
}

/// Tests that a failing before-test hook stops the phase and no session is returned.
///
/// Expected: Err(Error::HookFailed) naming the before-test phase, later hooks not run
#[tokio::test]
async fn failing_before_test_hook_aborts_session() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::new("a", &journal);

    let manager = echo_manager(move |builder| {
        builder
            .with_before_test(Failing)
            .with_before_test(recorder.clone())
            .with_cleanup(recorder.clone())
    });

    let result = manager
        .start_session("echo", "failing_before_test_hook_aborts_session")
        .await;

    match result {
        Err(Error::HookFailed { phase, hook, source }) => {
            assert_eq!(phase, "before-test");
            assert!(hook.ends_with("Failing"), "Unexpected hook name {}", hook);
            assert!(source.to_string().contains("seed failed"));
        }
        Err(e) => panic!("Expected HookFailed, got {}", e),
        Ok(_) => panic!("Expected the session to fail to start"),
    }

    assert!(journal.lock().unwrap().is_empty());
}

/// Tests that cleanup hooks still run when an after-test hook fails.
///
/// Expected: Err(Error::HookFailed) for after-test with cleanup recorded
#[tokio::test]
async fn cleanup_runs_after_failed_after_test() -> Result<(), Error> {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::new("a", &journal);

    let manager = echo_manager(move |builder| {
        builder
            .with_after_test(Failing)
            .with_after_test(recorder.clone())
            .with_cleanup(recorder.clone())
    });

    let session = manager
        .start_session("echo", "cleanup_runs_after_failed_after_test")
        .await?;
    let result = session.end().await;

    assert!(matches!(
        result,
        Err(Error::HookFailed { phase: "after-test", .. })
    ));
    assert_eq!(*journal.lock().unwrap(), ["a:cleanup"]);

    Ok(())
}

/// Tests that a failing before-request hook stops the request before it reaches the router.
///
/// Expected: Err(Error::HookFailed) for before-request, no later hook run and no echo logged
#[tokio::test]
async fn failing_before_request_hook_skips_router() -> Result<(), Error> {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::new("a", &journal);

    let manager = echo_manager(move |builder| {
        builder
            .with_before_request(Failing)
            .with_before_request(recorder.clone())
            .with_after_request(recorder.clone())
    });

    let session = manager
        .start_session("echo", "failing_before_request_hook_skips_router")
        .await?;
    let result = session.get("/echo/never").send().await;

    match result {
        Err(Error::HookFailed { phase, hook, source }) => {
            assert_eq!(phase, "before-request");
            assert!(hook.ends_with("Failing"), "Unexpected hook name {}", hook);
            assert!(source.to_string().contains("signing failed"));
        }
        Err(e) => panic!("Expected HookFailed, got {}", e),
        Ok(response) => panic!("Expected the request to fail, got {}", response.status()),
    }

    assert!(journal.lock().unwrap().is_empty());
    assert!(session.logs().find(|e| e.message == "Echo").is_none());

    session.end().await
}

/// Tests that a failing after-request hook fails the send after the router ran.
///
/// Expected: Err(Error::HookFailed) for after-request with the echo event captured
#[tokio::test]
async fn failing_after_request_hook_fails_send() -> Result<(), Error> {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::new("a", &journal);

    let manager = echo_manager(move |builder| {
        builder
            .with_after_request(Failing)
            .with_after_request(recorder.clone())
    });

    let session = manager
        .start_session("echo", "failing_after_request_hook_fails_send")
        .await?;
    let result = session.get("/echo/sent").send().await;

    assert!(matches!(
        result,
        Err(Error::HookFailed { phase: "after-request", .. })
    ));
    assert!(journal.lock().unwrap().is_empty());
    assert!(session.logs().find(|e| e.message == "Echo").is_some());

    session.end().await
}
