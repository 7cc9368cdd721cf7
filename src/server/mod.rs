//! Test servers, the manager caching them by name, and per-test sessions.
//!
//! A [`TestServer`] wraps the application router together with its service container and
//! hook runner. Servers are built lazily by the [`ServerManager`] the first time their name
//! is requested and reused for the rest of the run. Each test leases a server through a
//! [`TestSession`], which owns a fresh service scope and log inspector and must be ended
//! explicitly so after-test and cleanup hooks run.

mod builder;
mod manager;
mod session;

pub use builder::ServerBuilder;
pub use manager::{ServerManager, DEFAULT_SERVER};
pub use session::TestSession;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::Router;

use crate::{
    config::Config,
    error::Error,
    hook::{phase, BeforeTest, HookContext, HookRunner},
    logs::{LogCapture, LogFilter, LogFilterChain, ServerLogs},
    services::Services,
};

/// In-process host of the application under test.
pub struct TestServer {
    name: Arc<str>,
    router: Router,
    services: Services,
    hooks: HookRunner,
    log_filters: Vec<LogFilter>,
    capture: LogCapture,
    config: Config,
    next_session_id: AtomicU64,
}

impl TestServer {
    pub(crate) fn new(
        name: String,
        router: Router,
        services: Services,
        log_filters: Vec<LogFilter>,
        config: Config,
    ) -> Self {
        Self {
            name: Arc::from(name),
            router,
            hooks: HookRunner::new(services.clone()),
            services,
            log_filters,
            capture: LogCapture::new(config.capture_level),
            config,
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn hooks(&self) -> &HookRunner {
        &self.hooks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }

    /// Log capture dispatcher shared by every request sent to this server.
    pub(crate) fn capture(&self) -> &LogCapture {
        &self.capture
    }

    /// Open a session for `test_name` and run the before-test hooks.
    ///
    /// If a before-test hook fails no session is returned and no other hooks run.
    ///
    /// # Returns
    /// - `Ok(TestSession)` - Session ready to send requests
    /// - `Err(Error::HookFailed)` - A before-test hook failed
    pub async fn start_session(
        self: &Arc<Self>,
        test_name: impl Into<String>,
    ) -> Result<TestSession, Error> {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let test_name: Arc<str> = Arc::from(test_name.into());

        let ctx = HookContext {
            server_name: Arc::clone(&self.name),
            test_name: Arc::clone(&test_name),
            session_id,
            scope: self.services.create_scope(),
            logs: ServerLogs::new(LogFilterChain::new(self.log_filters.clone())),
        };

        tracing::debug!(
            server = %self.name,
            test = %test_name,
            session_id = session_id,
            "Starting test session"
        );

        self.hooks
            .run::<dyn BeforeTest, _, _>(&ctx, |hook, ctx| {
                Box::pin(async move { hook.before_test(ctx).await })
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    test = %test_name,
                    "Session not started, {} hooks failed: {}",
                    phase::BEFORE_TEST,
                    e
                )
            })?;

        Ok(TestSession::new(Arc::clone(self), ctx))
    }
}
