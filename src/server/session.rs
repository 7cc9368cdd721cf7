use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
};
use tower::ServiceExt;
use tracing::{instrument::WithSubscriber, Instrument};

use crate::{
    error::Error,
    hook::{AfterRequest, AfterTest, BeforeRequest, Cleanup, HookContext},
    logs::{LogFilter, ServerLogs},
    request::{TestRequest, TestResponse},
    server::TestServer,
    services::ServiceScope,
};

/// One test's lease on a [`TestServer`].
///
/// Sessions own a service scope and a log inspector. They must be finished with
/// [`end`](Self::end) so after-test and cleanup hooks run; dropping a session that was
/// never ended only logs a warning.
pub struct TestSession {
    server: Arc<TestServer>,
    ctx: HookContext,
    ended: bool,
}

impl TestSession {
    pub(crate) fn new(server: Arc<TestServer>, ctx: HookContext) -> Self {
        Self {
            server,
            ctx,
            ended: false,
        }
    }

    pub fn server(&self) -> &Arc<TestServer> {
        &self.server
    }

    pub fn id(&self) -> u64 {
        self.ctx.session_id
    }

    pub fn test_name(&self) -> &str {
        &self.ctx.test_name
    }

    pub fn scope(&self) -> &ServiceScope {
        &self.ctx.scope
    }

    /// Resolve a service through this session's scope.
    pub fn service<T>(&self) -> Result<Arc<T>, Error>
    where
        T: Send + Sync + 'static,
    {
        self.ctx.service::<T>()
    }

    /// Log inspector holding every event captured during this session.
    pub fn logs(&self) -> &ServerLogs {
        &self.ctx.logs
    }

    /// Accept log events matching `filter` for the rest of this session.
    pub fn allow_logs(&self, filter: LogFilter) {
        self.ctx.logs.push_filter(filter);
    }

    pub fn request(&self, method: Method, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, method, uri)
    }

    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::GET, uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::POST, uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PUT, uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Send `request` through the router with log capture and request hooks.
    pub(crate) async fn dispatch(
        &self,
        mut request: Request<Body>,
        allowed_logs: Vec<LogFilter>,
    ) -> Result<TestResponse, Error> {
        let hooks = self.server.hooks();

        let mut state = (&self.ctx, &mut request);
        hooks
            .run_mut::<dyn BeforeRequest, _, _>(&mut state, |hook, state| {
                Box::pin(async move { hook.before_request(state.0, &mut *state.1).await })
            })
            .await?;

        let method = request.method().clone();
        let uri = request.uri().clone();

        let router = self.server.router();
        let capture = self.server.capture();
        let span = capture.span(&self.ctx.logs, allowed_logs);

        let response = async move {
            let response = router
                .oneshot(request)
                .await
                .unwrap_or_else(|never| match never {});

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await?;

            Ok::<_, Error>(TestResponse::new(parts.status, parts.headers, body))
        }
        .instrument(span)
        .with_subscriber(capture.dispatch().clone())
        .await?;

        tracing::debug!(
            test = %self.ctx.test_name,
            method = %method,
            uri = %uri,
            status = %response.status(),
            "Request completed"
        );

        let state = (&self.ctx, &response);
        hooks
            .run::<dyn AfterRequest, _, _>(&state, |hook, state| {
                Box::pin(async move { hook.after_request(state.0, state.1).await })
            })
            .await?;

        Ok(response)
    }

    /// End the session: run after-test hooks, then cleanup hooks, then check logs.
    ///
    /// Cleanup hooks run even when an after-test hook failed so a cached server is left
    /// clean for the next test; the first error is returned. When
    /// [`Config::fail_on_unexpected_logs`](crate::Config::fail_on_unexpected_logs) is set,
    /// unexpected log events fail the session after all hooks have run.
    ///
    /// # Returns
    /// - `Ok(())` - All hooks succeeded and no unexpected logs were captured
    /// - `Err(Error::HookFailed)` - An after-test or cleanup hook failed
    /// - `Err(Error::UnexpectedLogs)` - The server emitted unexpected log events
    pub async fn end(mut self) -> Result<(), Error> {
        self.ended = true;

        let hooks = self.server.hooks();

        let after_test = hooks
            .run::<dyn AfterTest, _, _>(&self.ctx, |hook, ctx| {
                Box::pin(async move { hook.after_test(ctx).await })
            })
            .await;

        let cleanup = hooks
            .run::<dyn Cleanup, _, _>(&self.ctx, |hook, ctx| {
                Box::pin(async move { hook.cleanup(ctx).await })
            })
            .await;

        self.ctx.logs.reset_filters();

        tracing::debug!(
            server = %self.ctx.server_name,
            test = %self.ctx.test_name,
            session_id = self.ctx.session_id,
            "Ended test session"
        );

        after_test?;
        cleanup?;

        if self.server.config().fail_on_unexpected_logs {
            self.ctx.logs.ensure_no_unexpected()?;
        }

        Ok(())
    }
}

impl Drop for TestSession {
    fn drop(&mut self) {
        if !self.ended {
            tracing::warn!(
                server = %self.ctx.server_name,
                test = %self.ctx.test_name,
                "Test session dropped without calling end(), after-test and cleanup hooks did not run"
            );
        }
    }
}
