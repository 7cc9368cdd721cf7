//! Shared mockito server and the hook resetting it between tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockito::{Server, ServerGuard};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    error::Error,
    hook::{AfterTest, HookContext},
};

/// Mock HTTP server shared by a test server and every session opened on it.
///
/// Applications under test are configured with [`url`](Self::url) as their upstream
/// base URL; tests add mocks through [`lock`](Self::lock).
#[derive(Clone)]
pub struct MockServer {
    url: String,
    server: Arc<Mutex<ServerGuard>>,
}

impl MockServer {
    /// Start a new mockito server.
    pub async fn start() -> Self {
        let server = Server::new_async().await;

        Self {
            url: server.url(),
            server: Arc::new(Mutex::new(server)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Exclusive access to the underlying server for creating mocks.
    pub async fn lock(&self) -> MutexGuard<'_, ServerGuard> {
        self.server.lock().await
    }

    /// Remove every mock from the server.
    pub async fn reset(&self) {
        self.server.lock().await.reset();
    }
}

/// After-test hook removing every mock so expectations never leak into the next test.
pub struct ResetMocks {
    server: MockServer,
}

impl ResetMocks {
    pub fn new(server: MockServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl AfterTest for ResetMocks {
    async fn after_test(&self, ctx: &HookContext) -> Result<(), Error> {
        self.server.reset().await;

        tracing::debug!(
            test = %ctx.test_name,
            url = self.server.url(),
            "Reset mock server"
        );

        Ok(())
    }
}
