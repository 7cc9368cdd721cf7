//! Lifecycle hooks.
//!
//! Hooks are registered on a [`ServerBuilder`](crate::ServerBuilder) under one of the phase
//! traits below and resolved from the server's service container by the [`HookRunner`].
//! Within a phase, hooks run in registration order and the first failure aborts the phase.
//!
//! | Phase          | Trait             | Runs                                           |
//! |----------------|-------------------|------------------------------------------------|
//! | before-test    | [`BeforeTest`]    | when a session starts                          |
//! | before-request | [`BeforeRequest`] | before each request, may modify it             |
//! | after-request  | [`AfterRequest`]  | after each response has been buffered          |
//! | after-test     | [`AfterTest`]     | when a session is ended                        |
//! | cleanup        | [`Cleanup`]       | after the after-test hooks of an ending session |

mod runner;

#[cfg(feature = "database")]
pub mod database;
#[cfg(feature = "mock-server")]
pub mod mock;
pub mod report;

pub use runner::{HookPhase, HookRunner};

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request};

use crate::{error::Error, logs::ServerLogs, request::TestResponse, services::ServiceScope};

/// Runs when a session starts, before the test body.
#[async_trait]
pub trait BeforeTest: Send + Sync {
    async fn before_test(&self, ctx: &HookContext) -> Result<(), Error>;

    /// Name used in logs and errors; defaults to the implementing type's path.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs before every request sent through a session.
#[async_trait]
pub trait BeforeRequest: Send + Sync {
    async fn before_request(
        &self,
        ctx: &HookContext,
        request: &mut Request<Body>,
    ) -> Result<(), Error>;

    /// Name used in logs and errors; defaults to the implementing type's path.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs after every response has been received and buffered.
#[async_trait]
pub trait AfterRequest: Send + Sync {
    async fn after_request(&self, ctx: &HookContext, response: &TestResponse)
        -> Result<(), Error>;

    /// Name used in logs and errors; defaults to the implementing type's path.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs when a session is ended.
#[async_trait]
pub trait AfterTest: Send + Sync {
    async fn after_test(&self, ctx: &HookContext) -> Result<(), Error>;

    /// Name used in logs and errors; defaults to the implementing type's path.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs last when a session is ended, after every [`AfterTest`] hook.
#[async_trait]
pub trait Cleanup: Send + Sync {
    async fn cleanup(&self, ctx: &HookContext) -> Result<(), Error>;

    /// Name used in logs and errors; defaults to the implementing type's path.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Information about the running session handed to every hook.
#[derive(Clone)]
pub struct HookContext {
    pub server_name: Arc<str>,
    pub test_name: Arc<str>,
    pub session_id: u64,
    pub scope: ServiceScope,
    pub logs: ServerLogs,
}

impl HookContext {
    /// Resolve a service through the session scope.
    pub fn service<T>(&self) -> Result<Arc<T>, Error>
    where
        T: Send + Sync + 'static,
    {
        self.scope.require::<T>()
    }
}

/// Phase names used for logging scopes and [`Error::HookFailed`].
pub mod phase {
    pub const BEFORE_TEST: &str = "before-test";
    pub const BEFORE_REQUEST: &str = "before-request";
    pub const AFTER_REQUEST: &str = "after-request";
    pub const AFTER_TEST: &str = "after-test";
    pub const CLEANUP: &str = "cleanup";
}
