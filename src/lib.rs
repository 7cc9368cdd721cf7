//! In-memory integration testing for axum applications.
//!
//! BulletProve builds the application under test once per logical server name, dispatches
//! requests to it in-process through a typed request builder, and runs ordered lifecycle
//! hooks around every test: seed the database before a test, reset mocks and clean the
//! database after it, and inspect every log event the server emitted along the way.
//!
//! ```ignore
//! use bulletprove::prelude::*;
//!
//! #[tokio::test]
//! async fn lists_todos() -> Result<(), Error> {
//!     let manager = ServerManager::global()?;
//!     manager.register("todo", |builder| async move {
//!         Ok(builder.with_router(app::router()))
//!     });
//!
//!     let session = manager.start_session("todo", "lists_todos").await?;
//!     session.get("/api/todos").send().await?.expect_status(StatusCode::OK)?;
//!     session.end().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod hook;
pub mod logging;
pub mod logs;
pub mod request;
pub mod server;
pub mod services;

pub use config::Config;
pub use error::Error;
pub use hook::{AfterRequest, AfterTest, BeforeRequest, BeforeTest, Cleanup, HookContext};
pub use logs::{LogEvent, LogFilter, ServerLogs};
pub use request::{TestRequest, TestResponse};
pub use server::{ServerBuilder, ServerManager, TestServer, TestSession, DEFAULT_SERVER};

pub mod prelude {
    pub use axum::http::StatusCode;
    pub use tracing::Level;

    pub use crate::{
        hook::report::ReportLogs, AfterRequest, AfterTest, BeforeRequest, BeforeTest, Cleanup,
        Config, Error, HookContext, LogEvent, LogFilter, ServerBuilder, ServerManager,
        TestResponse, TestSession, DEFAULT_SERVER,
    };

    #[cfg(feature = "database")]
    pub use crate::hook::database::{CleanDatabase, SeedDatabase, Seeder};
    #[cfg(feature = "mock-server")]
    pub use crate::hook::mock::{MockServer, ResetMocks};
}
