//! Sample application and fixtures for exercising BulletProve in integration tests.
//!
//! The [`app`] module is a small axum + sea-orm todo API that logs at every level and
//! calls an upstream HTTP service, which is enough surface to drive every lifecycle hook.
//! [`setup`] registers it with a [`ServerManager`](bulletprove::ServerManager).

pub mod app;
pub mod constant;
pub mod fixtures;
pub mod setup;

pub use setup::{configure_todo_server, register_todo_server};

pub mod prelude {
    pub use bulletprove::prelude::*;

    pub use crate::{
        app::dto::{CreateTodoDto, TodoDto},
        constant::{SEEDED_TODOS, TEST_API_TOKEN, TODO_SERVER},
        fixtures::todo::{factory, TodoSeeder},
        register_todo_server,
    };
}
