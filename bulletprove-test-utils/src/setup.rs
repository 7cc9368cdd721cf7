//! Registration of the sample todo server.

use bulletprove::{
    hook::{
        database::{CleanDatabase, SeedDatabase},
        mock::{MockServer, ResetMocks},
    },
    Error, ServerBuilder, ServerManager,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

use crate::{
    app::{self, AppState},
    constant::{TEST_API_TOKEN, TODO_SERVER},
    fixtures::{
        auth::BearerToken,
        record::{RecordResponses, RecordedResponses},
        todo::TodoSeeder,
    },
};

/// Register the sample todo server under [`TODO_SERVER`].
pub fn register_todo_server(manager: &ServerManager) {
    manager.register(TODO_SERVER, configure_todo_server);
}

/// Configure the sample todo server.
///
/// Starts a mock upstream server, connects an in-memory SQLite database with the todo
/// tables created, and registers:
/// - services: `DatabaseConnection`, `MockServer`, scoped `RecordedResponses`
/// - before-test: seed the default todos
/// - before-request: attach the test bearer token
/// - after-request: record response statuses
/// - after-test: reset upstream mocks
/// - cleanup: delete comments, then todos
pub async fn configure_todo_server(builder: ServerBuilder) -> Result<ServerBuilder, Error> {
    let upstream = MockServer::start().await;
    let db = connect_database().await?;

    let state = AppState::new(db.clone(), upstream.url());

    Ok(builder
        .with_router(app::router(state))
        .with_service(db)
        .with_service(upstream.clone())
        .with_scoped_service(|_| RecordedResponses::default())
        .with_before_test(SeedDatabase::new().with_seeder(TodoSeeder::default()))
        .with_before_request(BearerToken::new(TEST_API_TOKEN))
        .with_after_request(RecordResponses)
        .with_after_test(ResetMocks::new(upstream))
        .with_cleanup(
            CleanDatabase::new()
                .with_entity(entity::prelude::Todo)
                .with_entity(entity::prelude::TodoComment),
        ))
}

/// Connect to a fresh in-memory SQLite database with the todo tables created.
pub async fn connect_database() -> Result<DatabaseConnection, Error> {
    let db = Database::connect("sqlite::memory:").await?;

    let schema = Schema::new(DbBackend::Sqlite);
    let stmts = vec![
        schema.create_table_from_entity(entity::prelude::Todo),
        schema.create_table_from_entity(entity::prelude::TodoComment),
    ];

    for stmt in stmts {
        db.execute(&stmt).await?;
    }

    Ok(db)
}
