//! Database seeding and cleanup hooks backed by sea-orm.
//!
//! Both hooks resolve the [`DatabaseConnection`] from the session scope, so the server
//! configuration must register one with
//! [`ServerBuilder::with_service`](crate::ServerBuilder::with_service).

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{DatabaseConnection, DbErr, DeleteResult, EntityTrait};

use crate::{
    error::Error,
    hook::{BeforeTest, Cleanup, HookContext},
};

/// Inserts fixture data before a test.
#[async_trait]
pub trait Seeder: Send + Sync {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), Error>;
}

/// Before-test hook running every seeder in registration order.
#[derive(Default)]
pub struct SeedDatabase {
    seeders: Vec<Box<dyn Seeder>>,
}

impl SeedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seeder<S: Seeder + 'static>(mut self, seeder: S) -> Self {
        self.seeders.push(Box::new(seeder));
        self
    }
}

#[async_trait]
impl BeforeTest for SeedDatabase {
    async fn before_test(&self, ctx: &HookContext) -> Result<(), Error> {
        let db = ctx.service::<DatabaseConnection>()?;

        for seeder in &self.seeders {
            seeder.seed(&db).await?;
        }

        tracing::debug!(
            test = %ctx.test_name,
            seeders = self.seeders.len(),
            "Seeded test database"
        );

        Ok(())
    }
}

type DeleteAll = for<'a> fn(&'a DatabaseConnection) -> BoxFuture<'a, Result<DeleteResult, DbErr>>;

fn delete_all<E: EntityTrait>(
    db: &DatabaseConnection,
) -> BoxFuture<'_, Result<DeleteResult, DbErr>> {
    Box::pin(async move { E::delete_many().exec(db).await })
}

/// Cleanup hook deleting every row of the registered entities.
///
/// Tables are cleared in reverse registration order, so registering parents before
/// children clears children first. No foreign-key graph is computed.
#[derive(Default)]
pub struct CleanDatabase {
    tables: Vec<(&'static str, DeleteAll)>,
}

impl CleanDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity<E>(mut self, _entity: E) -> Self
    where
        E: EntityTrait,
    {
        self.tables
            .push((std::any::type_name::<E>(), delete_all::<E> as DeleteAll));
        self
    }
}

#[async_trait]
impl Cleanup for CleanDatabase {
    async fn cleanup(&self, ctx: &HookContext) -> Result<(), Error> {
        let db = ctx.service::<DatabaseConnection>()?;

        for (table, delete) in self.tables.iter().rev() {
            let result = delete(&db).await?;

            tracing::debug!(
                table = *table,
                rows = result.rows_affected,
                "Cleared test table"
            );
        }

        Ok(())
    }
}
