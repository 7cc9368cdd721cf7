pub mod factory;

use async_trait::async_trait;
use bulletprove::{hook::database::Seeder, Error};
use sea_orm::{ActiveModelTrait, DatabaseConnection};

use crate::constant::SEEDED_TODOS;

/// Insert a todo with the given title.
pub async fn insert_todo(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entity::todo::Model, sea_orm::DbErr> {
    factory::mock_todo(title).insert(db).await
}

/// Insert a comment on an existing todo.
pub async fn insert_comment(
    db: &DatabaseConnection,
    todo_id: i32,
    body: &str,
) -> Result<entity::todo_comment::Model, sea_orm::DbErr> {
    factory::mock_comment(todo_id, body).insert(db).await
}

/// Seeder inserting a fixed list of todos, one comment on the first.
pub struct TodoSeeder {
    titles: Vec<String>,
}

impl TodoSeeder {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for TodoSeeder {
    fn default() -> Self {
        Self::new(SEEDED_TODOS)
    }
}

#[async_trait]
impl Seeder for TodoSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), Error> {
        for (index, title) in self.titles.iter().enumerate() {
            let todo = insert_todo(db, title).await?;

            if index == 0 {
                insert_comment(db, todo.id, "seeded comment").await?;
            }
        }

        Ok(())
    }
}
