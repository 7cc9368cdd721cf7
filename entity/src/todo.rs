use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub done: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::todo_comment::Entity")]
    TodoComment,
}

impl Related<super::todo_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TodoComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
