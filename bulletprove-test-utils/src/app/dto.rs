use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TodoDto {
    pub id: i32,
    pub title: String,
    pub done: bool,
}

impl From<entity::todo::Model> for TodoDto {
    fn from(model: entity::todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            done: model.done,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateTodoDto {
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDto {
    pub error: String,
}
