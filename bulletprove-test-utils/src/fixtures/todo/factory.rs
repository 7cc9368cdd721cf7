use crate::app::dto::CreateTodoDto;

/// Create a todo creation payload with the given title.
pub fn create_todo(title: impl Into<String>) -> CreateTodoDto {
    CreateTodoDto {
        title: title.into(),
    }
}

/// Create an unsaved todo model with default test values.
pub fn mock_todo(title: impl Into<String>) -> entity::todo::ActiveModel {
    use sea_orm::Set;

    entity::todo::ActiveModel {
        title: Set(title.into()),
        done: Set(false),
        ..Default::default()
    }
}

/// Create an unsaved comment attached to `todo_id`.
pub fn mock_comment(todo_id: i32, body: impl Into<String>) -> entity::todo_comment::ActiveModel {
    use sea_orm::Set;

    entity::todo_comment::ActiveModel {
        todo_id: Set(todo_id),
        body: Set(body.into()),
        ..Default::default()
    }
}
