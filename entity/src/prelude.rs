pub use super::todo::Entity as Todo;
pub use super::todo_comment::Entity as TodoComment;
