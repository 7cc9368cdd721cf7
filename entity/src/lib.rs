//! sea-orm entities of the sample todo application used by the integration tests.

pub mod prelude;

pub mod todo;
pub mod todo_comment;
