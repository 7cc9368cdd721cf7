//! Fixtures and hooks used by the sample todo server.
//!
//! - `auth` - Before-request hook attaching the test bearer token
//! - `record` - After-request hook recording response statuses per session
//! - `todo` - Todo factories, insertion helpers and the default seeder

pub mod auth;
pub mod record;
pub mod todo;
