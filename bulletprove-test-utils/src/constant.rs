//! Constants shared by the sample server configuration and the tests using it.

/// Name the sample todo server is registered under.
pub static TODO_SERVER: &str = "todo";

/// Bearer token accepted by the sample application's protected routes.
pub static TEST_API_TOKEN: &str = "test-api-token";

/// Titles inserted by the default seeder before every test.
pub static SEEDED_TODOS: [&str; 2] = ["buy milk", "write tests"];
