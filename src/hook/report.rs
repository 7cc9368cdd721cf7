use async_trait::async_trait;

use crate::{
    error::Error,
    hook::{AfterTest, HookContext},
};

/// After-test hook logging a warning for every unexpected server log event.
///
/// Useful when [`Config::fail_on_unexpected_logs`](crate::Config::fail_on_unexpected_logs)
/// is disabled and unexpected events should still be visible in the test output.
#[derive(Default)]
pub struct ReportLogs;

#[async_trait]
impl AfterTest for ReportLogs {
    async fn after_test(&self, ctx: &HookContext) -> Result<(), Error> {
        let unexpected = ctx.logs.unexpected();

        if unexpected.is_empty() {
            return Ok(());
        }

        tracing::warn!(
            server = %ctx.server_name,
            test = %ctx.test_name,
            count = unexpected.len(),
            "Server emitted unexpected log events"
        );

        for event in unexpected {
            tracing::warn!(test = %ctx.test_name, "  {}", event);
        }

        Ok(())
    }
}
