use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::StatusCode;
use bulletprove::{AfterRequest, Error, HookContext, TestResponse};

/// Statuses of every response received by one session.
///
/// Registered as a scoped service, so each session starts with an empty list.
#[derive(Default)]
pub struct RecordedResponses {
    statuses: Mutex<Vec<StatusCode>>,
}

impl RecordedResponses {
    pub fn statuses(&self) -> Vec<StatusCode> {
        self.statuses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn push(&self, status: StatusCode) {
        self.statuses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(status);
    }
}

/// After-request hook appending each response status to [`RecordedResponses`].
pub struct RecordResponses;

#[async_trait]
impl AfterRequest for RecordResponses {
    async fn after_request(
        &self,
        ctx: &HookContext,
        response: &TestResponse,
    ) -> Result<(), Error> {
        ctx.service::<RecordedResponses>()?.push(response.status());

        Ok(())
    }
}
