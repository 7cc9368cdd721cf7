use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
};
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Fully buffered response returned by [`TestRequest::send`](crate::TestRequest::send).
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of header `name` when present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Fail with [`Error::UnexpectedStatus`] unless the status equals `expected`.
    pub fn expect_status(&self, expected: StatusCode) -> Result<&Self, Error> {
        if self.status == expected {
            return Ok(self);
        }

        Err(Error::UnexpectedStatus {
            expected,
            actual: self.status,
            body: self.text(),
        })
    }
}
