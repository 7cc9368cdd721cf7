//! Typed request builder for sending requests through a session.

mod response;

pub use response::TestResponse;

use axum::{
    body::Body,
    http::{header, request::Builder, HeaderName, HeaderValue, Method, Request},
};
use serde::Serialize;

use crate::{error::Error, logs::LogFilter, server::TestSession};

/// Request under construction, created by [`TestSession::get`] and friends.
///
/// Errors from invalid headers or body serialisation are deferred until
/// [`send`](Self::send).
pub struct TestRequest<'s> {
    session: &'s TestSession,
    builder: Builder,
    body: Body,
    error: Option<Error>,
    allowed_logs: Vec<LogFilter>,
}

impl<'s> TestRequest<'s> {
    pub(crate) fn new(session: &'s TestSession, method: Method, uri: &str) -> Self {
        Self {
            session,
            builder: Request::builder().method(method).uri(uri),
            body: Body::empty(),
            error: None,
            allowed_logs: Vec::new(),
        }
    }

    /// Add a request header.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<axum::http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<axum::http::Error>,
    {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Add an `Authorization: Bearer` header.
    pub fn bearer(self, token: impl std::fmt::Display) -> Self {
        self.header(header::AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Serialize `value` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Body::from(bytes);
                self.header(header::CONTENT_TYPE, "application/json")
            }
            Err(e) => {
                self.error.get_or_insert(Error::Json(e));
                self
            }
        }
    }

    /// Use a raw request body.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Accept log events matching `filter` when this request emits them.
    ///
    /// The filter travels with the request's capture span, so it never covers events from
    /// other requests running concurrently in the same session.
    pub fn allow_log(mut self, filter: LogFilter) -> Self {
        self.allowed_logs.push(filter);
        self
    }

    /// Run before-request hooks, dispatch the request, and run after-request hooks.
    ///
    /// # Returns
    /// - `Ok(TestResponse)` - Buffered response, whatever its status
    /// - `Err(Error::Http)` - The request could not be built
    /// - `Err(Error::HookFailed)` - A before- or after-request hook failed
    pub async fn send(self) -> Result<TestResponse, Error> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let request = self.builder.body(self.body)?;

        self.session.dispatch(request, self.allowed_logs).await
    }
}
