use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
};
use bulletprove::{BeforeRequest, Error, HookContext};

/// Before-request hook adding `Authorization: Bearer <token>` unless the test set one.
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl BeforeRequest for BearerToken {
    async fn before_request(
        &self,
        _ctx: &HookContext,
        request: &mut Request<Body>,
    ) -> Result<(), Error> {
        if request.headers().contains_key(header::AUTHORIZATION) {
            return Ok(());
        }

        let value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| Error::custom(format!("Invalid bearer token: {}", e)))?;
        request.headers_mut().insert(header::AUTHORIZATION, value);

        Ok(())
    }
}
