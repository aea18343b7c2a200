//! Cross-cutting observability stages: request identifiers and logging.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

use super::{Next, Policy};
use crate::context::Context;
use crate::error::ClientError;
use crate::http::{Request, Response};

const CLIENT_REQUEST_ID: HeaderName = HeaderName::from_static("client-request-id");

/// Attaches a unique `client-request-id` header so a call can be correlated
/// with service-side logs. An id already set by the caller is kept.
#[derive(Debug, Default)]
pub struct RequestIdPolicy;

impl RequestIdPolicy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Policy for RequestIdPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, ClientError> {
        if !request.headers().contains_key(&CLIENT_REQUEST_ID) {
            let id = uuid::Uuid::new_v4().to_string();
            let value = HeaderValue::from_str(&id)
                .map_err(|e| ClientError::Internal(format!("generated request id: {e}")))?;
            request.headers_mut().insert(CLIENT_REQUEST_ID, value);
        }
        next.run(ctx, request).await
    }
}

/// Emits `tracing` events for the request line and the outcome.
///
/// Placed above the retry stage it reports the call as a whole; below it,
/// every attempt.
#[derive(Debug, Default)]
pub struct LoggingPolicy;

impl LoggingPolicy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Policy for LoggingPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, ClientError> {
        let started = Instant::now();
        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
        match next.run(ctx, request).await {
            Ok(response) => {
                tracing::debug!(
                    status = response.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request completed"
                );
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request failed"
                );
                Err(error)
            }
        }
    }
}
