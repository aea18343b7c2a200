use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use super::ResponseBody;
use crate::context::Context;
use crate::error::ClientError;

/// An HTTP response flowing back up the policy chain.
///
/// The body is a lazy, forward-only stream; ownership of it transfers to
/// whichever caller ultimately reads or drains it. The pipeline returns
/// non-success responses untouched so the protocol layer above can decide
/// what they mean — [`Response::service_error`] is the bridge when it
/// decides they are errors.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
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

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        (self.status, self.headers, self.body)
    }

    /// Read the full payload, honoring the context.
    pub async fn read_body_to_end(self, ctx: &Context) -> Result<Vec<u8>, ClientError> {
        self.body.read_to_end(ctx).await
    }

    /// Discard the rest of the payload, releasing the connection.
    pub async fn drain(self, ctx: &Context) -> Result<(), ClientError> {
        self.body.drain(ctx).await
    }

    /// Turn this response into the [`ClientError::Service`] the protocol
    /// layer reports, preserving the status and body text. A failure while
    /// reading the body takes precedence.
    pub async fn service_error(self, ctx: &Context) -> ClientError {
        let status = self.status.as_u16();
        let message = match self.body.read_to_end(ctx).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => return err,
        };
        ClientError::Service { status, message }
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
