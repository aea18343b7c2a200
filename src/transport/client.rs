//! Default transport over `reqwest`.

use async_trait::async_trait;
use futures_util::StreamExt;

use super::HttpTransport;
use crate::context::Context;
use crate::error::ClientError;
use crate::http::{ByteStream, Request, Response, ResponseBody};

/// [`HttpTransport`] backed by a shared [`reqwest::Client`].
///
/// The client's connection pool is reused across requests; dropping a
/// partially read [`ResponseBody`] closes its connection instead of
/// returning it to the pool.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client (shared pool, custom TLS, proxies).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// A transport over a default client.
    pub fn default_client() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, ctx: &Context, request: &Request) -> Result<Response, ClientError> {
        let url = request.url_with_query();
        let mut builder = self
            .client
            .request(request.method().clone(), url.as_str())
            .headers(request.headers().clone());
        if !request.body().is_empty() {
            builder = builder.body(request.body().clone());
        }

        let response = ctx
            .run(async {
                builder
                    .send()
                    .await
                    .map_err(|e| ClientError::Transport(format!("request to {url} failed: {e}")))
            })
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        tracing::trace!(status = status.as_u16(), %url, "transport received response head");

        let stream: ByteStream = Box::pin(response.bytes_stream().map(|item| {
            item.map_err(|e| ClientError::Transport(format!("body read failed: {e}")))
        }));
        let body = ResponseBody::new(ResponseBody::cancel_on(ctx, stream));
        Ok(Response::new(status, headers, body))
    }
}
