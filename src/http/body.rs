use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::context::Context;
use crate::error::ClientError;

/// Byte stream carrying a response payload.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

/// Lazy, single-pass, forward-only response payload.
///
/// The payload may represent a chunked network stream; it must never be
/// assumed fully buffered. On a connection-reusing transport the underlying
/// connection is released only once the stream is consumed or dropped —
/// callers that do not need the payload should [`drain`](Self::drain) it
/// rather than abandon it mid-read.
pub struct ResponseBody {
    stream: ByteStream,
}

impl ResponseBody {
    pub fn new(stream: ByteStream) -> Self {
        Self { stream }
    }

    /// A body with no payload.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// A fully buffered body, for synthetic responses and tests.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let chunks = if bytes.is_empty() {
            Vec::new()
        } else {
            vec![Ok(bytes)]
        };
        Self {
            stream: Box::pin(futures::stream::iter(chunks)),
        }
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Read every remaining chunk, honoring the context's cancellation and
    /// deadline between chunks.
    pub async fn read_to_end(mut self, ctx: &Context) -> Result<Vec<u8>, ClientError> {
        let mut out = Vec::new();
        loop {
            let next = ctx.run(async { Ok(self.stream.next().await) }).await?;
            match next {
                Some(chunk) => out.extend_from_slice(&chunk?),
                None => return Ok(out),
            }
        }
    }

    /// Consume and discard the rest of the payload, releasing the
    /// underlying connection.
    pub async fn drain(mut self, ctx: &Context) -> Result<(), ClientError> {
        loop {
            let next = ctx.run(async { Ok(self.stream.next().await) }).await?;
            match next {
                Some(chunk) => {
                    chunk?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Wrap `inner` so that reads race the context: once `ctx` is done the
    /// stream yields a final [`ClientError::Cancelled`] and stops.
    pub fn cancel_on(ctx: &Context, mut inner: ByteStream) -> ByteStream {
        let ctx = ctx.clone();
        Box::pin(async_stream::stream! {
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => {
                        yield Err(ClientError::Cancelled("body read cancelled".to_string()));
                        break;
                    }
                    item = inner.next() => {
                        let Some(item) = item else { break };
                        yield item;
                    }
                }
            }
        })
    }
}

impl Stream for ResponseBody {
    type Item = Result<Bytes, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseBody")
    }
}
