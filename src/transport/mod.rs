//! Transport seam: the terminal hop of the pipeline.
//!
//! The pipeline consumes a transport through [`HttpTransport`] and never
//! looks below it; sockets, TLS, and DNS belong to the implementation. The
//! crate ships [`ReqwestTransport`] as the default; embedders may supply
//! their own (tests inject synthetic ones).

mod client;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::ClientError;
use crate::http::{Request, Response};

pub use client::ReqwestTransport;

/// Sends a fully-formed request over a concrete connection and returns a
/// response with a lazily-readable body.
///
/// Implementations must honor the context: return promptly with
/// [`ClientError::Cancelled`] once its deadline or signal fires rather
/// than blocking on the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, ctx: &Context, request: &Request) -> Result<Response, ClientError>;
}
