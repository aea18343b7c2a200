//! Policy chain: an ordered list of request-processing stages terminating
//! at the transport.
//!
//! Each stage may inspect or mutate the request on the way down, delegate
//! to the remainder of the chain through [`Next`], and inspect or mutate
//! the response on the way back up. Stage order is caller-specified and
//! significant; within one `send` call stages run in strict registration
//! order down and strict reverse order up. The stage list is immutable
//! after construction, so one [`Pipeline`] instance is safe to share across
//! concurrent calls without locking.

mod retry;
mod telemetry;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::ClientError;
use crate::http::{Request, Response};
use crate::transport::HttpTransport;

pub use retry::{RetryOptions, RetryPolicy};
pub use telemetry::{LoggingPolicy, RequestIdPolicy};

/// One stage in the pipeline.
///
/// A stage that intends to call `next` more than once (retry) relies on the
/// request body being replayable, which [`Request`] guarantees; stages must
/// not replace the body — that belongs to the terminal transport alone.
#[async_trait]
pub trait Policy: Send + Sync {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, ClientError>;
}

/// Cursor over the remainder of the chain.
///
/// Copyable so a stage can invoke the rest of the chain several times
/// (retry semantics).
#[derive(Clone, Copy)]
pub struct Next<'a> {
    pipeline: &'a Pipeline,
    index: usize,
}

impl Next<'_> {
    /// Run the remaining stages, then the transport.
    ///
    /// Fails fast with [`ClientError::Cancelled`] when the context is
    /// already done, so no stage below runs with a dead context.
    pub async fn run(self, ctx: &Context, request: &mut Request) -> Result<Response, ClientError> {
        ctx.check()?;
        match self.pipeline.stages.get(self.index) {
            Some(stage) => {
                let next = Next {
                    pipeline: self.pipeline,
                    index: self.index + 1,
                };
                stage.send(ctx, request, next).await
            }
            None => self.pipeline.transport.send(ctx, request).await,
        }
    }
}

/// Ordered, immutable-after-construction policy chain ending at a
/// transport.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Policy>]>,
    transport: Arc<dyn HttpTransport>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Policy>>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            stages: stages.into(),
            transport,
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run `request` through every stage and the transport.
    pub async fn send(&self, ctx: &Context, request: &mut Request) -> Result<Response, ClientError> {
        Next {
            pipeline: self,
            index: 0,
        }
        .run(ctx, request)
        .await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}

/// Assembles the standard stage ordering: per-call policies first, then the
/// retry stage, then per-retry policies (re-run on every attempt —
/// authentication goes here so resubmissions carry a fresh token), then the
/// transport.
#[derive(Default)]
pub struct PipelineBuilder {
    per_call: Vec<Arc<dyn Policy>>,
    retry: Option<RetryOptions>,
    per_retry: Vec<Arc<dyn Policy>>,
}

impl PipelineBuilder {
    /// Append a policy that runs once per `send` call.
    pub fn with_policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.per_call.push(policy);
        self
    }

    /// Insert the retry stage with `options`.
    pub fn with_retry(mut self, options: RetryOptions) -> Self {
        self.retry = Some(options);
        self
    }

    /// Append a policy that runs once per attempt, below the retry stage.
    pub fn with_per_retry_policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.per_retry.push(policy);
        self
    }

    pub fn build(self, transport: Arc<dyn HttpTransport>) -> Pipeline {
        let mut stages = self.per_call;
        if let Some(options) = self.retry {
            stages.push(Arc::new(RetryPolicy::new(options)));
        }
        stages.extend(self.per_retry);
        Pipeline::new(stages, transport)
    }
}
