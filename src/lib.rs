//! bodega
//!
//! Streaming client core for XML object-storage services: a cancellable,
//! composable policy pipeline (request id, logging, retry, bearer-token
//! auth, transport) and a streaming, path-aware XML codec.
//!
//! The per-operation protocol layer (request builders and response parsers
//! for each REST operation) sits on top of this crate: it drives
//! [`Pipeline::send`] and parses bodies with [`XmlReader`] and
//! [`PathDecoder`]. This crate supplies everything those operations share.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bodega::{
//!     BearerTokenPolicy, Context, LoggingPolicy, Pipeline, Request, RequestIdPolicy,
//!     RetryOptions, ReqwestTransport,
//! };
//!
//! # fn credential() -> Arc<dyn bodega::TokenCredential> { unimplemented!() }
//! # async fn example() -> Result<(), bodega::ClientError> {
//! let pipeline = Pipeline::builder()
//!     .with_policy(Arc::new(RequestIdPolicy::new()))
//!     .with_policy(Arc::new(LoggingPolicy::new()))
//!     .with_retry(RetryOptions::default())
//!     .with_per_retry_policy(Arc::new(BearerTokenPolicy::new(
//!         credential(),
//!         vec!["https://shelf.example.com/.default".into()],
//!     )))
//!     .build(Arc::new(ReqwestTransport::default_client()));
//!
//! let ctx = Context::background().with_timeout(std::time::Duration::from_secs(30));
//! let mut request = Request::new(reqwest::Method::GET, "https://shelf.example.com/store");
//! request.add_query("comp", "list");
//! let response = pipeline.send(&ctx, &mut request).await?;
//! let body = response.read_body_to_end(&ctx).await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod auth;
pub mod context;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod transport;
pub mod xml;

pub use auth::{AccessToken, BearerTokenPolicy, TokenCredential};
pub use context::Context;
pub use error::ClientError;
pub use http::{ByteStream, Request, Response, ResponseBody};
pub use pipeline::{
    LoggingPolicy, Next, Pipeline, PipelineBuilder, Policy, RequestIdPolicy, RetryOptions,
    RetryPolicy,
};
pub use transport::{HttpTransport, ReqwestTransport};
pub use xml::{PathDecoder, PathStep, XmlNode, XmlReader, XmlTag, XmlWriter};
