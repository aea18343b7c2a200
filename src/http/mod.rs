//! HTTP request/response types travelling through the pipeline.
//!
//! These are wire-shaped value types, not a transport: the actual network
//! hop lives behind [`crate::transport::HttpTransport`].

mod body;
mod request;
mod response;

pub use body::{ByteStream, ResponseBody};
pub use request::Request;
pub use response::Response;
