use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::ClientError;

/// An HTTP request travelling down the policy chain.
///
/// Headers are case-insensitive with last-write-wins semantics; query
/// parameters keep insertion order. The body is [`Bytes`], so the retry
/// stage can resubmit the request without any policy having to rewind a
/// stream. Policies may mutate headers and query parameters in place; only
/// the terminal transport stage consumes the body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// A bodiless request for `method` against `url`.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target URL without query parameters.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The target URL with query parameters appended, percent-encoded.
    pub fn url_with_query(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let mut url = self.url.clone();
        let mut separator = if url.contains('?') { '&' } else { '?' };
        for (name, value) in &self.query {
            url.push(separator);
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            separator = '&';
        }
        url
    }

    /// Append a query parameter. Repeated names are kept in order.
    pub fn add_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Insert a header, replacing any existing value under the same
    /// (case-insensitive) name.
    pub fn insert_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ClientError::Configuration(format!("invalid header name '{name}': {e}"))
        })?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Configuration(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Replace the request body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
