//! HTTP request head and message types.

use http::{Method, Version};

use crate::headers::Headers;
use crate::protocol::Body;

/// The start line and header section of a request.
///
/// The target is kept as the opaque string from the request line. The
/// authority is taken from the `host` header when the head is decoded.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    target: String,
    version: Version,
    headers: Headers,
    authority: Option<String>,
}

impl RequestHead {
    pub fn new(method: Method, target: impl Into<String>, version: Version, headers: Headers) -> Self {
        Self { method, target: target.into(), version, headers, authority: None }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request target exactly as it appeared on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Attaches a body to this head, converting it into a full [`Request`].
    pub fn body(self, body: Body) -> Request {
        Request { head: self, body }
    }
}

/// A fully read (or ready to write) request.
#[derive(Debug, Clone)]
pub struct Request {
    head: RequestHead,
    body: Body,
}

impl Request {
    pub fn new(head: RequestHead, body: Body) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn target(&self) -> &str {
        self.head.target()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn authority(&self) -> Option<&str> {
        self.head.authority()
    }

    pub fn headers(&self) -> &Headers {
        self.head.headers()
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        self.head.headers_mut()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_parts(self) -> (RequestHead, Body) {
        (self.head, self.body)
    }
}
