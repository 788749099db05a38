//! HTTP response head and message types.

use http::{StatusCode, Version};

use crate::headers::Headers;
use crate::protocol::Body;

/// The status line and header section of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    reason: String,
    headers: Headers,
}

impl ResponseHead {
    pub fn new(version: Version, status: StatusCode, reason: impl Into<String>, headers: Headers) -> Self {
        Self { version, status, reason: reason.into(), headers }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase as sent, which may differ from the canonical one or be empty.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Interim responses (1xx) are followed by the final response.
    pub fn is_informational(&self) -> bool {
        self.status.is_informational()
    }

    /// Whether the status forbids a body: 1xx, 204 and 304.
    pub fn is_bodyless(&self) -> bool {
        status_forbids_body(self.status)
    }

    pub fn body(self, body: Body) -> Response {
        Response { head: self, body }
    }
}

pub(crate) fn status_forbids_body(status: StatusCode) -> bool {
    status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
}

/// A fully read (or ready to write) response.
#[derive(Debug, Clone)]
pub struct Response {
    head: ResponseHead,
    body: Body,
}

impl Response {
    pub fn new(head: ResponseHead, body: Body) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    pub fn reason(&self) -> &str {
        self.head.reason()
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

    pub fn into_parts(self) -> (ResponseHead, Body) {
        (self.head, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodyless_statuses() {
        for status in [StatusCode::CONTINUE, StatusCode::SWITCHING_PROTOCOLS, StatusCode::NO_CONTENT, StatusCode::NOT_MODIFIED] {
            assert!(status_forbids_body(status), "{status}");
        }
        assert!(!status_forbids_body(StatusCode::OK));
        assert!(!status_forbids_body(StatusCode::NOT_FOUND));
    }
}
