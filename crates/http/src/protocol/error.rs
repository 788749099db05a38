use std::io;
use thiserror::Error;

use crate::connection::ConnectionState;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("read error: {source}")]
    ReadError {
        #[from]
        source: ParseError,
    },

    #[error("write error: {source}")]
    WriteError {
        #[from]
        source: SendError,
    },

    #[error("header error: {source}")]
    HeaderError {
        #[from]
        source: HeaderError,
    },

    #[error("connection is closed")]
    Closed,

    #[error("operation not allowed while connection is {0:?}")]
    InvalidState(ConnectionState),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line: {reason}")]
    MalformedStartLine { reason: String },

    #[error("malformed header line: {reason}")]
    MalformedHeaderLine { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("invalid {name} header: {reason}")]
    InvalidHeaderValue { name: String, reason: String },

    #[error("both transfer-encoding chunked and content-length present in headers")]
    FramingAmbiguity,

    #[error("invalid chunk: {reason}")]
    InvalidChunk { reason: String },

    #[error("truncated body: {reason}")]
    TruncatedBody { reason: String },

    #[error("connection closed before the message head was complete")]
    IncompleteHead,

    #[error("header error: {source}")]
    Header {
        #[from]
        source: HeaderError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_start_line<S: ToString>(str: S) -> Self {
        Self::MalformedStartLine { reason: str.to_string() }
    }

    pub fn malformed_header_line<S: ToString>(str: S) -> Self {
        Self::MalformedHeaderLine { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header_value<N: ToString, S: ToString>(name: N, str: S) -> Self {
        Self::InvalidHeaderValue { name: name.to_string(), reason: str.to_string() }
    }

    pub fn invalid_chunk<S: ToString>(str: S) -> Self {
        Self::InvalidChunk { reason: str.to_string() }
    }

    pub fn truncated_body<S: ToString>(str: S) -> Self {
        Self::TruncatedBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("unsupported http version: {0:?}")]
    UnsupportedVersion(http::Version),

    #[error("header error: {source}")]
    Header {
        #[from]
        source: HeaderError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised by [`Headers`](crate::headers::Headers) itself.
///
/// These never involve the transport: a caller can recover from them and keep
/// using the collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("can't modify frozen headers")]
    Frozen,

    #[error("invalid header name: {name:?}")]
    InvalidName { name: String },

    #[error("invalid value for header {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl HeaderError {
    pub fn invalid_value<N: ToString, S: ToString>(name: N, str: S) -> Self {
        Self::InvalidValue { name: name.to_string(), reason: str.to_string() }
    }
}
