//! Decoders for the request line / status line and the header section.
//!
//! Parsing is done by `httparse`; this module turns its borrowed output into an
//! owned [`RequestHead`] or [`ResponseHead`] and selects the body framing with
//! [`PayloadSize::for_request`] / [`PayloadSize::for_response`].
//!
//! # Limits
//!
//! Both decoders enforce the header limits of their [`ConnectionConfig`]: the
//! number of fields and the size of the head, start line included. A partial
//! head that already exceeds the size limit is rejected before it completes.
//!
//! Only HTTP/1.0 and HTTP/1.1 are accepted. Obsolete line folding is rejected.

use bytes::{Buf, BytesMut};
use http::{Method, StatusCode, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::config::ConnectionConfig;
use crate::ensure;
use crate::headers::Headers;
use crate::protocol::{ParseError, PayloadSize, RequestHead, ResponseHead};

/// Decoder for a request head implementing the [`Decoder`] trait.
#[derive(Debug, Clone, Default)]
pub struct RequestHeadDecoder {
    config: ConnectionConfig,
}

impl RequestHeadDecoder {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

impl Decoder for RequestHeadDecoder {
    type Item = (RequestHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, payload_size)))` if a complete head was parsed; `src`
    ///   then starts at the body
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let max_headers = self.config.get_max_headers();
        let max_header_bytes = self.config.get_max_header_bytes();

        let mut headers = vec![httparse::EMPTY_HEADER; max_headers];
        let mut req = httparse::Request::new(&mut headers);

        let status = req.parse(src).map_err(|e| map_parse_error(e, max_headers))?;
        let body_offset = match status {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
                return Ok(None);
            }
        };

        trace!(head_size = body_offset, "parsed request head");
        ensure!(body_offset <= max_header_bytes, ParseError::too_large_header(body_offset, max_header_bytes));

        let version = parse_version(req.version)?;
        let method = req.method.ok_or(ParseError::InvalidMethod)?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|_e| ParseError::InvalidMethod)?;
        let target = req.path.ok_or_else(|| ParseError::malformed_start_line("missing request target"))?.to_string();
        let headers = collect_headers(req.headers)?;

        src.advance(body_offset);

        let payload_size = PayloadSize::for_request(&headers, self.config.is_strict_framing())?;
        let authority = headers.get_all("host").last().map(str::to_string);

        let mut head = RequestHead::new(method, target, version, headers);
        if let Some(authority) = authority {
            head = head.with_authority(authority);
        }
        Ok(Some((head, payload_size)))
    }
}

/// Decoder for a response head implementing the [`Decoder`] trait.
///
/// The framing of a response depends on the request it answers, so the
/// request method must be set before decoding.
#[derive(Debug, Clone)]
pub struct ResponseHeadDecoder {
    config: ConnectionConfig,
    request_method: Method,
}

impl ResponseHeadDecoder {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config, request_method: Method::GET }
    }

    pub fn set_request_method(&mut self, method: Method) {
        self.request_method = method;
    }
}

impl Default for ResponseHeadDecoder {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl Decoder for ResponseHeadDecoder {
    type Item = (ResponseHead, PayloadSize);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let max_headers = self.config.get_max_headers();
        let max_header_bytes = self.config.get_max_header_bytes();

        let mut headers = vec![httparse::EMPTY_HEADER; max_headers];
        let mut resp = httparse::Response::new(&mut headers);

        let status = resp.parse(src).map_err(|e| map_parse_error(e, max_headers))?;
        let body_offset = match status {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
                return Ok(None);
            }
        };

        trace!(head_size = body_offset, "parsed response head");
        ensure!(body_offset <= max_header_bytes, ParseError::too_large_header(body_offset, max_header_bytes));

        let version = parse_version(resp.version)?;
        let code = resp.code.ok_or_else(|| ParseError::malformed_start_line("missing status code"))?;
        let status = StatusCode::from_u16(code).map_err(|_e| ParseError::InvalidStatus(code))?;
        let reason = resp.reason.unwrap_or_default().to_string();
        let headers = collect_headers(resp.headers)?;

        src.advance(body_offset);

        let payload_size =
            PayloadSize::for_response(&headers, status, &self.request_method, self.config.is_strict_framing())?;
        Ok(Some((ResponseHead::new(version, status, reason, headers), payload_size)))
    }
}

fn map_parse_error(e: Error, max_headers: usize) -> ParseError {
    match e {
        Error::TooManyHeaders => ParseError::too_many_headers(max_headers),
        Error::HeaderName | Error::HeaderValue => ParseError::malformed_header_line(e),
        Error::Version => ParseError::InvalidVersion(None),
        e => ParseError::malformed_start_line(e),
    }
}

fn parse_version(version: Option<u8>) -> Result<Version, ParseError> {
    match version {
        Some(0) => Ok(Version::HTTP_10),
        Some(1) => Ok(Version::HTTP_11),
        // Currently HTTP/2 and HTTP/3 not supported
        v => Err(ParseError::InvalidVersion(v)),
    }
}

fn collect_headers(parsed: &[httparse::Header<'_>]) -> Result<Headers, ParseError> {
    let mut headers = Headers::with_capacity(parsed.len());
    for header in parsed {
        let value = std::str::from_utf8(header.value)
            .map_err(|_e| ParseError::malformed_header_line(format!("value of {} is not valid utf-8", header.name)))?;
        headers.add(header.name, value.trim())?;
    }
    Ok(headers)
}
