//! HTTP head encoder for serializing request and response heads
//!
//! This module writes the start line and the header section of a message. The
//! framing headers are rewritten to match the [`PayloadSize`] the body will be
//! sent with:
//!
//! - `Length(n)`: any caller `content-length` / `transfer-encoding` is replaced by `content-length: n`
//! - `Chunked`: `content-length` is dropped and `transfer-encoding: chunked` added when missing;
//!   trailer fields are held back for the end of the body and announced in a `trailer` header
//! - `UntilClose`: both framing headers are dropped
//! - `Empty`: the caller's fields are written untouched
//!
//! Outside of chunked framing there is nowhere to send trailers, so they are
//! written in the head instead.

use crate::headers::{Field, Headers, TRAILER};
use crate::protocol::{PayloadSize, RequestHead, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::Version;
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

const CONTENT_LENGTH: &str = "content-length";
const TRANSFER_ENCODING: &str = "transfer-encoding";

/// Encoder for message heads implementing the [`Encoder`] trait for both
/// [`RequestHead`] and [`ResponseHead`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(RequestHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (RequestHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, payload_size) = item;

        dst.reserve(INIT_HEADER_SIZE);
        let version = version_str(head.version())?;
        write!(FastWrite(dst), "{} {} {}\r\n", head.method(), head.target(), version)?;

        encode_fields(head.headers(), payload_size, dst);
        Ok(())
    }
}

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, payload_size) = item;

        dst.reserve(INIT_HEADER_SIZE);
        let version = version_str(head.version())?;
        let reason = match head.reason() {
            "" => head.status().canonical_reason().unwrap_or_default(),
            reason => reason,
        };
        write!(FastWrite(dst), "{} {} {}\r\n", version, head.status().as_str(), reason)?;

        encode_fields(head.headers(), payload_size, dst);
        Ok(())
    }
}

fn version_str(version: Version) -> Result<&'static str, SendError> {
    match version {
        Version::HTTP_11 => Ok("HTTP/1.1"),
        Version::HTTP_10 => Ok("HTTP/1.0"),
        v => {
            error!(http_version = ?v, "unsupported http version");
            Err(SendError::UnsupportedVersion(v))
        }
    }
}

fn encode_fields(headers: &Headers, payload_size: PayloadSize, dst: &mut BytesMut) {
    let is_framing = |field: &Field| field.is_named(CONTENT_LENGTH) || field.is_named(TRANSFER_ENCODING);

    match payload_size {
        PayloadSize::Length(length) => {
            put_fields(headers.fields().iter().filter(|f| !is_framing(f) && !f.is_named(TRAILER)), dst);
            put_field(CONTENT_LENGTH, length.to_string().as_bytes(), dst);
        }
        PayloadSize::Chunked => {
            let head_fields = headers.header_fields();
            put_fields(head_fields.iter().filter(|f| !f.is_named(CONTENT_LENGTH)), dst);

            if !head_fields.iter().any(|f| f.is_named(TRANSFER_ENCODING)) {
                put_field(TRANSFER_ENCODING, b"chunked", dst);
            }

            if headers.trailer().next().is_some() && !head_fields.iter().any(|f| f.is_named(TRAILER)) {
                let names: Vec<&str> = headers.trailer().map(Field::name).collect();
                put_field(TRAILER, names.join(", ").as_bytes(), dst);
            }
        }
        PayloadSize::UntilClose => {
            put_fields(headers.fields().iter().filter(|f| !is_framing(f) && !f.is_named(TRAILER)), dst);

            // the peer still has to learn about codings other than chunked
            for field in headers.fields().iter().filter(|f| f.is_named(TRANSFER_ENCODING)) {
                let codings = without_chunked(field.value());
                if !codings.is_empty() {
                    put_field(field.name(), codings.as_bytes(), dst);
                }
            }
        }
        PayloadSize::Empty => {
            put_fields(headers.fields().iter().filter(|f| !f.is_named(TRAILER)), dst);
        }
    }

    dst.put_slice(b"\r\n");
}

fn without_chunked(codings: &str) -> String {
    codings
        .split(',')
        .map(str::trim)
        .filter(|coding| !coding.is_empty() && !coding.eq_ignore_ascii_case("chunked"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn put_fields<'a>(fields: impl Iterator<Item = &'a Field>, dst: &mut BytesMut) {
    for field in fields {
        put_field(field.name(), field.value().as_bytes(), dst);
    }
}

fn put_field(name: &str, value: &[u8], dst: &mut BytesMut) {
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value);
    dst.put_slice(b"\r\n");
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    fn encode_request(head: RequestHead, payload_size: PayloadSize) -> String {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, payload_size), &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    fn encode_response(head: ResponseHead, payload_size: PayloadSize) -> String {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, payload_size), &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn request_with_length() {
        let headers = Headers::from_fields([("Host", "example.com"), ("Content-Length", "99")]).unwrap();
        let head = RequestHead::new(Method::POST, "/submit", Version::HTTP_11, headers);

        let expected = "POST /submit HTTP/1.1\r\nHost: example.com\r\ncontent-length: 5\r\n\r\n";
        assert_eq!(encode_request(head, PayloadSize::Length(5)), expected);
    }

    #[test]
    fn response_chunked_with_trailers() {
        let mut headers = Headers::from_fields([("Content-Type", "text/plain"), ("Content-Length", "4")]).unwrap();
        let _ = headers.begin_trailer().unwrap();
        headers.add("X-Checksum", "abc").unwrap();
        headers.add("Expires", "Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        let head = ResponseHead::new(Version::HTTP_11, StatusCode::OK, "", headers);

        let expected = concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: text/plain\r\n",
            "transfer-encoding: chunked\r\n",
            "trailer: X-Checksum, Expires\r\n",
            "\r\n",
        );
        assert_eq!(encode_response(head, PayloadSize::Chunked), expected);
    }

    #[test]
    fn trailers_flattened_without_chunking() {
        let mut headers = Headers::from_fields([("Trailer", "X-Checksum"), ("Transfer-Encoding", "chunked")]).unwrap();
        let _ = headers.begin_trailer().unwrap();
        headers.add("X-Checksum", "abc").unwrap();
        let head = ResponseHead::new(Version::HTTP_10, StatusCode::OK, "Fine", headers);

        let expected = "HTTP/1.0 200 Fine\r\nX-Checksum: abc\r\n\r\n";
        assert_eq!(encode_response(head, PayloadSize::UntilClose), expected);
    }

    #[test]
    fn close_delimited_keeps_other_codings() {
        let headers = Headers::from_fields([("Transfer-Encoding", "gzip, chunked"), ("Content-Length", "12")]).unwrap();
        let head = ResponseHead::new(Version::HTTP_11, StatusCode::OK, "", headers);

        let expected = "HTTP/1.1 200 OK\r\nTransfer-Encoding: gzip\r\n\r\n";
        assert_eq!(encode_response(head, PayloadSize::UntilClose), expected);
    }

    #[test]
    fn unsupported_version() {
        let head = RequestHead::new(Method::GET, "/", Version::HTTP_2, Headers::new());
        let result = HeaderEncoder.encode((head, PayloadSize::Empty), &mut BytesMut::new());
        assert!(matches!(result, Err(SendError::UnsupportedVersion(Version::HTTP_2))));
    }
}
