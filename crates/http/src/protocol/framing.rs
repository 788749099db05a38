//! Body framing selection from a parsed message head.
//!
//! Follows [RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112#section-6.3):
//! a chunked `transfer-encoding` wins over `content-length`, a request without
//! either has no body, and a response without either runs until the
//! connection closes.

use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::headers::Headers;
use crate::headers::token::split_list;
use crate::protocol::{ParseError, PayloadSize, status_forbids_body};

const TRANSFER_ENCODING: &str = "transfer-encoding";
const CONTENT_LENGTH: &str = "content-length";

/// What the framing headers of a head announce, before the
/// request/response specific rules apply.
#[derive(Debug, PartialEq, Eq)]
enum Framing {
    Chunked,
    /// A transfer coding other than chunked comes last.
    Unchunked(String),
    Length(u64),
    Unframed,
}

impl PayloadSize {
    /// Picks the framing of a request body.
    ///
    /// With `strict` set, a request carrying both `transfer-encoding` and
    /// `content-length` is rejected instead of read as chunked.
    pub fn for_request(headers: &Headers, strict: bool) -> Result<Self, ParseError> {
        let payload_size = match framing(headers, strict)? {
            Framing::Chunked => PayloadSize::Chunked,
            Framing::Unchunked(coding) => {
                return Err(ParseError::invalid_header_value(
                    TRANSFER_ENCODING,
                    format!("final coding of a request must be chunked, got {coding}"),
                ));
            }
            Framing::Length(length) => PayloadSize::Length(length),
            Framing::Unframed => PayloadSize::Empty,
        };
        debug!(?payload_size, "request framing");
        Ok(payload_size)
    }

    /// Picks the framing of a response body.
    ///
    /// Responses to `HEAD`, successful responses to `CONNECT`, and 1xx, 204 and
    /// 304 responses never carry a body, whatever their headers say.
    pub fn for_response(headers: &Headers, status: StatusCode, request_method: &Method, strict: bool) -> Result<Self, ParseError> {
        if request_method == Method::HEAD
            || status_forbids_body(status)
            || (request_method == Method::CONNECT && status.is_success())
        {
            debug!(%status, method = %request_method, "response without body");
            return Ok(PayloadSize::Empty);
        }

        let payload_size = match framing(headers, strict)? {
            Framing::Chunked => PayloadSize::Chunked,
            Framing::Unchunked(_) | Framing::Unframed => PayloadSize::UntilClose,
            Framing::Length(length) => PayloadSize::Length(length),
        };
        debug!(?payload_size, "response framing");
        Ok(payload_size)
    }
}

fn framing(headers: &Headers, strict: bool) -> Result<Framing, ParseError> {
    let codings: Vec<&str> = headers.get_all(TRANSFER_ENCODING).flat_map(split_list).collect();

    if let Some(last) = codings.last() {
        if headers.contains(CONTENT_LENGTH) {
            if strict {
                return Err(ParseError::FramingAmbiguity);
            }
            warn!("both transfer-encoding and content-length present, ignore content-length");
        }

        if last.eq_ignore_ascii_case("chunked") {
            return Ok(Framing::Chunked);
        }
        return Ok(Framing::Unchunked((*last).to_string()));
    }

    match content_length(headers)? {
        Some(length) => Ok(Framing::Length(length)),
        None => Ok(Framing::Unframed),
    }
}

/// Every `content-length` value, repeated fields and comma lists included,
/// must be the same plain decimal number.
fn content_length(headers: &Headers) -> Result<Option<u64>, ParseError> {
    let mut length = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        for item in value.split(',').map(str::trim) {
            if item.is_empty() || !item.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::invalid_header_value(CONTENT_LENGTH, format!("{item:?} is not a valid length")));
            }
            let parsed = item
                .parse::<u64>()
                .map_err(|e| ParseError::invalid_header_value(CONTENT_LENGTH, format!("{item}: {e}")))?;

            match length {
                Some(existing) if existing != parsed => {
                    return Err(ParseError::invalid_header_value(
                        CONTENT_LENGTH,
                        format!("conflicting values {existing} and {parsed}"),
                    ));
                }
                _ => length = Some(parsed),
            }
        }
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(fields: &[(&str, &str)]) -> Headers {
        Headers::from_fields(fields.iter().copied()).unwrap()
    }

    #[test]
    fn chunked_is_last_coding() {
        let chunked = headers(&[("Transfer-Encoding", "gzip, Chunked")]);
        assert_eq!(PayloadSize::for_request(&chunked, true).unwrap(), PayloadSize::Chunked);

        let split = headers(&[("transfer-encoding", "gzip"), ("transfer-encoding", "chunked")]);
        assert_eq!(PayloadSize::for_request(&split, true).unwrap(), PayloadSize::Chunked);

        let not_last = headers(&[("transfer-encoding", "chunked, gzip")]);
        assert!(matches!(PayloadSize::for_request(&not_last, true), Err(ParseError::InvalidHeaderValue { .. })));
        assert_eq!(
            PayloadSize::for_response(&not_last, StatusCode::OK, &Method::GET, true).unwrap(),
            PayloadSize::UntilClose
        );
    }

    #[test]
    fn ambiguity() {
        let both = headers(&[("transfer-encoding", "chunked"), ("content-length", "5")]);
        assert!(matches!(PayloadSize::for_request(&both, true), Err(ParseError::FramingAmbiguity)));
        assert_eq!(PayloadSize::for_request(&both, false).unwrap(), PayloadSize::Chunked);
    }

    #[test]
    fn content_length_values() {
        assert_eq!(PayloadSize::for_request(&headers(&[("content-length", "42")]), true).unwrap(), PayloadSize::Length(42));
        assert_eq!(
            PayloadSize::for_request(&headers(&[("content-length", "42, 42"), ("Content-Length", "42")]), true).unwrap(),
            PayloadSize::Length(42)
        );

        for bad in ["-1", "abc", "", "+5", "1 2"] {
            let result = PayloadSize::for_request(&headers(&[("content-length", bad)]), true);
            assert!(matches!(result, Err(ParseError::InvalidHeaderValue { .. })), "{bad:?}");
        }

        let conflicting = headers(&[("content-length", "1"), ("content-length", "2")]);
        assert!(matches!(PayloadSize::for_request(&conflicting, true), Err(ParseError::InvalidHeaderValue { .. })));
    }

    #[test]
    fn unframed_messages() {
        let none = Headers::new();
        assert_eq!(PayloadSize::for_request(&none, true).unwrap(), PayloadSize::Empty);
        assert_eq!(PayloadSize::for_response(&none, StatusCode::OK, &Method::GET, true).unwrap(), PayloadSize::UntilClose);
    }

    #[test]
    fn bodyless_responses() {
        let framed = headers(&[("content-length", "10")]);
        for status in [StatusCode::CONTINUE, StatusCode::NO_CONTENT, StatusCode::NOT_MODIFIED] {
            assert_eq!(PayloadSize::for_response(&framed, status, &Method::GET, true).unwrap(), PayloadSize::Empty);
        }
        assert_eq!(PayloadSize::for_response(&framed, StatusCode::OK, &Method::HEAD, true).unwrap(), PayloadSize::Empty);
        assert_eq!(PayloadSize::for_response(&framed, StatusCode::OK, &Method::GET, true).unwrap(), PayloadSize::Length(10));
    }
}
