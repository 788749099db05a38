//! HTTP message decoders
//!
//! A message is decoded in two phases through a state machine:
//!
//! 1. Head parsing: the start line and header section, by a head decoder
//! 2. Payload parsing: the body, by a [`PayloadDecoder`] built from the framing the head selected
//!
//! # Example
//!
//! ```
//! use micro_h1::codec::RequestDecoder;
//! use micro_h1::protocol::{Message, PayloadItem};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::default();
//! let mut buffer = BytesMut::from("POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nHello");
//!
//! let Some(Message::Header((head, _))) = decoder.decode(&mut buffer).unwrap() else { panic!() };
//! assert_eq!(head.target(), "/upload");
//!
//! let Some(Message::Payload(PayloadItem::Chunk(bytes))) = decoder.decode(&mut buffer).unwrap() else { panic!() };
//! assert_eq!(&bytes[..], b"Hello");
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{RequestHeadDecoder, ResponseHeadDecoder};
use crate::config::ConnectionConfig;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use http::Method;
use tokio_util::codec::Decoder;
use tracing::trace;

/// A decoder for a HTTP message that handles both head and payload
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing the head
/// - `Some(PayloadDecoder)`: Currently parsing payload
#[derive(Debug, Clone)]
pub struct MessageDecoder<H> {
    head_decoder: H,
    payload_decoder: Option<PayloadDecoder>,
    config: ConnectionConfig,
}

/// Decodes requests, the server side of a connection.
pub type RequestDecoder = MessageDecoder<RequestHeadDecoder>;

/// Decodes responses, the client side of a connection.
pub type ResponseDecoder = MessageDecoder<ResponseHeadDecoder>;

impl RequestDecoder {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { head_decoder: RequestHeadDecoder::new(config), payload_decoder: None, config }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl ResponseDecoder {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { head_decoder: ResponseHeadDecoder::new(config), payload_decoder: None, config }
    }

    /// The method of the request the next response answers.
    pub fn set_request_method(&mut self, method: Method) {
        self.head_decoder.set_request_method(method);
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl<H> MessageDecoder<H> {
    /// Whether the decoder is between two messages.
    pub fn is_idle(&self) -> bool {
        self.payload_decoder.is_none()
    }

    fn payload_decoder(&self, payload_size: PayloadSize) -> PayloadDecoder {
        match payload_size {
            PayloadSize::Chunked => {
                PayloadDecoder::chunked_with_limits(self.config.get_max_headers(), self.config.get_max_header_bytes())
            }
            payload_size => payload_size.into(),
        }
    }

    fn payload_message<T>(&mut self, item: Option<PayloadItem>) -> Option<Message<T>> {
        match item {
            Some(item @ PayloadItem::Eof) => {
                // no need payload decoder in this message now
                self.payload_decoder.take();
                Some(Message::Payload(item))
            }
            Some(item) => Some(Message::Payload(item)),
            None => None,
        }
    }
}

impl<H, T> Decoder for MessageDecoder<H>
where
    H: Decoder<Item = (T, PayloadSize), Error = ParseError>,
{
    type Item = Message<(T, PayloadSize)>;
    type Error = ParseError;

    /// Attempts to decode the next part of a message from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded the message head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk, the trailers or EOF
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // parse payload if have payload_decoder
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            return Ok(self.payload_message(item));
        }

        let message = match self.head_decoder.decode(src)? {
            Some((head, payload_size)) => {
                self.payload_decoder = Some(self.payload_decoder(payload_size));
                Some(Message::Header((head, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    /// Decodes what is left once the transport reached EOF.
    ///
    /// EOF between two messages is a clean end and yields `None`; EOF in the
    /// middle of a head or of a framed body is an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode_eof(src)?;
            return Ok(self.payload_message(item));
        }

        if src.is_empty() {
            trace!("eof between messages");
            return Ok(None);
        }

        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None => Err(ParseError::IncompleteHead),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::Field;
    use bytes::Bytes;
    use http::StatusCode;

    fn decode_all<D, T>(decoder: &mut D, src: &mut BytesMut) -> (T, Vec<PayloadItem>)
    where
        D: Decoder<Item = Message<(T, PayloadSize)>, Error = ParseError>,
    {
        let Some(Message::Header((head, _))) = decoder.decode(src).unwrap() else {
            panic!("expect message head");
        };
        let mut items = Vec::new();
        loop {
            match decoder.decode(src).unwrap() {
                Some(Message::Payload(PayloadItem::Eof)) => break,
                Some(Message::Payload(item)) => items.push(item),
                Some(Message::Header(_)) => panic!("unexpected head"),
                None => panic!("incomplete message"),
            }
        }
        (head, items)
    }

    #[test]
    fn request_without_body() {
        let mut buffer = BytesMut::from("GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");
        let mut decoder = RequestDecoder::default();

        let (head, items) = decode_all(&mut decoder, &mut buffer);
        assert_eq!(head.target(), "/index.html");
        assert_eq!(head.authority(), Some("example.com"));
        assert!(items.is_empty());
        assert!(decoder.is_idle());
    }

    #[test]
    fn pipelined_requests() {
        let mut buffer = BytesMut::from(
            "POST /a HTTP/1.1\r\nContent-Length: 5\r\n\r\nHelloGET /b HTTP/1.1\r\n\r\n",
        );
        let mut decoder = RequestDecoder::default();

        let (head, items) = decode_all(&mut decoder, &mut buffer);
        assert_eq!(head.target(), "/a");
        assert_eq!(items, vec![PayloadItem::Chunk(Bytes::from_static(b"Hello"))]);

        let (head, items) = decode_all(&mut decoder, &mut buffer);
        assert_eq!(head.target(), "/b");
        assert!(items.is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn chunked_request_with_trailers() {
        let mut buffer = BytesMut::from(
            "POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\nX-Checksum: abc\r\n\r\n",
        );
        let mut decoder = RequestDecoder::default();

        let (_, items) = decode_all(&mut decoder, &mut buffer);
        assert_eq!(
            items,
            vec![
                PayloadItem::Chunk(Bytes::from_static(b"Wiki")),
                PayloadItem::Chunk(Bytes::from_static(b"pedia")),
                PayloadItem::Trailers(vec![Field::new("X-Checksum", "abc")]),
            ]
        );
    }

    #[test]
    fn eof_handling() {
        let mut decoder = RequestDecoder::default();
        assert!(decoder.decode_eof(&mut BytesMut::new()).unwrap().is_none());

        let mut buffer = BytesMut::from("GET / HTTP/1.1\r\nHost");
        assert!(matches!(decoder.decode_eof(&mut buffer), Err(ParseError::IncompleteHead)));
    }

    #[test]
    fn close_delimited_response() {
        let mut buffer = BytesMut::from("HTTP/1.0 200 OK\r\n\r\nsome data");
        let mut decoder = ResponseDecoder::default();

        let Some(Message::Header((head, payload_size))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expect message head");
        };
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(payload_size, PayloadSize::UntilClose);

        let chunk = decoder.decode(&mut buffer).unwrap().and_then(Message::into_payload_item).unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &b"some data"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        let eof = decoder.decode_eof(&mut buffer).unwrap().and_then(Message::into_payload_item).unwrap();
        assert!(eof.is_eof());
        assert!(decoder.is_idle());
    }
}
