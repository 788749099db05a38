//! Streaming codecs for HTTP/1.x messages
//!
//! Every codec works on a [`BytesMut`](bytes::BytesMut) buffer through the
//! `tokio_util` [`Decoder`](tokio_util::codec::Decoder) and
//! [`Encoder`](tokio_util::codec::Encoder) traits, so they fit a framed
//! transport as well as the [`Connection`](crate::connection::Connection).
//!
//! - [`RequestDecoder`] / [`ResponseDecoder`]: read a message head, then its body
//! - [`RequestEncoder`] / [`ResponseEncoder`]: write a message head, then its body
//! - [`header`]: the head codecs on their own
//! - [`body`]: the body codecs for each framing
//!
//! # Example
//!
//! ```
//! use micro_h1::codec::{RequestDecoder, ResponseEncoder};
//! use micro_h1::headers::Headers;
//! use micro_h1::protocol::{Message, PayloadItem, PayloadSize, ResponseHead};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::{Bytes, BytesMut};
//! use http::{StatusCode, Version};
//!
//! let mut decoder = RequestDecoder::default();
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! let head = decoder.decode(&mut request_buffer).unwrap().unwrap();
//! assert!(head.is_header());
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! let response = ResponseHead::new(Version::HTTP_11, StatusCode::OK, "", Headers::new());
//! encoder.encode(Message::<_, Bytes>::Header((response, PayloadSize::Length(2))), &mut response_buffer).unwrap();
//! encoder.encode(Message::<(ResponseHead, PayloadSize)>::from(Bytes::from_static(b"ok")), &mut response_buffer).unwrap();
//! encoder.encode(Message::<(ResponseHead, PayloadSize)>::Payload(PayloadItem::Eof), &mut response_buffer).unwrap();
//!
//! assert_eq!(&response_buffer[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
//! ```

pub mod body;
pub mod header;
mod message_decoder;
mod message_encoder;

pub use message_decoder::{MessageDecoder, RequestDecoder, ResponseDecoder};
pub use message_encoder::{MessageEncoder, RequestEncoder, ResponseEncoder};
