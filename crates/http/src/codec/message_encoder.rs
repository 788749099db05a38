//! HTTP message encoders
//!
//! The encoder accepts a message head first, which picks the body framing, then
//! payload items until [`PayloadItem::Eof`](crate::protocol::PayloadItem::Eof)
//! completes the message.

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadSize, RequestHead, ResponseHead, SendError};
use bytes::{Buf, BytesMut};
use std::marker::PhantomData;
use tokio_util::codec::Encoder;
use tracing::error;

/// Encodes a head of type `T` followed by its payload.
#[derive(Debug)]
pub struct MessageEncoder<T> {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
    _head: PhantomData<fn(T)>,
}

/// Encodes requests, the client side of a connection.
pub type RequestEncoder = MessageEncoder<RequestHead>;

/// Encodes responses, the server side of a connection.
pub type ResponseEncoder = MessageEncoder<ResponseHead>;

impl<T> MessageEncoder<T> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Whether the encoder is between two messages.
    pub fn is_idle(&self) -> bool {
        self.payload_encoder.is_none()
    }
}

impl<T> Default for MessageEncoder<T> {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None, _head: PhantomData }
    }
}

impl<T, D: Buf> Encoder<Message<(T, PayloadSize), D>> for MessageEncoder<T>
where
    HeaderEncoder: Encoder<(T, PayloadSize), Error = SendError>,
{
    type Error = SendError;

    fn encode(&mut self, item: Message<(T, PayloadSize), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive message head");
                    return Err(SendError::invalid_body("message head sent before the previous body finished"));
                }

                self.header_encoder.encode((head, payload_size), dst)?;
                self.payload_encoder = Some(payload_size.into());
                Ok(())
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect message head but receive payload item");
                    return Err(SendError::invalid_body("payload sent before a message head"));
                };

                let is_eof = payload_item.is_eof();
                let result = payload_encoder.encode(payload_item, dst);

                if is_eof || result.is_err() {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{RequestDecoder, ResponseDecoder};
    use crate::headers::{Field, Headers};
    use crate::protocol::PayloadItem;
    use bytes::Bytes;
    use http::{Method, StatusCode, Version};
    use tokio_util::codec::Decoder;

    #[test]
    fn fixed_length_request_round_trip() {
        let mut encoder = RequestEncoder::new();
        let mut wire = BytesMut::new();

        let headers = Headers::from_fields([("Host", "example.com")]).unwrap();
        let head = RequestHead::new(Method::PUT, "/item/7", Version::HTTP_11, headers);
        encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Length(11))), &mut wire).unwrap();
        encoder.encode(Message::<(RequestHead, PayloadSize)>::from(Bytes::from_static(b"hello world")), &mut wire).unwrap();
        encoder.encode(Message::<(RequestHead, PayloadSize)>::Payload(PayloadItem::Eof), &mut wire).unwrap();
        assert!(encoder.is_idle());

        let mut decoder = RequestDecoder::default();
        let Some(Message::Header((head, payload_size))) = decoder.decode(&mut wire).unwrap() else {
            panic!("expect request head");
        };
        assert_eq!(head.method(), &Method::PUT);
        assert_eq!(payload_size, PayloadSize::Length(11));

        let chunk = decoder.decode(&mut wire).unwrap().and_then(Message::into_payload_item).unwrap();
        assert_eq!(chunk.into_bytes().unwrap(), Bytes::from_static(b"hello world"));
        let eof = decoder.decode(&mut wire).unwrap().and_then(Message::into_payload_item).unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn chunked_response_with_trailers() {
        let mut encoder = ResponseEncoder::new();
        let mut wire = BytesMut::new();

        let head = ResponseHead::new(Version::HTTP_11, StatusCode::OK, "", Headers::new());
        let items: Vec<Message<(ResponseHead, PayloadSize)>> = vec![
            Message::Header((head, PayloadSize::Chunked)),
            Bytes::from_static(b"Wiki").into(),
            Bytes::from_static(b"pedia").into(),
            Message::Payload(PayloadItem::Trailers(vec![Field::new("X-Checksum", "abc")])),
            Message::Payload(PayloadItem::Eof),
        ];
        for item in items {
            encoder.encode(item, &mut wire).unwrap();
        }

        let expected = "HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\nX-Checksum: abc\r\n\r\n";
        assert_eq!(&wire[..], expected.as_bytes());

        let mut decoder = ResponseDecoder::default();
        assert!(decoder.decode(&mut wire).unwrap().unwrap().is_header());
        let mut items = Vec::new();
        while let Some(message) = decoder.decode(&mut wire).unwrap() {
            items.push(message.into_payload_item().unwrap());
        }
        assert_eq!(
            items,
            vec![
                PayloadItem::Chunk(Bytes::from_static(b"Wiki")),
                PayloadItem::Chunk(Bytes::from_static(b"pedia")),
                PayloadItem::Trailers(vec![Field::new("X-Checksum", "abc")]),
                PayloadItem::Eof,
            ]
        );
    }

    #[test]
    fn out_of_order_items() {
        let mut encoder = ResponseEncoder::new();
        let mut wire = BytesMut::new();

        let payload = Message::<(ResponseHead, PayloadSize)>::Payload(PayloadItem::Eof);
        assert!(matches!(encoder.encode(payload, &mut wire), Err(SendError::InvalidBody { .. })));

        let head = || ResponseHead::new(Version::HTTP_11, StatusCode::OK, "", Headers::new());
        encoder.encode(Message::<_, Bytes>::Header((head(), PayloadSize::Length(3))), &mut wire).unwrap();
        let second = Message::<_, Bytes>::Header((head(), PayloadSize::Empty));
        assert!(matches!(encoder.encode(second, &mut wire), Err(SendError::InvalidBody { .. })));
    }
}
