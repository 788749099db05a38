use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes a body whose size was announced through `content-length`.
///
/// Sending more or fewer bytes than announced is an error: the peer would
/// otherwise misread the next message on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.length == 0 && self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }
                let size = bytes.remaining() as u64;
                if size > self.length {
                    return Err(SendError::invalid_body(format!(
                        "body exceeds content-length: {size} bytes sent with {} remaining",
                        self.length
                    )));
                }
                dst.put(bytes);
                self.length -= size;
                Ok(())
            }
            PayloadItem::Trailers(fields) => {
                // no place for trailers without chunked framing
                warn!(trailers = fields.len(), "drop trailers of a content-length body");
                Ok(())
            }
            PayloadItem::Eof => {
                if self.length > 0 {
                    return Err(SendError::invalid_body(format!("body ended with {} bytes of content-length missing", self.length)));
                }
                self.eof = true;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn exact_length() {
        let mut encoder = LengthEncoder::new(5);
        let mut dst = BytesMut::new();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"He")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"llo")), &mut dst).unwrap();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
        assert!(encoder.is_finish());
        assert_eq!(&dst[..], b"Hello");
    }

    #[test]
    fn mismatched_length() {
        let mut dst = BytesMut::new();

        let mut encoder = LengthEncoder::new(2);
        let result = encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"Hello")), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));

        let mut encoder = LengthEncoder::new(5);
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"He")), &mut dst).unwrap();
        let result = encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));
    }
}
