use crate::headers::Field;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use std::io::Write;
use tracing::{trace, warn};

use tokio_util::codec::Encoder;

/// Writes each payload chunk as one chunk of a `transfer-encoding: chunked` body.
///
/// Empty chunks are skipped, since a zero-sized chunk would end the body.
/// Trailers handed in before [`PayloadItem::Eof`] are written after the last
/// chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: usize,
    trailers: Vec<Field>,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false, send_size: 0, trailers: Vec::new() }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            warn!("encode payload_item after the last chunk, ignored");
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                let size = bytes.remaining();
                if size == 0 {
                    return Ok(());
                }
                write!(helper::Writer(dst), "{size:X}\r\n")?;
                dst.reserve(size + 2);
                dst.put(bytes);
                dst.extend_from_slice(b"\r\n");
                self.send_size += size;
                Ok(())
            }
            PayloadItem::Trailers(fields) => {
                self.trailers.extend(fields);
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n");
                for field in self.trailers.drain(..) {
                    dst.extend_from_slice(field.name().as_bytes());
                    dst.extend_from_slice(b": ");
                    dst.extend_from_slice(field.value().as_bytes());
                    dst.extend_from_slice(b"\r\n");
                }
                dst.extend_from_slice(b"\r\n");
                trace!(send_size = self.send_size, "finished chunked body");
                Ok(())
            }
        }
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn encode_all(items: Vec<PayloadItem>) -> BytesMut {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();
        for item in items {
            encoder.encode(item, &mut dst).unwrap();
        }
        assert!(encoder.is_finish());
        dst
    }

    #[test]
    fn chunks_in_hex() {
        let dst = encode_all(vec![
            PayloadItem::Chunk(Bytes::from_static(b"Wiki")),
            PayloadItem::Chunk(Bytes::new()),
            PayloadItem::Chunk(Bytes::from(vec![b'a'; 26])),
            PayloadItem::Eof,
        ]);
        let expected = format!("4\r\nWiki\r\n1A\r\n{}\r\n0\r\n\r\n", "a".repeat(26));
        assert_eq!(&dst[..], expected.as_bytes());
    }

    #[test]
    fn empty_body() {
        assert_eq!(&encode_all(vec![PayloadItem::Eof])[..], b"0\r\n\r\n");
    }

    #[test]
    fn trailers_after_last_chunk() {
        let dst = encode_all(vec![
            PayloadItem::Chunk(Bytes::from_static(b"hello")),
            PayloadItem::Trailers(vec![Field::new("X-Checksum", "abc")]),
            PayloadItem::Eof,
        ]);
        assert_eq!(&dst[..], b"5\r\nhello\r\n0\r\nX-Checksum: abc\r\n\r\n");
    }
}
