//! Bodies framed by `Content-Length`
//! ([RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112#section-6.2)).
//!
//! Bytes past the declared length are left in the buffer: they belong to the
//! next pipelined message.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Counts down the declared length while handing out whatever is buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    /// Whether every declared byte has been read.
    pub fn is_finish(&self) -> bool {
        self.remaining == 0
    }

    /// Bytes still expected.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.is_finish() {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let take = usize::try_from(self.remaining).map_or(src.len(), |remaining| cmp::min(remaining, src.len()));
        let chunk = src.split_to(take).freeze();

        self.remaining -= chunk.len() as u64;
        Ok(Some(PayloadItem::Chunk(chunk)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_declared_length() {
        let mut buffer = BytesMut::from(&b"Wikipedia in\r\n\r\nchunks."[..]);
        let mut decoder = LengthDecoder::new(9);

        let payload = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(payload.is_chunk());
        assert_eq!(payload.as_bytes().unwrap(), &b"Wikipedia"[..]);
        assert_eq!(&buffer[..], b" in\r\n\r\nchunks.");

        assert!(decoder.is_finish());
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn partial_reads() {
        let mut buffer = BytesMut::from(&b"Hel"[..]);
        let mut length_decoder = LengthDecoder::new(5);

        let payload = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(payload.as_bytes().unwrap(), &b"Hel"[..]);
        assert_eq!(length_decoder.remaining(), 2);
        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"loGET");
        let payload = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(payload.as_bytes().unwrap(), &b"lo"[..]);
        assert_eq!(&buffer[..], b"GET");
    }
}
