//! Decoder for bodies delimited by the end of the connection.
//!
//! A response without `content-length` or chunked `transfer-encoding` runs until
//! the server closes the connection
//! ([RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112#section-6.3), rule 8).

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{ParseError, PayloadItem};

/// Hands out whatever arrives until the transport reports EOF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseDecoder {
    eof: bool,
}

impl CloseDecoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl Decoder for CloseDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.eof {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        Ok(Some(PayloadItem::Chunk(src.split().freeze())))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            return self.decode(src);
        }

        trace!("connection closed, body complete");
        self.eof = true;
        Ok(Some(PayloadItem::Eof))
    }
}
