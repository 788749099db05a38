use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::ParseError;

/// Buffers the read half of a transport and feeds it to a decoder.
///
/// The decoder is passed per call, so one reader serves both the request and
/// the response direction of a connection.
#[derive(Debug)]
pub struct MessageReader<R> {
    reader: R,
    buffer: BytesMut,
    buffer_size: usize,
    eof: bool,
}

impl<R> MessageReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn with_capacity(reader: R, buffer_size: usize) -> Self {
        Self { reader, buffer: BytesMut::with_capacity(buffer_size), buffer_size, eof: false }
    }

    /// Whether a complete line is waiting in the buffer.
    pub fn has_line(&self) -> bool {
        self.buffer.contains(&b'\n')
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Runs the decoder over the buffered bytes without touching the transport.
    pub fn decode<D>(&mut self, decoder: &mut D) -> Result<Option<D::Item>, ParseError>
    where
        D: Decoder<Error = ParseError>,
    {
        if self.eof {
            return decoder.decode_eof(&mut self.buffer);
        }
        decoder.decode(&mut self.buffer)
    }

    /// Reads more bytes from the transport, returns false once it reports EOF.
    pub async fn fill(&mut self) -> Result<bool, ParseError> {
        if self.eof {
            return Ok(false);
        }

        self.buffer.reserve(self.buffer_size);
        let read = self.reader.read_buf(&mut self.buffer).await?;
        trace!(read, buffered = self.buffer.len(), "read from transport");
        if read == 0 {
            self.eof = true;
        }
        Ok(read > 0)
    }

    /// The next item of the decoder, reading from the transport as needed.
    ///
    /// `None` means the transport ended where the decoder allows it to.
    pub async fn next<D>(&mut self, decoder: &mut D) -> Result<Option<D::Item>, ParseError>
    where
        D: Decoder<Error = ParseError>,
    {
        loop {
            if let Some(item) = self.decode(decoder)? {
                return Ok(Some(item));
            }
            if !self.fill().await? {
                return decoder.decode_eof(&mut self.buffer);
            }
        }
    }

    /// Gives back the transport together with the bytes read but not decoded.
    pub fn into_parts(self) -> (R, BytesMut) {
        (self.reader, self.buffer)
    }
}
