use crate::codec::{RequestEncoder, ResponseEncoder};
use crate::protocol::{Message, PayloadSize, RequestHead, ResponseHead, SendError};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: BytesMut,
    request_encoder: RequestEncoder,
    response_encoder: ResponseEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(buffer_size),
            request_encoder: RequestEncoder::new(),
            response_encoder: ResponseEncoder::new(),
        }
    }

    pub fn clear_buf(&mut self) {
        self.buffer.clear();
    }

    /// Bytes encoded but not yet flushed to the transport.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn write_request<D>(&mut self, item: Message<(RequestHead, PayloadSize), D>) -> Result<(), SendError>
    where
        D: Buf,
    {
        self.request_encoder.encode(item, &mut self.buffer)
    }

    #[inline]
    pub fn write_response<D>(&mut self, item: Message<(ResponseHead, PayloadSize), D>) -> Result<(), SendError>
    where
        D: Buf,
    {
        self.response_encoder.encode(item, &mut self.buffer)
    }

    #[inline]
    pub async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.writer.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(self.writer.flush().await?)
    }

    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.flush().await?;
        Ok(self.writer.shutdown().await?)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
