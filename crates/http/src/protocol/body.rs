use bytes::{Bytes, BytesMut};

/// A message body.
///
/// Bodies read from a [`Connection`](crate::connection::Connection) are
/// always fully drained, so they are either `Empty` or `Full`. `Chunks` lets a
/// writer hand over a body in fragments; on HTTP/1.1 each fragment becomes
/// one chunk on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Full(Bytes),
    Chunks(Vec<Bytes>),
}

impl Body {
    /// Total number of payload bytes.
    pub fn len(&self) -> usize {
        match self {
            Body::Empty => 0,
            Body::Full(bytes) => bytes.len(),
            Body::Chunks(chunks) => chunks.iter().map(Bytes::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The body as one contiguous buffer, copying only for `Chunks`.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Body::Empty => Bytes::new(),
            Body::Full(bytes) => bytes,
            Body::Chunks(chunks) => {
                let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
                for chunk in chunks {
                    buf.extend_from_slice(&chunk);
                }
                buf.freeze()
            }
        }
    }

    /// The non-empty fragments in write order.
    pub(crate) fn into_chunks(self) -> Vec<Bytes> {
        match self {
            Body::Empty => Vec::new(),
            Body::Full(bytes) => vec![bytes],
            Body::Chunks(chunks) => chunks,
        }
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .collect()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Full(bytes)
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Body::Full(Bytes::from_static(value.as_bytes()))
    }
}

impl From<&'static [u8]> for Body {
    fn from(value: &'static [u8]) -> Self {
        Body::Full(Bytes::from_static(value))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Full(Bytes::from(value))
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Full(Bytes::from(value))
    }
}

impl From<Vec<Bytes>> for Body {
    fn from(chunks: Vec<Bytes>) -> Self {
        Body::Chunks(chunks)
    }
}
