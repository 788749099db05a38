//! Connection limits and framing options.

/// Default maximum number of fields in a header or trailer section
pub const MAX_HEADER_NUM: usize = 64;

/// Default maximum size in bytes of a header or trailer section
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Settings for one [`Connection`](crate::connection::Connection).
///
/// ```
/// use micro_h1::ConnectionConfig;
///
/// let config = ConnectionConfig::default().max_headers(32).strict_framing(false);
/// assert_eq!(config.get_max_headers(), 32);
/// assert!(!config.is_strict_framing());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    max_header_bytes: usize,
    max_headers: usize,
    strict_framing: bool,
    read_buffer_size: usize,
    write_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: MAX_HEADER_BYTES,
            max_headers: MAX_HEADER_NUM,
            strict_framing: true,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit on the bytes of a message head, start line included.
    #[must_use]
    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    /// When set, a message carrying both chunked `transfer-encoding` and
    /// `content-length` is rejected. Otherwise chunked wins and a warning is
    /// logged.
    #[must_use]
    pub fn strict_framing(mut self, strict_framing: bool) -> Self {
        self.strict_framing = strict_framing;
        self
    }

    #[must_use]
    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    #[must_use]
    pub fn write_buffer_size(mut self, write_buffer_size: usize) -> Self {
        self.write_buffer_size = write_buffer_size;
        self
    }

    pub fn get_max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn get_max_headers(&self) -> usize {
        self.max_headers
    }

    pub fn is_strict_framing(&self) -> bool {
        self.strict_framing
    }

    pub fn get_read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn get_write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }
}
