//! Core HTTP protocol types.
//!
//! - **Messages**: what the codecs exchange
//!   - [`Message`]: either a message head or a payload item
//!   - [`PayloadItem`]: a body chunk, the trailers of a chunked body, or EOF
//!   - [`PayloadSize`]: how a body is delimited on the wire
//!
//! - **Requests and responses**: [`RequestHead`] / [`Request`] and
//!   [`ResponseHead`] / [`Response`], each carrying a
//!   [`Headers`](crate::headers::Headers) collection, plus the [`Body`] they
//!   are paired with.
//!
//! - **Error Handling**:
//!   - [`HttpError`]: Top-level error type returned by the connection
//!   - [`ParseError`]: Errors while reading a message
//!   - [`SendError`]: Errors while writing a message
//!   - [`HeaderError`]: Errors raised by the header collection itself

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod framing;

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub(crate) use response::status_forbids_body;
pub use response::Response;
pub use response::ResponseHead;

mod body;
pub use body::Body;

mod error;
pub use error::HeaderError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
