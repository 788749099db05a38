//! Start line and header section codecs
//!
//! - [`RequestHeadDecoder`] / [`ResponseHeadDecoder`]: parse a message head
//!   with `httparse`, enforce the header limits and select the body framing
//! - [`HeaderEncoder`]: writes a message head, rewriting the framing headers
//!   to match the body that follows

mod header_decoder;
mod header_encoder;

pub use header_decoder::{RequestHeadDecoder, ResponseHeadDecoder};
pub use header_encoder::HeaderEncoder;
