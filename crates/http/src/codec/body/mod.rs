//! HTTP body handling module for processing request and response payloads
//!
//! This module provides functionality for encoding and decoding HTTP message bodies
//! using different framing strategies.
//!
//! # Components
//!
//! ## Decoders
//! - `ChunkedDecoder`: Handles chunked transfer encoded payloads and their trailers
//! - `LengthDecoder`: Processes fixed-length payloads
//! - `CloseDecoder`: Reads until the peer closes the connection
//! - [`PayloadDecoder`]: Main decoder that coordinates different decoding strategies
//!
//! ## Encoders
//! - `ChunkedEncoder`: Implements chunked transfer encoding
//! - `LengthEncoder`: Handles fixed-length payload encoding
//! - [`PayloadEncoder`]: Main encoder that manages different encoding strategies

mod chunked_decoder;
mod chunked_encoder;
mod close_decoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
