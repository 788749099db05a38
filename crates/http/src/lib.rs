//! The HTTP/1.1 wire protocol, without the server around it
//!
//! This crate reads and writes HTTP/1.x messages over any tokio transport. It
//! covers the parts of the protocol every client and server shares:
//!
//! - start lines and header sections, parsed with `httparse`
//! - a header collection that merges repeated fields the way each header
//!   defines it, and keeps chunked trailers apart from the head
//! - body framing: `content-length`, chunked with trailers, and bodies that end
//!   with the connection
//! - connection persistence, decided from the protocol version and the
//!   `connection` header of both messages
//!
//! Routing, TLS and HTTP/2 are left to the application around it.
//!
//! # Example
//!
//! ```
//! use micro_h1::connection::Connection;
//! use micro_h1::headers::Headers;
//! use micro_h1::protocol::Body;
//! use http::{Method, StatusCode, Version};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), micro_h1::protocol::HttpError> {
//! let (client_io, server_io) = tokio::io::duplex(4096);
//! let mut client = Connection::from_stream(client_io);
//! let mut server = Connection::from_stream(server_io);
//!
//! client.write_request("example.com", Method::GET, "/", Version::HTTP_11, Headers::new(), Body::Empty).await?;
//!
//! let request = server.read_request().await?.expect("one request");
//! assert_eq!(request.authority(), Some("example.com"));
//!
//! let mut headers = Headers::new();
//! headers.add("Content-Type", "text/plain")?;
//! server.write_response(Version::HTTP_11, StatusCode::OK, "", headers, "Hello World!").await?;
//!
//! let response = client.read_response(&Method::GET).await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body().clone().into_bytes(), "Hello World!");
//! assert!(client.persistent());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`headers`]: the header collection and the merge policies
//! - [`protocol`]: message types, body framing selection and errors
//! - [`codec`]: `tokio_util` decoders and encoders for heads and bodies
//! - [`connection`]: the exchange state machine over a transport
//! - [`config`]: limits and framing options
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - Bodies are transferred whole, not streamed
//! - Maximum header size: 8KB by default
//! - Maximum number of headers: 64 by default

pub mod codec;
pub mod config;
pub mod connection;
pub mod headers;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

pub use config::ConnectionConfig;
