//! HTTP connection handling module
//!
//! [`Connection`] drives the message codecs over a transport, one exchange at
//! a time:
//!
//! - reads requests and writes responses on the server side
//! - writes requests and reads responses on the client side
//! - picks the outgoing framing from the headers and the body
//! - decides after every exchange whether the connection stays open
//!
//! # Example
//!
//! ```
//! use micro_h1::connection::{Connection, ConnectionState};
//! use micro_h1::headers::Headers;
//! use http::{StatusCode, Version};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), micro_h1::protocol::HttpError> {
//! let wire: &[u8] = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let mut connection = Connection::new(wire, Vec::new());
//!
//! while let Some(request) = connection.read_request().await? {
//!     let body = format!("hello {}", request.authority().unwrap_or("stranger"));
//!     connection.write_response(Version::HTTP_11, StatusCode::OK, "", Headers::new(), body).await?;
//! }
//!
//! assert_eq!(connection.state(), ConnectionState::Closed);
//! # Ok(())
//! # }
//! ```

mod http_connection;
mod message_reader;
mod message_writer;

pub use http_connection::{is_persistent, Connection, ConnectionState};
