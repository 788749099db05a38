//! The header data model.
//!
//! [`Headers`] keeps every field exactly as it arrived and answers lookups
//! through a merged view: all fields sharing a (case-insensitive) name are
//! combined according to the name's [`MergePolicy`]. Some names merge into
//! plain strings or lists, others into structured values such as
//! [`ConnectionOptions`] or [`CacheControl`].
//!
//! ```
//! use micro_h1::headers::Headers;
//!
//! let mut headers = Headers::new();
//! headers.add("Connection", "Keep-Alive").unwrap();
//! headers.add("Cache-Control", "private, max-age=60").unwrap();
//!
//! let connection = headers.get("connection").unwrap().and_then(|v| v.as_connection()).unwrap();
//! assert!(connection.is_keep_alive());
//!
//! let cache_control = headers.get("cache-control").unwrap().and_then(|v| v.as_cache_control()).unwrap();
//! assert_eq!(cache_control.max_age(), Some(60));
//! ```

mod authorization;
mod cache_control;
mod connection;
mod cookie;
mod etag;
#[allow(clippy::module_inception, reason = "the collection type names the module")]
mod headers;
mod merged;
mod policy;
pub(crate) mod token;
mod value;
mod vary;

pub use authorization::{Authorization, Credentials};
pub use cache_control::CacheControl;
pub use connection::ConnectionOptions;
pub use cookie::{Cookie, SetCookie};
pub use etag::{EntityTag, EntityTags};
pub use headers::{Field, Headers, TRAILER};
pub use merged::MergedHeaders;
pub use policy::MergePolicy;
pub use value::MergedValue;
pub use vary::Vary;

pub use httpdate::HttpDate;
