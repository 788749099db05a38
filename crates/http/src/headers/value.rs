use std::fmt;
use std::time::SystemTime;

use httpdate::HttpDate;

use crate::headers::{Authorization, CacheControl, ConnectionOptions, Cookie, EntityTag, EntityTags, SetCookie, Vary};

/// The value of every field sharing one name, combined by the name's
/// [`MergePolicy`](crate::headers::MergePolicy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergedValue {
    /// Last occurrence wins.
    Single(String),
    /// Comma separated tokens of every occurrence, in arrival order.
    List(Vec<String>),
    /// Every occurrence verbatim, never comma split.
    Multiple(Vec<String>),
    Connection(ConnectionOptions),
    CacheControl(CacheControl),
    Vary(Vary),
    Authorization(Authorization),
    ETag(EntityTag),
    ETags(EntityTags),
    Cookie(Cookie),
    SetCookie(Vec<SetCookie>),
    Date(HttpDate),
}

impl MergedValue {
    /// Convenience constructor for a [`MergedValue::List`].
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) | Self::Multiple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&ConnectionOptions> {
        match self {
            Self::Connection(options) => Some(options),
            _ => None,
        }
    }

    pub fn as_cache_control(&self) -> Option<&CacheControl> {
        match self {
            Self::CacheControl(cache_control) => Some(cache_control),
            _ => None,
        }
    }

    pub fn as_vary(&self) -> Option<&Vary> {
        match self {
            Self::Vary(vary) => Some(vary),
            _ => None,
        }
    }

    pub fn as_authorization(&self) -> Option<&Authorization> {
        match self {
            Self::Authorization(authorization) => Some(authorization),
            _ => None,
        }
    }

    pub fn as_etag(&self) -> Option<&EntityTag> {
        match self {
            Self::ETag(etag) => Some(etag),
            _ => None,
        }
    }

    pub fn as_etags(&self) -> Option<&EntityTags> {
        match self {
            Self::ETags(etags) => Some(etags),
            _ => None,
        }
    }

    pub fn as_cookie(&self) -> Option<&Cookie> {
        match self {
            Self::Cookie(cookie) => Some(cookie),
            _ => None,
        }
    }

    pub fn as_set_cookies(&self) -> Option<&[SetCookie]> {
        match self {
            Self::SetCookie(cookies) => Some(cookies),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<SystemTime> {
        match self {
            Self::Date(date) => Some(SystemTime::from(*date)),
            _ => None,
        }
    }
}

impl fmt::Display for MergedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => f.write_str(value),
            Self::List(items) | Self::Multiple(items) => f.write_str(&items.join(", ")),
            Self::Connection(options) => options.fmt(f),
            Self::CacheControl(cache_control) => cache_control.fmt(f),
            Self::Vary(vary) => vary.fmt(f),
            Self::Authorization(authorization) => authorization.fmt(f),
            Self::ETag(etag) => etag.fmt(f),
            Self::ETags(etags) => etags.fmt(f),
            Self::Cookie(cookie) => cookie.fmt(f),
            Self::SetCookie(cookies) => {
                for (i, cookie) in cookies.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{cookie}")?;
                }
                Ok(())
            }
            Self::Date(date) => date.fmt(f),
        }
    }
}

impl From<&str> for MergedValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for MergedValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<SystemTime> for MergedValue {
    fn from(value: SystemTime) -> Self {
        Self::Date(HttpDate::from(value))
    }
}

impl PartialEq<str> for MergedValue {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::Single(value) => value == other,
            value => value.to_string() == other,
        }
    }
}

impl PartialEq<&str> for MergedValue {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wire_forms() {
        assert_eq!(MergedValue::list(["a", "b"]).to_string(), "a, b");
        assert_eq!(MergedValue::from("text/html"), "text/html");
        assert_eq!(MergedValue::Connection(ConnectionOptions::parse("close")), "close");

        let date = MergedValue::from(SystemTime::UNIX_EPOCH);
        assert_eq!(date, "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(date.as_date(), Some(SystemTime::UNIX_EPOCH));
    }
}
