//! How repeated header fields combine.
//!
//! Every header name maps to one [`MergePolicy`] through a static table;
//! names missing from the table use [`MergePolicy::Split`]. A policy builds
//! the first [`MergedValue`] for a name with [`MergePolicy::parse`] and folds
//! each later field into it with [`MergePolicy::merge_into`].

use httpdate::HttpDate;

use crate::headers::token::split_list;
use crate::headers::{Authorization, CacheControl, ConnectionOptions, Cookie, Credentials, EntityTag, EntityTags, MergedValue, SetCookie, Vary};
use crate::protocol::HeaderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergePolicy {
    /// Only the last occurrence is kept.
    Singleton,
    /// Comma separated tokens collected into one list.
    Split,
    /// Each occurrence kept verbatim.
    Multiple,
    Connection,
    CacheControl,
    Vary,
    Authorization,
    ETag,
    ETags,
    Cookie,
    SetCookie,
    Date,
}

impl MergePolicy {
    /// Looks up the policy for a header name, matched case-insensitively.
    pub fn for_name(name: &str) -> Self {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            return Self::lookup(&name.to_ascii_lowercase());
        }
        Self::lookup(name)
    }

    fn lookup(name: &str) -> Self {
        match name {
            "age" | "content-disposition" | "content-length" | "content-location" | "content-md5" | "content-range"
            | "content-type" | "expect" | "from" | "host" | "if-range" | "location" | "max-forwards" | "range"
            | "referer" | "retry-after" | "server" | "upgrade-insecure-requests" | "user-agent" => Self::Singleton,

            "www-authenticate" | "proxy-authenticate" | "link" => Self::Multiple,

            "connection" => Self::Connection,
            "cache-control" => Self::CacheControl,
            "vary" => Self::Vary,
            "authorization" | "proxy-authorization" => Self::Authorization,
            "etag" => Self::ETag,
            "if-match" | "if-none-match" => Self::ETags,
            "cookie" => Self::Cookie,
            "set-cookie" => Self::SetCookie,
            "date" | "expires" | "last-modified" | "if-modified-since" | "if-unmodified-since" => Self::Date,

            _ => Self::Split,
        }
    }

    /// Whether a later field replaces the earlier ones instead of adding to them.
    ///
    /// [`Headers::merge_from`](crate::headers::Headers::merge_from) uses this
    /// to decide between `set` and `add`.
    pub fn replaces(self) -> bool {
        matches!(self, Self::Singleton | Self::ETag | Self::Date)
    }

    /// Builds the merged value from the first field of a name.
    pub fn parse(self, name: &str, value: &str) -> Result<MergedValue, HeaderError> {
        let value = value.trim();
        let merged = match self {
            Self::Singleton => MergedValue::Single(value.to_string()),
            Self::Split => MergedValue::List(split_list(value).into_iter().map(str::to_string).collect()),
            Self::Multiple => MergedValue::Multiple(vec![value.to_string()]),
            Self::Connection => MergedValue::Connection(ConnectionOptions::parse(value)),
            Self::CacheControl => MergedValue::CacheControl(CacheControl::parse(value)),
            Self::Vary => MergedValue::Vary(Vary::parse(value)),
            Self::Authorization => MergedValue::Authorization(Authorization::parse(name, value)?),
            Self::ETag => MergedValue::ETag(EntityTag::parse(name, value)?),
            Self::ETags => MergedValue::ETags(EntityTags::parse(name, value)?),
            Self::Cookie => MergedValue::Cookie(Cookie::parse(value)),
            Self::SetCookie => MergedValue::SetCookie(vec![SetCookie::parse(value)]),
            Self::Date => MergedValue::Date(parse_date(name, value)?),
        };
        Ok(merged)
    }

    /// Folds one more field into an existing merged value.
    pub fn merge_into(self, existing: &mut MergedValue, name: &str, value: &str) -> Result<(), HeaderError> {
        let value = value.trim();
        match (self, existing) {
            (Self::Split, MergedValue::List(items)) => {
                items.extend(split_list(value).into_iter().map(str::to_string));
            }
            (Self::Multiple, MergedValue::Multiple(items)) => items.push(value.to_string()),
            (Self::Connection, MergedValue::Connection(options)) => options.extend(value),
            (Self::CacheControl, MergedValue::CacheControl(cache_control)) => cache_control.extend(value),
            (Self::Vary, MergedValue::Vary(vary)) => vary.extend(value),
            (Self::Authorization, MergedValue::Authorization(authorization)) => {
                authorization.push(Credentials::parse(name, value)?);
            }
            (Self::ETags, MergedValue::ETags(etags)) => etags.extend(name, value)?,
            (Self::Cookie, MergedValue::Cookie(cookie)) => cookie.extend(value),
            (Self::SetCookie, MergedValue::SetCookie(cookies)) => cookies.push(SetCookie::parse(value)),
            // singleton, etag and date: the later field supersedes
            (policy, existing) => *existing = policy.parse(name, value)?,
        }
        Ok(())
    }
}

fn parse_date(name: &str, value: &str) -> Result<HttpDate, HeaderError> {
    value.parse::<HttpDate>().map_err(|e| HeaderError::invalid_value(name, format!("{value}: {e}")))
}

/// Merges a run of raw values that all belong to `name`.
pub(crate) fn merge_values<'a, I>(name: &str, values: I) -> Result<Option<MergedValue>, HeaderError>
where
    I: IntoIterator<Item = &'a str>,
{
    let policy = MergePolicy::for_name(name);
    let mut merged: Option<MergedValue> = None;
    for value in values {
        match merged.as_mut() {
            Some(existing) => policy.merge_into(existing, name, value)?,
            None => merged = Some(policy.parse(name, value)?),
        }
    }
    Ok(merged)
}
