//! Entity tags for `etag`, `if-match` and `if-none-match`, see
//! [RFC 9110 Section 8.8.3](https://www.rfc-editor.org/rfc/rfc9110#section-8.8.3).

use std::fmt;

use crate::headers::token::split_list;
use crate::protocol::HeaderError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    weak: bool,
    tag: String,
}

impl EntityTag {
    pub fn strong(tag: impl Into<String>) -> Self {
        Self { weak: false, tag: tag.into() }
    }

    pub fn weak(tag: impl Into<String>) -> Self {
        Self { weak: true, tag: tag.into() }
    }

    pub fn parse(name: &str, value: &str) -> Result<Self, HeaderError> {
        let value = value.trim();
        let (weak, quoted) = match value.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, value),
        };

        let tag = quoted
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .filter(|tag| !tag.contains('"'))
            .ok_or_else(|| HeaderError::invalid_value(name, format!("{value} is not a quoted entity tag")))?;

        Ok(Self { weak, tag: tag.to_string() })
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Both tags must be strong and identical.
    pub fn strong_eq(&self, other: &EntityTag) -> bool {
        !self.weak && !other.weak && self.tag == other.tag
    }

    /// Tags are identical, ignoring the weak flag.
    pub fn weak_eq(&self, other: &EntityTag) -> bool {
        self.tag == other.tag
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            f.write_str("W/")?;
        }
        write!(f, "\"{}\"", self.tag)
    }
}

/// The value of `if-match` / `if-none-match`: either `*` or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTags {
    Any,
    Tags(Vec<EntityTag>),
}

impl EntityTags {
    pub fn parse(name: &str, value: &str) -> Result<Self, HeaderError> {
        let mut tags = Self::Tags(Vec::new());
        tags.extend(name, value)?;
        Ok(tags)
    }

    pub fn extend(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        for item in split_list(value) {
            if item == "*" {
                *self = Self::Any;
                continue;
            }
            let tag = EntityTag::parse(name, item)?;
            if let Self::Tags(tags) = self {
                tags.push(tag);
            }
        }
        Ok(())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// `if-match` semantics: strong comparison.
    pub fn matches_strong(&self, etag: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|tag| tag.strong_eq(etag)),
        }
    }

    /// `if-none-match` semantics: weak comparison.
    pub fn matches_weak(&self, etag: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|tag| tag.weak_eq(etag)),
        }
    }
}

impl fmt::Display for EntityTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Tags(tags) => {
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{tag}")?;
                }
                Ok(())
            }
        }
    }
}
