use std::fmt;

use crate::headers::token::{quote_if_needed, split_list, unquote};

/// A parsed `cache-control` header.
///
/// Directives keep their arrival order. Repeated fields simply concatenate,
/// so `cache-control: no-cache` followed by `cache-control: max-age=0` yields
/// both directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    directives: Vec<(String, Option<String>)>,
}

impl CacheControl {
    pub const NO_CACHE: &'static str = "no-cache";
    pub const NO_STORE: &'static str = "no-store";
    pub const PUBLIC: &'static str = "public";
    pub const PRIVATE: &'static str = "private";
    pub const MUST_REVALIDATE: &'static str = "must-revalidate";
    pub const MAX_AGE: &'static str = "max-age";
    pub const S_MAXAGE: &'static str = "s-maxage";

    pub fn parse(value: &str) -> Self {
        let mut cache_control = Self::default();
        cache_control.extend(value);
        cache_control
    }

    pub fn extend(&mut self, value: &str) {
        for item in split_list(value) {
            let directive = match item.split_once('=') {
                Some((name, value)) => (name.trim().to_ascii_lowercase(), Some(unquote(value))),
                None => (item.to_ascii_lowercase(), None),
            };
            self.directives.push(directive);
        }
    }

    /// Appends a directive; `value` is `None` for boolean directives.
    pub fn push(&mut self, name: &str, value: Option<&str>) {
        self.directives.push((name.to_ascii_lowercase(), value.map(str::to_string)));
    }

    pub fn directives(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.directives.iter().map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Returns the value of the last occurrence of a valued directive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.directives.iter().rev().find(|(n, _)| n.eq_ignore_ascii_case(name)).and_then(|(_, value)| value.as_deref())
    }

    pub fn is_no_cache(&self) -> bool {
        self.contains(Self::NO_CACHE)
    }

    pub fn is_no_store(&self) -> bool {
        self.contains(Self::NO_STORE)
    }

    pub fn is_public(&self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_private(&self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_must_revalidate(&self) -> bool {
        self.contains(Self::MUST_REVALIDATE)
    }

    pub fn max_age(&self) -> Option<u64> {
        self.get(Self::MAX_AGE).and_then(|v| v.parse().ok())
    }

    pub fn s_maxage(&self) -> Option<u64> {
        self.get(Self::S_MAXAGE).and_then(|v| v.parse().ok())
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.directives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{name}={}", quote_if_needed(value))?,
                None => f.write_str(name)?,
            }
        }
        Ok(())
    }
}
