use std::fmt;

use crate::headers::token::split_outside_quotes;

/// The `cookie` request header: an ordered list of `name=value` pairs.
///
/// Repeated `cookie` fields concatenate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    pairs: Vec<(String, String)>,
}

impl Cookie {
    pub fn parse(value: &str) -> Self {
        let mut cookie = Self::default();
        cookie.extend(value);
        cookie
    }

    pub fn extend(&mut self, value: &str) {
        for item in split_outside_quotes(value, b';') {
            let (name, value) = item.split_once('=').unwrap_or((item, ""));
            self.pairs.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// First cookie with the given (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// A single `set-cookie` line.
///
/// `set-cookie` is never comma split: `expires` attributes contain commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    attributes: Vec<(String, Option<String>)>,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), attributes: Vec::new() }
    }

    pub fn parse(value: &str) -> Self {
        let mut items = value.split(';');
        let pair = items.next().unwrap_or_default();
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));

        let attributes = items
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| match item.split_once('=') {
                Some((name, value)) => (name.trim().to_string(), Some(value.trim().to_string())),
                None => (item.to_string(), None),
            })
            .collect();

        Self { name: name.trim().to_string(), value: value.trim().to_string(), attributes }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.attributes.push((name.into(), value.map(str::to_string)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Case-insensitive attribute lookup; `Some(None)` for flags like `HttpOnly`.
    pub fn attribute(&self, name: &str) -> Option<Option<&str>> {
        self.attributes.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_deref())
    }

    pub fn is_http_only(&self) -> bool {
        self.attribute("httponly").is_some()
    }

    pub fn is_secure(&self) -> bool {
        self.attribute("secure").is_some()
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        for (name, value) in &self.attributes {
            match value {
                Some(value) => write!(f, "; {name}={value}")?,
                None => write!(f, "; {name}")?,
            }
        }
        Ok(())
    }
}
