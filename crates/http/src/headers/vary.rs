use std::fmt;

use crate::headers::token::split_list;

/// A parsed `vary` header: the lower-cased names of the request headers a
/// response depends on, or `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vary {
    names: Vec<String>,
}

impl Vary {
    pub fn parse(value: &str) -> Self {
        let mut vary = Self::default();
        vary.extend(value);
        vary
    }

    pub fn extend(&mut self, value: &str) {
        for name in split_list(value) {
            let name = name.to_ascii_lowercase();
            if !self.names.contains(&name) {
                self.names.push(name);
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn is_wildcard(&self) -> bool {
        self.contains("*")
    }
}

impl fmt::Display for Vary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(", "))
    }
}
