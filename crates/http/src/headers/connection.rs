use std::fmt;

use crate::headers::token::split_list;

/// The options carried by a `connection` header.
///
/// Tokens are stored lower-cased, so queries are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    tokens: Vec<String>,
}

impl ConnectionOptions {
    pub const CLOSE: &'static str = "close";
    pub const KEEP_ALIVE: &'static str = "keep-alive";
    pub const UPGRADE: &'static str = "upgrade";

    pub fn parse(value: &str) -> Self {
        let mut options = Self::default();
        options.extend(value);
        options
    }

    pub fn extend(&mut self, value: &str) {
        self.tokens.extend(split_list(value).into_iter().map(str::to_ascii_lowercase));
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
    }

    pub fn is_close(&self) -> bool {
        self.contains(Self::CLOSE)
    }

    pub fn is_keep_alive(&self) -> bool {
        self.contains(Self::KEEP_ALIVE)
    }

    pub fn is_upgrade(&self) -> bool {
        self.contains(Self::UPGRADE)
    }
}

impl fmt::Display for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(", "))
    }
}
