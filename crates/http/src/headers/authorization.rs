use std::fmt;

use base64ct::{Base64, Encoding};

use crate::protocol::HeaderError;

/// One set of credentials: an auth scheme followed by its opaque token or
/// parameters, e.g. `Basic dXNlcjpwYXNz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    scheme: String,
    token: String,
}

impl Credentials {
    pub fn new(scheme: impl Into<String>, token: impl Into<String>) -> Self {
        Self { scheme: scheme.into(), token: token.into() }
    }

    pub fn parse(name: &str, value: &str) -> Result<Self, HeaderError> {
        let value = value.trim();
        let (scheme, token) = value.split_once([' ', '\t']).unwrap_or((value, ""));
        if scheme.is_empty() || !crate::headers::token::is_token(scheme) {
            return Err(HeaderError::invalid_value(name, "missing auth scheme"));
        }
        Ok(Self::new(scheme, token.trim()))
    }

    /// `Basic` credentials, the user and password joined by `:` and base64 encoded.
    pub fn basic(user: &str, password: &str) -> Self {
        Self::new("Basic", Base64::encode_string(format!("{user}:{password}").as_bytes()))
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new("Bearer", token)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_basic(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("basic")
    }

    pub fn is_bearer(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("bearer")
    }

    /// Decodes `Basic` credentials back into user and password.
    ///
    /// Returns `None` for other schemes or a token that is not valid base64 UTF-8.
    pub fn basic_parts(&self) -> Option<(String, String)> {
        if !self.is_basic() {
            return None;
        }
        let decoded = Base64::decode_vec(&self.token).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        Some((user.to_string(), password.to_string()))
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.is_empty() {
            f.write_str(&self.scheme)
        } else {
            write!(f, "{} {}", self.scheme, self.token)
        }
    }
}

/// The `authorization` / `proxy-authorization` value.
///
/// Normally a single set of credentials, but repeated fields are kept so a
/// caller can see every attempt; [`Authorization::current`] is the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    credentials: Vec<Credentials>,
}

impl Authorization {
    pub fn parse(name: &str, value: &str) -> Result<Self, HeaderError> {
        Ok(Self { credentials: vec![Credentials::parse(name, value)?] })
    }

    pub fn basic(user: &str, password: &str) -> Self {
        Self::from(Credentials::basic(user, password))
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::from(Credentials::bearer(token))
    }

    pub fn push(&mut self, credentials: Credentials) {
        self.credentials.push(credentials);
    }

    pub fn current(&self) -> Option<&Credentials> {
        self.credentials.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credentials> {
        self.credentials.iter()
    }
}

impl From<Credentials> for Authorization {
    fn from(credentials: Credentials) -> Self {
        Self { credentials: vec![credentials] }
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, credentials) in self.credentials.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{credentials}")?;
        }
        Ok(())
    }
}
