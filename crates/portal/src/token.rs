//! Credentials exchanged for a portal token.

use std::fmt;

/// Default lifetime requested for generated tokens.
pub const DEFAULT_TOKEN_EXPIRATION_MINUTES: u32 = 360;

/// Username and password for `generateToken`. Both are case sensitive.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
