//! HTTP Basic credentials resolved from the server location.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Username and optional password for the local server.
///
/// Immutable once resolved. The password is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: String,
    password: Option<String>,
}

impl Credentials {
    /// Create credentials from a username and optional password.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Get the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Compute the `Authorization` header value.
    ///
    /// Encodes `username:password`, or `username:` when there is no password.
    pub fn authorization_header(&self) -> String {
        let raw = format!(
            "{}:{}",
            self.username,
            self.password.as_deref().unwrap_or_default()
        );
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
