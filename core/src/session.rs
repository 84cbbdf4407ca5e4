//! The credential slot and what goes into the `Authorization` header.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Header value sent while no token has been captured, under
/// `AnonymousAuth::Null`.
pub const NULL_AUTHORIZATION: &str = "null";

/// What to send as `Authorization` before any token exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnonymousAuth {
    /// Send the literal `null`.
    #[default]
    Null,
    /// Leave the header out.
    Omit,
}

impl fmt::Display for AnonymousAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnonymousAuth::Null => "null",
            AnonymousAuth::Omit => "omit",
        })
    }
}

impl FromStr for AnonymousAuth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" => Ok(AnonymousAuth::Null),
            "omit" => Ok(AnonymousAuth::Omit),
            other => Err(format!("unknown anonymous auth policy '{other}' (expected null or omit)")),
        }
    }
}

/// Single slot holding the most recently issued bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    token: Option<String>,
}

impl Credential {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot already holding `Bearer <access>`.
    pub fn bearer(access: &str) -> Self {
        Self {
            token: Some(format!("Bearer {access}")),
        }
    }

    /// Full header value, `Bearer <access>`, if a token was captured.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.token.is_some()
    }

    /// Replace whatever is stored with `Bearer <access>`.
    pub fn replace(&mut self, access: &str) {
        self.token = Some(format!("Bearer {access}"));
    }

    /// Value of the `Authorization` header, or `None` to leave it out.
    pub fn authorization(&self, anonymous: AnonymousAuth) -> Option<String> {
        match (&self.token, anonymous) {
            (Some(token), _) => Some(token.clone()),
            (None, AnonymousAuth::Null) => Some(NULL_AUTHORIZATION.to_string()),
            (None, AnonymousAuth::Omit) => None,
        }
    }
}

/// Per-session state threaded through every dispatch.
#[derive(Debug, Clone, Default)]
pub struct Session {
    credential: Credential,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Take the token out of a token endpoint's reply.
    ///
    /// Returns true if the slot changed. Replies without an `access` field
    /// leave the previous token in place.
    pub fn capture_token(&mut self, reply: &Value) -> bool {
        match extract_access(reply) {
            Some(access) => {
                self.credential.replace(&access);
                true
            }
            None => false,
        }
    }
}

/// The `access` field of a token reply. Strings are taken as-is, any other
/// value as its compact JSON text.
pub fn extract_access(reply: &Value) -> Option<String> {
    match reply.get("access")? {
        Value::String(access) => Some(access.clone()),
        other => Some(other.to_string()),
    }
}
