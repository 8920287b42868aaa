//! # Identity Newtypes
//!
//! `Principal` names an actor (account). `IdentityHash` is the opaque
//! credential material bound to one principal. Keeping them distinct types
//! means an issuer can never be passed where a hash is expected.
//!
//! ## Security Invariant
//!
//! The registry trusts the principals it is handed: authentication happens
//! upstream. Construction here only rejects values no upstream could have
//! meant (empty, control characters, oversize), so that map keys stay
//! printable and bounded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The well-known administrator principal installed at genesis.
pub const GENESIS_ADMIN: &str = "ST000000000000000000002AMW42H";

/// Maximum length of a principal, in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 256;

/// Unique identifier for an account or actor.
///
/// Used both as the key of the registry and as a value (issuer, guardian,
/// administrator). Ordering is lexicographic so guardian sets iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal, rejecting empty, oversize, or control-character input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { kind: "principal" });
        }
        if value.len() > MAX_PRINCIPAL_LEN {
            return Err(ValidationError::TooLong {
                kind: "principal",
                max: MAX_PRINCIPAL_LEN,
                actual: value.len(),
            });
        }
        if let Some(ch) = value.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidCharacter {
                kind: "principal",
                ch,
            });
        }
        Ok(Self(value))
    }

    /// The genesis administrator.
    pub fn genesis_admin() -> Self {
        Self(GENESIS_ADMIN.to_string())
    }

    /// Access the principal as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque credential material vouched for by an issuer.
///
/// Held exactly as supplied (typically a `0x`-prefixed hex digest). It is
/// never decoded, normalised, or verified; two hashes are equal only if
/// their bytes are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityHash(String);

impl IdentityHash {
    /// Wrap issuer-supplied credential material. Rejects only the empty value.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                kind: "identity hash",
            });
        }
        Ok(Self(value))
    }

    /// The credential material as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The credential material as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdentityHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IdentityHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdentityHash> for String {
    fn from(h: IdentityHash) -> Self {
        h.0
    }
}
