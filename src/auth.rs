//! Credential verification.
//!
//! Call sites depend on the [`CredentialVerifier`] trait only, so the static
//! store below can be swapped for a real identity provider.

use std::collections::HashMap;
use std::path::Path;

use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Capability to check a user identifier against a secret.
pub trait CredentialVerifier: Send + Sync {
    /// Return `true` when the secret is valid for the identifier.
    fn verify(&self, identifier: &str, secret: &str) -> bool;
}

/// A fixed in-memory credential table.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user and return self.
    pub fn with_user(mut self, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        self.users.insert(identifier.into(), secret.into());
        self
    }

    /// Load a store from a JSON object mapping user names to secrets.
    pub fn from_json(json: &str) -> Result<Self> {
        let users: HashMap<String, String> = serde_json::from_str(json)?;
        if users.is_empty() {
            return Err(Error::Credentials("no users defined".into()));
        }
        Ok(Self { users })
    }

    /// Load a store from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if the store has no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// Compared against when the identifier is unknown, so a miss costs the
// same as a wrong secret.
const UNKNOWN_USER_SECRET: &str = "\u{0}unknown-user\u{0}";

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, identifier: &str, secret: &str) -> bool {
        let expected = self.users.get(identifier);
        let candidate = expected.map_or(UNKNOWN_USER_SECRET, String::as_str);
        let matches: bool = candidate.as_bytes().ct_eq(secret.as_bytes()).into();
        matches && expected.is_some()
    }
}
