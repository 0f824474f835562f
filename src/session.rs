//! Per-user session context.
//!
//! A [`Session`] owns the state that lives for one user's visit: who is
//! logged in and the medication list being assembled for a prescription.
//! Nothing here is global; each user gets their own value.

use crate::auth::CredentialVerifier;
use crate::error::{Error, Result};
use crate::generate::numbered_list;

/// State scoped to one user session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<String>,
    medications: Vec<String>,
}

impl Session {
    /// Create an unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate against a verifier.
    ///
    /// A rejected attempt leaves the session logged out, even when another
    /// user was logged in before.
    pub fn login(
        &mut self,
        verifier: &dyn CredentialVerifier,
        identifier: &str,
        secret: &str,
    ) -> Result<()> {
        if verifier.verify(identifier, secret) {
            log::info!("User {} logged in", identifier);
            self.user = Some(identifier.to_string());
            Ok(())
        } else {
            log::warn!("Rejected login for {}", identifier);
            self.user = None;
            Err(Error::AccessDenied)
        }
    }

    /// End the session, dropping all session data.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("User {} logged out", user);
        }
        self.medications.clear();
    }

    /// Check if a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Get the logged-in user.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Fail with [`Error::AccessDenied`] unless a user is logged in.
    pub fn require_auth(&self) -> Result<&str> {
        self.user().ok_or(Error::AccessDenied)
    }

    /// Add a medication; blank input is ignored.
    pub fn add_medication(&mut self, medication: &str) {
        let medication = medication.trim();
        if !medication.is_empty() {
            self.medications.push(medication.to_string());
        }
    }

    /// Clear the medication list.
    pub fn clear_medications(&mut self) {
        self.medications.clear();
    }

    /// Get the medications added so far.
    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    /// Numbered medication list as written into prescriptions.
    pub fn medication_text(&self) -> String {
        numbered_list(&self.medications)
    }
}
