//! Rider session identity
//!
//! A session is created at sign-in, read at every app start and destroyed at
//! sign-out. The persisted form may be partial (e.g. the host is known from
//! a previous run but the rider id is not); absent fields are `None`, never
//! an error, and consumers check `is_complete()` before entering the
//! delivery lifecycle.

use serde::{Deserialize, Serialize};

use crate::types::RiderId;

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

/// Everything the client knows about the signed-in rider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Backend host (IP or hostname), user-supplied at sign-in.
    pub host: Option<String>,
    /// Numeric rider id resolved right after login.
    pub rider_id: Option<RiderId>,
    /// Display name derived from the email local part.
    pub rider_name: Option<String>,
    /// Email used at sign-in.
    pub email: Option<String>,
    /// Opaque bearer token.
    pub auth_token: Option<String>,
    /// Opaque refresh token, stored but never interpreted.
    pub refresh_token: Option<String>,
}

impl Session {
    /// True when the session carries everything the delivery lifecycle needs.
    pub fn is_complete(&self) -> bool {
        self.host.is_some()
            && self.rider_id.is_some()
            && self.rider_name.is_some()
            && self.auth_token.is_some()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn rider_name(&self) -> Option<&str> {
        self.rider_name.as_deref()
    }
}

// ----------------------------------------------------------------------------
// Display Name Derivation
// ----------------------------------------------------------------------------

/// Derive the rider display name from an email address.
///
/// Takes the local part, lower-cases it, then upper-cases only the first
/// character: `"Mario.Rossi@x.com"` becomes `"Mario.rossi"`. The backend
/// keys several per-rider endpoints on exactly this form.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email).to_lowercase();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => local,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_matches_backend_convention() {
        assert_eq!(display_name_from_email("Mario.Rossi@x.com"), "Mario.rossi");
        assert_eq!(display_name_from_email("anna@example.org"), "Anna");
        assert_eq!(display_name_from_email("X@y.z"), "X");
    }

    #[test]
    fn display_name_without_at_sign_uses_whole_string() {
        assert_eq!(display_name_from_email("LUIGI"), "Luigi");
    }

    #[test]
    fn partial_session_is_not_complete() {
        let session = Session {
            host: Some("192.168.1.10".to_string()),
            ..Default::default()
        };
        assert!(!session.is_complete());
    }

    #[test]
    fn full_session_is_complete() {
        let session = Session {
            host: Some("192.168.1.10".to_string()),
            rider_id: Some(RiderId::new(7)),
            rider_name: Some("Mario.rossi".to_string()),
            email: Some("mario.rossi@x.com".to_string()),
            auth_token: Some("tok".to_string()),
            refresh_token: Some("ref".to_string()),
        };
        assert!(session.is_complete());
    }
}
