//! Persisted session store
//!
//! One JSON file under the data directory, written after sign-in and removed
//! at sign-out. The on-disk key names (`ip`, `riderId`, ...) are the ones
//! the backend tooling expects to find, so they differ from the in-memory
//! field names. A missing or partial file is not an error: absent fields
//! load as `None` and `is_complete()` decides whether the session is usable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use courier_core::{RiderId, Session, SessionStoreError};

use crate::error::Result;

// ----------------------------------------------------------------------------
// Stored Form
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip: Option<String>,
    #[serde(default, rename = "riderId", skip_serializing_if = "Option::is_none")]
    rider_id: Option<u64>,
    #[serde(default, rename = "riderName", skip_serializing_if = "Option::is_none")]
    rider_name: Option<String>,
    #[serde(default, rename = "riderEmail", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, rename = "authToken", skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session {
            host: stored.ip,
            rider_id: stored.rider_id.map(RiderId::new),
            rider_name: stored.rider_name,
            email: stored.email,
            auth_token: stored.auth_token,
            refresh_token: stored.refresh_token,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        StoredSession {
            ip: session.host.clone(),
            rider_id: session.rider_id.map(|id| id.value()),
            rider_name: session.rider_name.clone(),
            email: session.email.clone(),
            auth_token: session.auth_token.clone(),
            refresh_token: session.refresh_token.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Session Store
// ----------------------------------------------------------------------------

/// File-backed store for the rider session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session. A missing file yields an empty session.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| SessionStoreError::Read(e.to_string()))
            .map_err(courier_core::CourierError::from)?;
        let stored: StoredSession = serde_json::from_str(&raw)
            .map_err(|e| SessionStoreError::Read(e.to_string()))
            .map_err(courier_core::CourierError::from)?;
        Ok(stored.into())
    }

    /// Persist the session, creating the data directory if needed.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionStoreError::Write(e.to_string()))
                .map_err(courier_core::CourierError::from)?;
        }
        let stored = StoredSession::from(session);
        let raw = serde_json::to_string_pretty(&stored)
            .map_err(|e| SessionStoreError::Write(e.to_string()))
            .map_err(courier_core::CourierError::from)?;
        std::fs::write(&self.path, raw)
            .map_err(|e| SessionStoreError::Write(e.to_string()))
            .map_err(courier_core::CourierError::from)?;
        Ok(())
    }

    /// Remove the session file. Already-gone is fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(courier_core::CourierError::from(SessionStoreError::Clear(
                e.to_string(),
            ))
            .into()),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn full_session() -> Session {
        Session {
            host: Some("192.168.1.10".to_string()),
            rider_id: Some(RiderId::new(4)),
            rider_name: Some("Mario.rossi".to_string()),
            email: Some("mario.rossi@x.com".to_string()),
            auth_token: Some("tok".to_string()),
            refresh_token: Some("ref".to_string()),
        }
    }

    #[test]
    fn round_trips_a_full_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&full_session()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, full_session());
        assert!(loaded.is_complete());
    }

    #[test]
    fn missing_file_loads_an_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, Session::default());
        assert!(!loaded.is_complete());
    }

    #[test]
    fn partial_file_loads_with_absent_fields_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        std::fs::write(store.path(), r#"{ "ip": "10.0.0.5" }"#).unwrap();

        let loaded = store.load().unwrap();

        assert_eq!(loaded.host.as_deref(), Some("10.0.0.5"));
        assert!(loaded.rider_id.is_none());
        assert!(!loaded.is_complete());
    }

    #[test]
    fn uses_backend_key_names_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&full_session()).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();

        assert!(raw.contains("\"riderId\""));
        assert!(raw.contains("\"riderName\""));
        assert!(raw.contains("\"authToken\""));
        assert!(!raw.contains("rider_id"));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&full_session()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        assert!(!store.path().exists());
    }
}
