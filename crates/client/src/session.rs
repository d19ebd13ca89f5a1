//! Login state, persisted as JSON so a restart keeps the user signed in.

use std::path::PathBuf;
use std::sync::RwLock;

use contracts::domain::salesperson::Salesperson;
use contracts::system::auth::LoginResponse;
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub is_admin: bool,
    pub is_superadmin: bool,
    pub salesperson: Option<Salesperson>,
}

impl Session {
    pub fn from_login(username: &str, response: LoginResponse) -> Self {
        Self {
            token: response.access_token,
            username: username.to_string(),
            is_admin: response.is_admin,
            is_superadmin: response.is_superadmin,
            salesperson: response.salesperson,
        }
    }

    pub fn is_hospitality(&self) -> bool {
        self.salesperson
            .as_ref()
            .map(Salesperson::is_hospitality)
            .unwrap_or(false)
    }
}

/// Current session plus the file it is mirrored to
pub struct SessionStore {
    path: Option<PathBuf>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Open the store, restoring a previously saved session if one is readable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Session>(&contents) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            path: Some(path),
            current: RwLock::new(current),
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set(&self, session: Session) -> ClientResult<()> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&session)?)?;
        }
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove session file {}: {}", path.display(), e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "tok".into(),
            username: "ann".into(),
            is_admin: false,
            is_superadmin: false,
            salesperson: Some(Salesperson {
                salesman_no: 101,
                salesman_name: "Ann".into(),
                role: Some("Hospitality".into()),
            }),
        }
    }

    #[test]
    fn test_session_survives_reopen_and_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open(&path);
        assert!(!store.is_authenticated());
        store.set(session()).unwrap();

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.current(), Some(session()));
        assert!(reopened.current().unwrap().is_hospitality());

        reopened.clear();
        assert!(!path.exists());
        assert_eq!(SessionStore::open(&path).token(), None);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(SessionStore::open(&path).current().is_none());
    }
}
