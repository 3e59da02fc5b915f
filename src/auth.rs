//! Admin login, session tokens and the persisted session file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AdminError, Result};

/// Hashes an admin password for `WELFARE_ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AdminError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a login attempt against the configured hash. A hash that does not
/// parse is a configuration error, not a failed login.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AdminError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub email: String,
    pub name: String,
    pub session_expires_at: DateTime<Utc>,
}

/// A logged-in admin. Stored on disk as the `adminToken` / `adminUser` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "adminToken")]
    pub token: Uuid,
    #[serde(rename = "adminUser")]
    pub user: AdminUser,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.user.session_expires_at
    }
}

/// Verifies admin credentials against the configured argon2 hash.
#[derive(Debug, Clone)]
pub struct Authenticator {
    email: String,
    password_hash: String,
    ttl: Duration,
}

impl Authenticator {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, ttl: Duration) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            ttl,
        }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email_matches = email.trim().eq_ignore_ascii_case(&self.email);
        let password_matches = verify_password(password, &self.password_hash)?;

        if !(email_matches && password_matches) {
            warn!(email = %email, "rejected admin login");
            return Err(AdminError::Unauthorized);
        }

        let session = Session {
            token: Uuid::new_v4(),
            user: AdminUser {
                email: self.email.clone(),
                name: display_name(&self.email),
                session_expires_at: Utc::now() + self.ttl,
            },
        };
        info!(email = %session.user.email, expires_at = %session.user.session_expires_at, "admin logged in");
        Ok(session)
    }
}

fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssuedSession {
    email: String,
    expires_at: DateTime<Utc>,
}

/// Tokens handed out by a successful login, as the data source sees them.
///
/// A session is only as good as its entry here: the email and expiry checked
/// are the ones recorded at login, not the ones the client presents.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    path: Option<PathBuf>,
    issued: HashMap<Uuid, IssuedSession>,
}

impl SessionRegistry {
    pub const FILE_NAME: &'static str = "issued_sessions.json";

    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the registry file in `state_dir`, dropping expired entries.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(Self::FILE_NAME);
        let mut issued: HashMap<Uuid, IssuedSession> = HashMap::new();
        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(entries) => issued = entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "discarding unreadable session registry");
                }
            }
        }

        let now = Utc::now();
        let before = issued.len();
        issued.retain(|_, entry| now < entry.expires_at);
        let registry = Self {
            path: Some(path),
            issued,
        };
        if registry.issued.len() != before {
            debug!(pruned = before - registry.issued.len(), "pruned expired sessions");
            registry.persist()?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, session: &Session) -> Result<()> {
        self.issued.insert(
            session.token,
            IssuedSession {
                email: session.user.email.clone(),
                expires_at: session.user.session_expires_at,
            },
        );
        self.persist()
    }

    /// Returns whether the token was known.
    pub fn revoke(&mut self, token: Uuid) -> Result<bool> {
        let removed = self.issued.remove(&token).is_some();
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn verify(&self, session: &Session, now: DateTime<Utc>) -> bool {
        self.issued.get(&session.token).is_some_and(|entry| {
            entry.email.eq_ignore_ascii_case(&session.user.email) && now < entry.expires_at
        })
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.issued)?)?;
        Ok(())
    }
}

/// Session persisted between runs, cleared on logout or auth failure.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding unreadable session file");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
