use std::path::PathBuf;

use chrono::Duration;

use crate::auth::{Authenticator, SessionRegistry, SessionStore};
use crate::error::{AdminError, Result};

pub const DEFAULT_STATE_DIR: &str = ".welfare-admin";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;

/// Settings gathered from flags, the environment and `.env`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub admin_email: Option<String>,
    pub admin_password_hash: Option<String>,
    pub state_dir: PathBuf,
    pub session_ttl_minutes: i64,
    pub data_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_password_hash: None,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn admin_email(&self) -> Result<&str> {
        self.admin_email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| AdminError::Validation("WELFARE_ADMIN_EMAIL must be set".to_string()))
    }

    pub fn authenticator(&self) -> Result<Authenticator> {
        let hash = self
            .admin_password_hash
            .as_deref()
            .filter(|hash| !hash.trim().is_empty())
            .ok_or_else(|| {
                AdminError::Validation(
                    "WELFARE_ADMIN_PASSWORD_HASH must be set (see `hash-password`)".to_string(),
                )
            })?;
        if self.session_ttl_minutes <= 0 {
            return Err(AdminError::Validation(format!(
                "session TTL must be positive, got {} minutes",
                self.session_ttl_minutes
            )));
        }
        Ok(Authenticator::new(
            self.admin_email()?,
            hash,
            Duration::minutes(self.session_ttl_minutes),
        ))
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::in_dir(&self.state_dir)
    }

    /// Sessions issued by `login`, kept beside the session file.
    pub fn session_registry(&self) -> Result<SessionRegistry> {
        SessionRegistry::open(&self.state_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;

    #[test]
    fn missing_credentials_are_validation_errors() {
        let config = AppConfig::default();
        assert!(matches!(config.admin_email(), Err(AdminError::Validation(_))));
        assert!(matches!(config.authenticator(), Err(AdminError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let config = AppConfig {
            admin_email: Some("admin@welfare.org".to_string()),
            admin_password_hash: Some(hash_password("pw").unwrap()),
            session_ttl_minutes: 0,
            ..AppConfig::default()
        };
        assert!(config.authenticator().is_err());

        let config = AppConfig {
            session_ttl_minutes: 15,
            ..config
        };
        let session = config.authenticator().unwrap().login("admin@welfare.org", "pw").unwrap();
        assert_eq!(session.user.email, "admin@welfare.org");
    }

    #[test]
    fn login_is_recorded_in_the_state_dir_registry() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            admin_email: Some("admin@welfare.org".to_string()),
            admin_password_hash: Some(hash_password("pw").unwrap()),
            state_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let session = config.authenticator().unwrap().login("admin@welfare.org", "pw").unwrap();
        assert!(!config.session_registry().unwrap().verify(&session, chrono::Utc::now()));

        config.session_registry().unwrap().register(&session).unwrap();
        assert!(config.session_registry().unwrap().verify(&session, chrono::Utc::now()));
    }

    #[test]
    fn session_file_lives_in_state_dir() {
        let config = AppConfig {
            state_dir: PathBuf::from("/tmp/welfare-state"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.session_store().path(),
            std::path::Path::new("/tmp/welfare-state/session.json")
        );
    }
}
