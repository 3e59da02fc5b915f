use thiserror::Error;

use crate::models::EntityKind;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("failed to load {kind}: {reason}")]
    Fetch { kind: EntityKind, reason: String },
    #[error("{kind} record {id} not found")]
    NotFound { kind: EntityKind, id: u32 },
    #[error("invalid value: {0}")]
    Validation(String),
    #[error("session is missing, invalid or expired")]
    Unauthorized,
    #[error("password hash error: {0}")]
    Hash(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AdminError>;
