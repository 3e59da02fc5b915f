//! Closed status enumerations and their presentation tones.
//!
//! Every status type deserializes leniently: a value outside the closed set
//! becomes `Unrecognized` and keeps its raw text, so a bad row never fails a
//! whole collection. Parsing through `FromStr` is strict and is what status
//! updates go through. Both paths ignore case and store the lowercase tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// Presentation category for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Info,
    Error,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Info => "info",
            Tone::Error => "error",
            Tone::Neutral => "default",
        }
    }
}

pub trait StatusTag: Clone + fmt::Debug + FromStr<Err = AdminError> + Send + Sync {
    fn as_str(&self) -> &str;
    fn tone(&self) -> Tone;
}

fn rejected(value: &str, allowed: &[&str]) -> AdminError {
    AdminError::Validation(format!(
        "status '{value}' is not one of: {}",
        allowed.join(", ")
    ))
}

/// Status of a student or senior account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemberStatus {
    Active,
    Inactive,
    Unrecognized(String),
}

impl MemberStatus {
    pub const ALLOWED: &'static [&'static str] = &["active", "inactive"];
}

impl FromStr for MemberStatus {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            other => Err(rejected(other, Self::ALLOWED)),
        }
    }
}

impl From<String> for MemberStatus {
    fn from(value: String) -> Self {
        value
            .parse()
            .unwrap_or(MemberStatus::Unrecognized(value))
    }
}

impl From<MemberStatus> for String {
    fn from(status: MemberStatus) -> Self {
        status.as_str().to_string()
    }
}

impl StatusTag for MemberStatus {
    fn as_str(&self) -> &str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Unrecognized(raw) => raw,
        }
    }

    fn tone(&self) -> Tone {
        match self {
            MemberStatus::Active => Tone::Success,
            MemberStatus::Inactive => Tone::Neutral,
            MemberStatus::Unrecognized(_) => Tone::Neutral,
        }
    }
}

/// Payment status of a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
    Unrecognized(String),
}

impl DonationStatus {
    pub const ALLOWED: &'static [&'static str] = &["pending", "completed", "failed"];
}

impl FromStr for DonationStatus {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(DonationStatus::Pending),
            "completed" => Ok(DonationStatus::Completed),
            "failed" => Ok(DonationStatus::Failed),
            other => Err(rejected(other, Self::ALLOWED)),
        }
    }
}

impl From<String> for DonationStatus {
    fn from(value: String) -> Self {
        value
            .parse()
            .unwrap_or(DonationStatus::Unrecognized(value))
    }
}

impl From<DonationStatus> for String {
    fn from(status: DonationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl StatusTag for DonationStatus {
    fn as_str(&self) -> &str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Completed => "completed",
            DonationStatus::Failed => "failed",
            DonationStatus::Unrecognized(raw) => raw,
        }
    }

    fn tone(&self) -> Tone {
        match self {
            DonationStatus::Completed => Tone::Success,
            DonationStatus::Pending => Tone::Warning,
            DonationStatus::Failed => Tone::Error,
            DonationStatus::Unrecognized(_) => Tone::Neutral,
        }
    }
}

/// Lifecycle of a help request. `assigned` is read as `in_progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Unrecognized(String),
}

impl RequestStatus {
    pub const ALLOWED: &'static [&'static str] =
        &["pending", "in_progress", "completed", "cancelled"];
}

impl FromStr for RequestStatus {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "in_progress" | "assigned" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(rejected(other, Self::ALLOWED)),
        }
    }
}

impl From<String> for RequestStatus {
    fn from(value: String) -> Self {
        value
            .parse()
            .unwrap_or(RequestStatus::Unrecognized(value))
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl StatusTag for RequestStatus {
    fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Unrecognized(raw) => raw,
        }
    }

    fn tone(&self) -> Tone {
        match self {
            RequestStatus::Pending => Tone::Warning,
            RequestStatus::InProgress => Tone::Info,
            RequestStatus::Completed => Tone::Success,
            RequestStatus::Cancelled => Tone::Error,
            RequestStatus::Unrecognized(_) => Tone::Neutral,
        }
    }
}
