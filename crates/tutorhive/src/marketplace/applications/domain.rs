use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::marketplace::tuitions::TuitionId;

/// Identifier wrapper for tutor applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Application lifecycle. `Paid` is written exclusively by the payment
/// reconciliation engine; the general update path cannot reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Rejected,
    Paid,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Paid => "paid",
        }
    }
}

/// Which stored applications block a fresh attempt for the same
/// (tutor, tuition) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReapplyScope {
    /// Any stored application blocks, rejected ones included.
    AnyExisting,
    /// Only pending and paid applications block; a rejected tutor may submit
    /// a fresh attempt.
    ActiveOnly,
}

impl ReapplyScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" | "any_existing" => Some(Self::AnyExisting),
            "active" | "active_only" => Some(Self::ActiveOnly),
            _ => None,
        }
    }

    pub(crate) fn blocks(self, status: ApplicationStatus) -> bool {
        match self {
            Self::AnyExisting => true,
            Self::ActiveOnly => !matches!(status, ApplicationStatus::Rejected),
        }
    }
}

/// Tutor-submitted application payload. Qualifications, expected salary, and
/// similar descriptors ride in the opaque `details` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub tuition_id: TuitionId,
    pub tutor_email: String,
    pub student_email: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Stored application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub tuition_id: TuitionId,
    pub tutor_email: String,
    pub student_email: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}
