use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier wrapper for tuition postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TuitionId(pub String);

/// Moderation status of a posting. Every new posting enters the board as
/// `Pending`; only the explicit status transition moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuitionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TuitionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TuitionStatus::Pending => "pending",
            TuitionStatus::Approved => "approved",
            TuitionStatus::Rejected => "rejected",
        }
    }
}

/// Identity of the student behind a posting: the addressable email plus
/// whatever display fields the client sent along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterIdentity {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Payload for creating a posting. Subject, class, salary, and similar
/// descriptors ride in the opaque `details` document; `schedule` and
/// `start_date` are modeled separately only because public listings must
/// withhold them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuitionPosting {
    pub posted_by: PosterIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Stored posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuitionRecord {
    pub id: TuitionId,
    pub status: TuitionStatus,
    pub posted_by: PosterIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl TuitionRecord {
    /// Public board entry. Schedule, start date, and poster identity are
    /// withheld until an application is accepted.
    pub fn listing_view(&self) -> TuitionListing {
        TuitionListing {
            id: self.id.clone(),
            status: self.status.label(),
            details: self.details.clone(),
        }
    }
}

/// Sanitized projection served on the public board.
#[derive(Debug, Clone, Serialize)]
pub struct TuitionListing {
    pub id: TuitionId,
    pub status: &'static str,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Partial update merged into a stored posting. Status and poster identity
/// are not expressible here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TuitionPatch {
    #[serde(default)]
    pub schedule: Option<Value>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}
