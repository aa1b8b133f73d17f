//! Account records and their public projections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier for a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// A registered account. `role` is an opaque label (student, tutor,
/// admin); the marketplace never enumerates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Free-form profile document (about, education, photo, subjects…).
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// Signup payload; email is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupDraft {
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// What signup reports; an existing email is an outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    Created(UserAccount),
    AlreadyRegistered(UserAccount),
}

/// Public tutor listing entry. Contact and biography fields stay private:
/// no email, and `about`/`education` are stripped from the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorCard {
    pub id: UserId,
    pub name: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserAccount {
    pub fn tutor_card(&self) -> TutorCard {
        let mut profile = self.profile.clone();
        profile.remove("about");
        profile.remove("education");
        TutorCard {
            id: self.id.clone(),
            name: self.name.clone(),
            profile,
        }
    }
}
