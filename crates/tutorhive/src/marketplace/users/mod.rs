//! Accounts: idempotent signup keyed by email, profile management, and the
//! public tutor directory.

pub mod domain;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{SignupDraft, SignupOutcome, TutorCard, UserAccount, UserId};
pub use router::user_router;
pub use service::{AccountPatch, UserService, UserServiceError};
pub use store::UserStore;
