//! Tuition postings: creation, moderation status, owner and public views.

pub mod domain;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{
    PosterIdentity, TuitionId, TuitionListing, TuitionPatch, TuitionPosting, TuitionRecord,
    TuitionStatus,
};
pub use router::tuition_router;
pub use service::{TuitionService, TuitionServiceError};
pub use store::TuitionStore;
