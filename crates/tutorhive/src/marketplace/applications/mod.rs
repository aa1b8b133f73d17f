//! Tutor applications: intake, the one-application-per-tuition rule, and the
//! pending/rejected/paid lifecycle.

pub mod domain;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationRequest, ApplicationStatus, ReapplyScope,
};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
pub use store::ApplicationStore;
