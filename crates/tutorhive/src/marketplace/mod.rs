//! Tuition marketplace domains: postings, tutor applications, payment
//! reconciliation, and accounts.
//!
//! Every domain follows the same layout: `domain` holds the records and
//! status machines, `store` the storage port, `service` the manager owning
//! the business rules, and `router` the HTTP surface. Concrete storage and
//! processor adapters live with the binaries.

pub mod applications;
pub mod payments;
pub mod store;
pub mod tuitions;
pub mod users;

pub use store::StoreError;
