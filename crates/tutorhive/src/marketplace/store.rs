//! Error taxonomy shared by every storage port.

/// Failure modes a storage adapter may surface. `Conflict` is reserved for
/// unique-key violations so managers can distinguish a lost insert race from
/// an outage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
