//! Crate-wide error type.

use thiserror::Error;

/// Errors produced by the simulation, evolution and persistence layers.
///
/// A missing persisted genome is not an error; see
/// [`crate::simulation::persistence::GenomeStore::load`].
#[derive(Debug, Error)]
pub enum Error {
    /// A tensor does not have the shape fixed by the network topology.
    #[error("shape mismatch for {tensor}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Name of the offending tensor (`w1`, `b1`, `w2` or `b2`).
        tensor: &'static str,
        /// Shape required by the topology.
        expected: (usize, usize),
        /// Shape that was supplied.
        found: (usize, usize),
    },
    /// A persisted record does not hold exactly four tensors.
    #[error("genome record holds {found} tensors, expected {expected}")]
    TensorCount {
        /// Required tensor count.
        expected: usize,
        /// Tensor count in the record.
        found: usize,
    },
    /// Persisted data exists but cannot be read as a genome record.
    #[error("stored genome `{key}` is corrupt: {reason}")]
    CorruptRecord {
        /// Key the record was stored under.
        key: String,
        /// What made the record unusable.
        reason: String,
    },
    /// A persistence key that cannot be mapped to a storage slot.
    #[error("invalid genome key `{0}`")]
    InvalidKey(String),
    /// An arena was requested without any controller to drive it.
    #[error("at least one controller is required to run a match")]
    MissingController,
    /// The number of controllers does not match the number of snakes.
    #[error("expected {expected} controllers, got {found}")]
    ControllerCount {
        /// Snakes in the arena.
        expected: usize,
        /// Controllers supplied.
        found: usize,
    },
    /// Configuration values that cannot drive a simulation.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON encoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
