//! BLAKE2b error types.

use thiserror::Error;

/// Invalid hash configuration, reported before any state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Digest length outside `1..=64`
    #[error("invalid digest length: expected 1..=64, got {0}")]
    InvalidDigestLength(usize),

    /// Key longer than 64 bytes
    #[error("key too long: expected at most 64 bytes, got {0}")]
    KeyTooLong(usize),

    /// Salt longer than 16 bytes
    #[error("salt too long: expected at most 16 bytes, got {0}")]
    SaltTooLong(usize),

    /// Personalization longer than 16 bytes
    #[error("personalization too long: expected at most 16 bytes, got {0}")]
    PersonalTooLong(usize),
}

/// Operation invoked in the wrong lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// The state was already finalized
    #[error("hash state already finalized")]
    Finalized,

    /// Output buffer cannot hold the configured digest
    #[error("output buffer too short: expected {needed}, got {actual}")]
    OutputTooShort {
        /// Configured digest length
        needed: usize,
        /// Length of the caller's buffer
        actual: usize,
    },
}

/// Any BLAKE2b error.
#[derive(Debug, Error)]
pub enum Blake2bError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Lifecycle misuse
    #[error(transparent)]
    State(#[from] StateError),

    /// Reading input failed
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}
