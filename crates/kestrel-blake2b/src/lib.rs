//! # KESTREL BLAKE2b
//!
//! Portable BLAKE2b (RFC 7693) for the KESTREL toolkit.
//!
//! This crate provides:
//! - Parameter block construction (digest length, key, salt, personalization,
//!   tree fields)
//! - The scalar BLAKE2b compression function
//! - A streaming state with explicit lifecycle errors
//! - One-shot hashing, including the 80-byte block header digest
//! - `std::io` integration
//!
//! ## Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Digest length | 1..=64 bytes | 64 |
//! | Key | 0..=64 bytes | empty |
//! | Salt | 0..=16 bytes | zeros |
//! | Personalization | 0..=16 bytes | zeros |
//!
//! ## Usage
//!
//! ```
//! use kestrel_blake2b::{Params, hash};
//!
//! let digest = hash(b"abc", b"", 64, b"", b"").unwrap();
//! assert_eq!(&digest.to_hex()[..16], "ba80a53f981c4d0d");
//!
//! let mut state = Params::new().digest_length(32).build().unwrap().to_state();
//! state.update(b"a").unwrap();
//! state.update(b"bc").unwrap();
//! let digest = state.finalize().unwrap();
//! assert_eq!(digest.len(), 32);
//! assert!(state.finalize().is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod compress;
pub mod digest;
pub mod error;
pub mod hash;
pub mod io;
pub mod params;
pub mod state;

pub use digest::Digest;
pub use error::{Blake2bError, ConfigError, StateError};
pub use hash::{blake2b_512, hash, hash_block_header, hash_with};
pub use io::hash_reader;
pub use params::{HashConfig, ParameterBlock, Params, configure};
pub use state::Blake2bState;

/// Compression block size
pub const BLOCK_SIZE: usize = 128;

/// Maximum (and default) digest size
pub const MAX_DIGEST_SIZE: usize = 64;

/// Maximum key size
pub const KEY_SIZE: usize = 64;

/// Salt size
pub const SALT_SIZE: usize = 16;

/// Personalization size
pub const PERSONAL_SIZE: usize = 16;
