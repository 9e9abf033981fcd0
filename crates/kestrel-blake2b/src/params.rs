//! BLAKE2b parameter block.
//!
//! The parameter block is a fixed 64-byte little-endian record that is
//! XORed word-wise into the IV when a hash state is initialized:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | digest length |
//! | 1 | 1 | key length |
//! | 2 | 1 | fanout |
//! | 3 | 1 | depth |
//! | 4 | 4 | leaf length |
//! | 8 | 8 | node offset |
//! | 16 | 1 | node depth |
//! | 17 | 1 | inner length |
//! | 18 | 14 | reserved |
//! | 32 | 16 | salt |
//! | 48 | 16 | personalization |
//!
//! [`Params`] is the unvalidated builder; [`Params::build`] checks every
//! length and yields a [`HashConfig`] from which states are created.

use crate::error::ConfigError;
use crate::state::Blake2bState;
use crate::{KEY_SIZE, MAX_DIGEST_SIZE, PERSONAL_SIZE, SALT_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Serialized parameter block size in bytes.
pub const PARAM_BLOCK_SIZE: usize = 64;

/// Validated, serializable BLAKE2b parameter block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterBlock {
    digest_length: u8,
    key_length: u8,
    fanout: u8,
    depth: u8,
    leaf_length: u32,
    node_offset: u64,
    node_depth: u8,
    inner_length: u8,
    salt: [u8; SALT_SIZE],
    personal: [u8; PERSONAL_SIZE],
}

impl ParameterBlock {
    /// Digest length in bytes.
    #[must_use]
    pub fn digest_length(&self) -> usize {
        usize::from(self.digest_length)
    }

    /// Key length in bytes.
    #[must_use]
    pub fn key_length(&self) -> usize {
        usize::from(self.key_length)
    }

    /// Zero-padded salt.
    #[must_use]
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    /// Zero-padded personalization.
    #[must_use]
    pub fn personal(&self) -> &[u8; PERSONAL_SIZE] {
        &self.personal
    }

    /// Serialize to the 64-byte wire record.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PARAM_BLOCK_SIZE] {
        let mut bytes = [0u8; PARAM_BLOCK_SIZE];
        bytes[0] = self.digest_length;
        bytes[1] = self.key_length;
        bytes[2] = self.fanout;
        bytes[3] = self.depth;
        bytes[4..8].copy_from_slice(&self.leaf_length.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.node_offset.to_le_bytes());
        bytes[16] = self.node_depth;
        bytes[17] = self.inner_length;
        // bytes[18..32] reserved, always zero
        bytes[32..48].copy_from_slice(&self.salt);
        bytes[48..64].copy_from_slice(&self.personal);
        bytes
    }

    /// The record as eight little-endian words, ready to XOR into the IV.
    #[must_use]
    pub fn to_words(&self) -> [u64; 8] {
        let bytes = self.to_bytes();
        let mut words = [0u64; 8];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut le = [0u8; 8];
            le.copy_from_slice(chunk);
            *word = u64::from_le_bytes(le);
        }
        words
    }
}

/// BLAKE2b parameter builder.
///
/// Setters never fail; lengths are checked once in [`Params::build`].
///
/// # Example
///
/// ```
/// use kestrel_blake2b::Params;
///
/// let config = Params::new()
///     .digest_length(32)
///     .personal(b"kestrel-example")
///     .build()
///     .unwrap();
/// let digest = config.hash(b"hello");
/// assert_eq!(digest.len(), 32);
/// ```
#[derive(Clone)]
pub struct Params {
    digest_length: usize,
    key: Zeroizing<Vec<u8>>,
    salt: Vec<u8>,
    personal: Vec<u8>,
    fanout: u8,
    depth: u8,
    leaf_length: u32,
    node_offset: u64,
    node_depth: u8,
    inner_length: u8,
    last_node: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            digest_length: MAX_DIGEST_SIZE,
            key: Zeroizing::new(Vec::new()),
            salt: Vec::new(),
            personal: Vec::new(),
            fanout: 1,
            depth: 1,
            leaf_length: 0,
            node_offset: 0,
            node_depth: 0,
            inner_length: 0,
            last_node: false,
        }
    }
}

impl Params {
    /// Create a builder for unkeyed BLAKE2b-512 with sequential-mode defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the digest length in bytes (1..=64).
    #[must_use]
    pub fn digest_length(mut self, len: usize) -> Self {
        self.digest_length = len;
        self
    }

    /// Set the MAC key (0..=64 bytes). An empty key means unkeyed hashing.
    #[must_use]
    pub fn key(mut self, key: &[u8]) -> Self {
        self.key.zeroize();
        self.key.extend_from_slice(key);
        self
    }

    /// Set the salt (0..=16 bytes, zero-padded on the right).
    #[must_use]
    pub fn salt(mut self, salt: &[u8]) -> Self {
        self.salt = salt.to_vec();
        self
    }

    /// Set the personalization string (0..=16 bytes, zero-padded on the right).
    #[must_use]
    pub fn personal(mut self, personal: &[u8]) -> Self {
        self.personal = personal.to_vec();
        self
    }

    /// Set the tree fanout (0 = unlimited).
    #[must_use]
    pub fn fanout(mut self, fanout: u8) -> Self {
        self.fanout = fanout;
        self
    }

    /// Set the tree depth.
    #[must_use]
    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// Set the leaf length.
    #[must_use]
    pub fn leaf_length(mut self, len: u32) -> Self {
        self.leaf_length = len;
        self
    }

    /// Set the node offset.
    #[must_use]
    pub fn node_offset(mut self, offset: u64) -> Self {
        self.node_offset = offset;
        self
    }

    /// Set the node depth.
    #[must_use]
    pub fn node_depth(mut self, depth: u8) -> Self {
        self.node_depth = depth;
        self
    }

    /// Set the inner hash length.
    #[must_use]
    pub fn inner_length(mut self, len: u8) -> Self {
        self.inner_length = len;
        self
    }

    /// Mark the state as the last node of its tree level.
    #[must_use]
    pub fn last_node(mut self, last: bool) -> Self {
        self.last_node = last;
        self
    }

    /// Validate lengths and produce a [`HashConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the digest length is outside `1..=64`, the
    /// key exceeds 64 bytes, or salt/personalization exceed 16 bytes.
    pub fn build(&self) -> Result<HashConfig, ConfigError> {
        if self.digest_length == 0 || self.digest_length > MAX_DIGEST_SIZE {
            tracing::debug!(len = self.digest_length, "rejected BLAKE2b digest length");
            return Err(ConfigError::InvalidDigestLength(self.digest_length));
        }
        if self.key.len() > KEY_SIZE {
            tracing::debug!(len = self.key.len(), "rejected BLAKE2b key length");
            return Err(ConfigError::KeyTooLong(self.key.len()));
        }
        if self.salt.len() > SALT_SIZE {
            tracing::debug!(len = self.salt.len(), "rejected BLAKE2b salt length");
            return Err(ConfigError::SaltTooLong(self.salt.len()));
        }
        if self.personal.len() > PERSONAL_SIZE {
            tracing::debug!(
                len = self.personal.len(),
                "rejected BLAKE2b personalization length"
            );
            return Err(ConfigError::PersonalTooLong(self.personal.len()));
        }

        let mut salt = [0u8; SALT_SIZE];
        salt[..self.salt.len()].copy_from_slice(&self.salt);
        let mut personal = [0u8; PERSONAL_SIZE];
        personal[..self.personal.len()].copy_from_slice(&self.personal);
        let mut key = [0u8; KEY_SIZE];
        key[..self.key.len()].copy_from_slice(&self.key);

        // Lengths were bounded above, the narrowing casts are lossless.
        let block = ParameterBlock {
            digest_length: self.digest_length as u8,
            key_length: self.key.len() as u8,
            fanout: self.fanout,
            depth: self.depth,
            leaf_length: self.leaf_length,
            node_offset: self.node_offset,
            node_depth: self.node_depth,
            inner_length: self.inner_length,
            salt,
            personal,
        };

        Ok(HashConfig {
            block,
            key,
            last_node: self.last_node,
        })
    }
}

/// Validated hash configuration: parameter block plus key material.
///
/// The key is wiped when the configuration is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HashConfig {
    #[zeroize(skip)]
    block: ParameterBlock,
    key: [u8; KEY_SIZE],
    #[zeroize(skip)]
    last_node: bool,
}

impl HashConfig {
    /// The parameter block this configuration seeds states with.
    #[must_use]
    pub fn parameter_block(&self) -> &ParameterBlock {
        &self.block
    }

    /// Digest length in bytes.
    #[must_use]
    pub fn digest_length(&self) -> usize {
        self.block.digest_length()
    }

    /// Whether states created from this configuration finalize as a last node.
    #[must_use]
    pub fn is_last_node(&self) -> bool {
        self.last_node
    }

    /// Key bytes (empty when unkeyed).
    pub(crate) fn key(&self) -> &[u8] {
        &self.key[..self.block.key_length()]
    }

    /// Create a fresh streaming state.
    #[must_use]
    pub fn to_state(&self) -> Blake2bState {
        Blake2bState::new(self)
    }

    /// Hash `data` in one call.
    #[must_use]
    pub fn hash(&self, data: &[u8]) -> crate::Digest {
        crate::hash::hash_with(self, data)
    }
}

impl Default for HashConfig {
    /// Unkeyed BLAKE2b-512.
    fn default() -> Self {
        Self {
            block: ParameterBlock {
                digest_length: MAX_DIGEST_SIZE as u8,
                key_length: 0,
                fanout: 1,
                depth: 1,
                leaf_length: 0,
                node_offset: 0,
                node_depth: 0,
                inner_length: 0,
                salt: [0; SALT_SIZE],
                personal: [0; PERSONAL_SIZE],
            },
            key: [0; KEY_SIZE],
            last_node: false,
        }
    }
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("block", &self.block)
            .field("key", &"<redacted>")
            .field("last_node", &self.last_node)
            .finish()
    }
}

/// Validate a digest length, key, salt and personalization in one call.
///
/// # Errors
///
/// Returns [`ConfigError`] under the same conditions as [`Params::build`].
pub fn configure(
    digest_length: usize,
    key: &[u8],
    salt: &[u8],
    personal: &[u8],
) -> Result<HashConfig, ConfigError> {
    Params::new()
        .digest_length(digest_length)
        .key(key)
        .salt(salt)
        .personal(personal)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block_layout() {
        let config = Params::new().build().unwrap();
        let bytes = config.parameter_block().to_bytes();

        assert_eq!(bytes[0], 64);
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2], 1);
        assert_eq!(bytes[3], 1);
        assert!(bytes[4..].iter().all(|&b| b == 0));

        // Word 0 is the familiar 0x01010040 mask
        assert_eq!(config.parameter_block().to_words()[0], 0x0101_0040);
    }

    #[test]
    fn test_default_config_matches_builder() {
        let built = Params::new().build().unwrap();
        assert_eq!(
            built.parameter_block(),
            HashConfig::default().parameter_block()
        );
    }

    #[test]
    fn test_field_offsets() {
        let config = Params::new()
            .digest_length(32)
            .key(&[0xAA; 16])
            .fanout(2)
            .depth(3)
            .leaf_length(0x0403_0201)
            .node_offset(0x0c0b_0a09_0807_0605)
            .node_depth(7)
            .inner_length(32)
            .salt(&[0x11; 16])
            .personal(&[0x22; 16])
            .build()
            .unwrap();
        let bytes = config.parameter_block().to_bytes();

        assert_eq!(&bytes[..4], &[32, 16, 2, 3]);
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
        assert_eq!(&bytes[8..16], &[5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(bytes[16], 7);
        assert_eq!(bytes[17], 32);
        assert_eq!(&bytes[18..32], &[0u8; 14]);
        assert_eq!(&bytes[32..48], &[0x11; 16]);
        assert_eq!(&bytes[48..64], &[0x22; 16]);
    }

    #[test]
    fn test_short_salt_and_personal_padded() {
        let config = Params::new().salt(b"abc").personal(b"xy").build().unwrap();
        let block = config.parameter_block();

        assert_eq!(&block.salt()[..3], b"abc");
        assert!(block.salt()[3..].iter().all(|&b| b == 0));
        assert_eq!(&block.personal()[..2], b"xy");
        assert!(block.personal()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_digest_length() {
        assert_eq!(
            Params::new().digest_length(0).build().unwrap_err(),
            ConfigError::InvalidDigestLength(0)
        );
        assert_eq!(
            Params::new().digest_length(65).build().unwrap_err(),
            ConfigError::InvalidDigestLength(65)
        );
        assert!(Params::new().digest_length(1).build().is_ok());
        assert!(Params::new().digest_length(64).build().is_ok());
    }

    #[test]
    fn test_oversized_inputs_rejected() {
        assert_eq!(
            configure(64, &[0u8; 65], b"", b"").unwrap_err(),
            ConfigError::KeyTooLong(65)
        );
        assert_eq!(
            configure(64, b"", &[0u8; 17], b"").unwrap_err(),
            ConfigError::SaltTooLong(17)
        );
        assert_eq!(
            configure(64, b"", b"", &[0u8; 17]).unwrap_err(),
            ConfigError::PersonalTooLong(17)
        );
        assert!(configure(64, &[0u8; 64], &[0u8; 16], &[0u8; 16]).is_ok());
    }

    #[test]
    fn test_key_replaced_not_appended() {
        let config = Params::new().key(b"first key").key(b"k2").build().unwrap();
        assert_eq!(config.key(), b"k2");
        assert_eq!(config.parameter_block().key_length(), 2);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Params::new().key(b"super secret").build().unwrap();
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("key: ["));
    }
}
