//! One-shot BLAKE2b hashing.

use crate::MAX_DIGEST_SIZE;
use crate::digest::Digest;
use crate::error::ConfigError;
use crate::params::{HashConfig, configure};

/// Block header size hashed by [`hash_block_header`].
pub const HEADER_SIZE: usize = 80;

/// Hash `data` with the given key, digest length, salt and personalization.
///
/// Empty `key`, `salt` and `personal` select plain BLAKE2b.
///
/// # Errors
///
/// Returns [`ConfigError`] if any length is out of range.
pub fn hash(
    data: &[u8],
    key: &[u8],
    digest_length: usize,
    salt: &[u8],
    personal: &[u8],
) -> Result<Digest, ConfigError> {
    let config = configure(digest_length, key, salt, personal)?;
    Ok(hash_with(&config, data))
}

/// Hash `data` under an already validated configuration.
#[must_use]
pub fn hash_with(config: &HashConfig, data: &[u8]) -> Digest {
    let mut state = config.to_state();
    state.absorb(data);
    state.finish()
}

/// Unkeyed BLAKE2b-512.
#[must_use]
pub fn blake2b_512(data: &[u8]) -> [u8; MAX_DIGEST_SIZE] {
    let digest = hash_with(&HashConfig::default(), data);
    let mut out = [0u8; MAX_DIGEST_SIZE];
    out.copy_from_slice(digest.as_bytes());
    out
}

/// BLAKE2b-512 of an 80-byte block header.
#[must_use]
pub fn hash_block_header(header: &[u8; HEADER_SIZE]) -> [u8; MAX_DIGEST_SIZE] {
    blake2b_512(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2b_512_empty() {
        assert_eq!(
            hex::encode(blake2b_512(b"")),
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
             d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce"
        );
    }

    #[test]
    fn test_hash_matches_blake2b_512() {
        let digest = hash(b"abc", b"", 64, b"", b"").unwrap();
        assert_eq!(digest.as_bytes(), &blake2b_512(b"abc")[..]);
    }

    #[test]
    fn test_deterministic() {
        let a = hash(b"kestrel", b"key", 48, b"salt", b"personal").unwrap();
        let b = hash(b"kestrel", b"key", 48, b"salt", b"personal").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_digest_length() {
        for len in 1..=MAX_DIGEST_SIZE {
            let digest = hash(b"length check", b"", len, b"", b"").unwrap();
            assert_eq!(digest.len(), len);
        }
    }

    #[test]
    fn test_digest_length_in_parameter_block() {
        // Not a prefix: the length is mixed into the IV
        let short = hash(b"abc", b"", 32, b"", b"").unwrap();
        let long = hash(b"abc", b"", 64, b"", b"").unwrap();
        assert_ne!(short.as_bytes(), &long.as_bytes()[..32]);
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            hash(b"", b"", 0, b"", b"").unwrap_err(),
            ConfigError::InvalidDigestLength(0)
        );
        assert_eq!(
            hash(b"", b"", 65, b"", b"").unwrap_err(),
            ConfigError::InvalidDigestLength(65)
        );
    }

    #[test]
    fn test_block_header() {
        let mut header = [0u8; HEADER_SIZE];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = i as u8;
        }

        assert_eq!(hash_block_header(&header), blake2b_512(&header));
        assert_ne!(hash_block_header(&header), hash_block_header(&[0u8; HEADER_SIZE]));
    }
}
