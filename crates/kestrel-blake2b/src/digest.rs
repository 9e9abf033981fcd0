//! Variable-length BLAKE2b digest value.

use crate::MAX_DIGEST_SIZE;
use subtle::ConstantTimeEq;

/// A BLAKE2b digest of 1 to 64 bytes.
///
/// Equality is constant-time, so comparing a computed MAC against an
/// expected one does not leak the position of the first mismatch.
#[derive(Clone, Copy)]
pub struct Digest {
    bytes: [u8; MAX_DIGEST_SIZE],
    len: u8,
}

impl Digest {
    /// `bytes` beyond `len` are ignored; `len` is clamped to 64.
    pub(crate) fn from_parts(bytes: [u8; MAX_DIGEST_SIZE], len: usize) -> Self {
        let len = len.min(MAX_DIGEST_SIZE);
        let mut trimmed = [0u8; MAX_DIGEST_SIZE];
        trimmed[..len].copy_from_slice(&bytes[..len]);
        Self {
            bytes: trimmed,
            len: len as u8,
        }
    }

    /// Digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Digest length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Always `false`; a digest holds at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Constant-time comparison against raw bytes.
    ///
    /// Returns `false` when the lengths differ.
    #[must_use]
    pub fn verify(&self, expected: &[u8]) -> bool {
        if expected.len() != self.len() {
            return false;
        }
        self.as_bytes().ct_eq(expected).into()
    }
}

impl PartialEq for Digest {
    fn eq(&self, other: &Self) -> bool {
        self.verify(other.as_bytes())
    }
}

impl Eq for Digest {}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
