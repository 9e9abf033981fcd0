//! Streaming BLAKE2b state.
//!
//! The state buffers input so that the final block is always known when
//! [`Blake2bState::finalize`] runs: a block that ends exactly on a 128-byte
//! boundary is held back until more input arrives, because only the last
//! compression carries the finalization flag.
//!
//! A state is consumed by its first successful finalize. Afterwards every
//! `update` and `finalize` call fails with [`StateError::Finalized`], and the
//! chaining value, counters and buffer have already been wiped.

use crate::compress::{IV, compress};
use crate::digest::Digest;
use crate::error::StateError;
use crate::params::HashConfig;
use crate::{BLOCK_SIZE, MAX_DIGEST_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Active,
    Finalized,
}

/// Incremental BLAKE2b hasher.
///
/// Not `Clone`: a keyed state carries key-derived chaining values that should
/// not be duplicated implicitly. Zeroized on drop.
///
/// ```compile_fail
/// use kestrel_blake2b::{Blake2bState, Params};
///
/// let state = Params::new().key(b"secret").build().unwrap().to_state();
/// let copy: Blake2bState = state.clone();
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Blake2bState {
    h: [u64; 8],
    t: [u64; 2],
    f: [u64; 2],
    buf: [[u8; BLOCK_SIZE]; 2],
    buf_len: usize,
    digest_length: usize,
    last_node: bool,
    #[zeroize(skip)]
    phase: Phase,
}

impl Blake2bState {
    /// Initialize a state from a validated configuration.
    ///
    /// A non-empty key is absorbed as a full zero-padded first block.
    #[must_use]
    pub fn new(config: &HashConfig) -> Self {
        let mut h = IV;
        for (word, param) in h.iter_mut().zip(config.parameter_block().to_words()) {
            *word ^= param;
        }

        let mut state = Self {
            h,
            t: [0; 2],
            f: [0; 2],
            buf: [[0; BLOCK_SIZE]; 2],
            buf_len: 0,
            digest_length: config.digest_length(),
            last_node: config.is_last_node(),
            phase: Phase::Active,
        };

        let key = config.key();
        if !key.is_empty() {
            let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);
            block[..key.len()].copy_from_slice(key);
            state.absorb(&block[..]);
        }

        state
    }

    /// Absorb more input.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Finalized`] if the state was already finalized.
    pub fn update(&mut self, data: &[u8]) -> Result<(), StateError> {
        self.ensure_active()?;
        self.absorb(data);
        Ok(())
    }

    /// Mark (or unmark) this state as the last node of its tree level.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Finalized`] if the state was already finalized.
    pub fn set_last_node(&mut self, last: bool) -> Result<(), StateError> {
        self.ensure_active()?;
        self.last_node = last;
        Ok(())
    }

    /// Finish hashing and return the digest.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Finalized`] if the state was already finalized.
    pub fn finalize(&mut self) -> Result<Digest, StateError> {
        self.ensure_active()?;
        Ok(self.finish())
    }

    /// Finish hashing into a caller-supplied buffer.
    ///
    /// Writes exactly [`digest_length`](Self::digest_length) bytes to the
    /// front of `out` and returns that count. A short buffer leaves the state
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Finalized`] if the state was already finalized,
    /// or [`StateError::OutputTooShort`] if `out` cannot hold the digest.
    pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<usize, StateError> {
        self.ensure_active()?;
        if out.len() < self.digest_length {
            return Err(StateError::OutputTooShort {
                needed: self.digest_length,
                actual: out.len(),
            });
        }

        let mut full = Zeroizing::new([0u8; MAX_DIGEST_SIZE]);
        let len = self.finish_into(&mut full);
        out[..len].copy_from_slice(&full[..len]);
        Ok(len)
    }

    /// Configured digest length in bytes.
    #[must_use]
    pub fn digest_length(&self) -> usize {
        self.digest_length
    }

    /// Total bytes absorbed so far, including a padded key block.
    ///
    /// Wraps modulo 2^128, like the counter words themselves.
    #[must_use]
    pub fn count(&self) -> u128 {
        let compressed = (u128::from(self.t[1]) << 64) | u128::from(self.t[0]);
        compressed.wrapping_add(self.buf_len as u128)
    }

    /// Whether the state has been consumed by finalize.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// Infallible finalize for states known to be active.
    pub(crate) fn finish(&mut self) -> Digest {
        let mut full = [0u8; MAX_DIGEST_SIZE];
        let len = self.finish_into(&mut full);
        Digest::from_parts(full, len)
    }

    fn ensure_active(&self) -> Result<(), StateError> {
        if self.phase == Phase::Finalized {
            tracing::debug!("BLAKE2b state used after finalize");
            return Err(StateError::Finalized);
        }
        Ok(())
    }

    fn increment_counter(&mut self, inc: u64) {
        self.t[0] = self.t[0].wrapping_add(inc);
        if self.t[0] < inc {
            self.t[1] = self.t[1].wrapping_add(1);
        }
    }

    /// Append `data`, compressing every block that is provably not the last.
    pub(crate) fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            // Empty buffer and more than a block of input: compress in place.
            if self.buf_len == 0 && data.len() > BLOCK_SIZE {
                if let Some((block, rest)) = data.split_first_chunk::<BLOCK_SIZE>() {
                    self.increment_counter(BLOCK_SIZE as u64);
                    compress(&mut self.h, block, self.t, [0, 0]);
                    data = rest;
                    continue;
                }
            }

            let take = (2 * BLOCK_SIZE - self.buf_len).min(data.len());
            self.buf.as_flattened_mut()[self.buf_len..self.buf_len + take]
                .copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];

            if self.buf_len > BLOCK_SIZE {
                self.increment_counter(BLOCK_SIZE as u64);
                compress(&mut self.h, &self.buf[0], self.t, [0, 0]);
                self.buf[0] = self.buf[1];
                self.buf_len -= BLOCK_SIZE;
            }
        }
    }

    /// Final compression; wipes the state and marks it consumed.
    fn finish_into(&mut self, out: &mut [u8; MAX_DIGEST_SIZE]) -> usize {
        debug_assert!(self.buf_len <= BLOCK_SIZE);

        self.increment_counter(self.buf_len as u64);
        self.f[0] = u64::MAX;
        if self.last_node {
            self.f[1] = u64::MAX;
        }
        self.buf[0][self.buf_len..].fill(0);
        compress(&mut self.h, &self.buf[0], self.t, self.f);

        for (chunk, word) in out.chunks_exact_mut(8).zip(self.h.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        let len = self.digest_length;
        tracing::trace!(digest_length = len, "finalized BLAKE2b state");

        self.zeroize();
        self.phase = Phase::Finalized;
        out[len..].fill(0);
        len
    }
}

impl std::fmt::Debug for Blake2bState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blake2bState")
            .field("digest_length", &self.digest_length)
            .field("count", &self.count())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
