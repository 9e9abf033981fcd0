//! Shared helpers for KESTREL integration tests.

use kestrel_blake2b::{Blake2bState, Digest, HashConfig};

/// Feed `data` to a fresh state, split at the given offsets.
///
/// Offsets are clamped to the input and may repeat, which produces
/// zero-length updates.
pub fn hash_in_pieces(config: &HashConfig, data: &[u8], cuts: &[usize]) -> Digest {
    let mut offsets: Vec<usize> = cuts.iter().map(|&c| c.min(data.len())).collect();
    offsets.sort_unstable();

    let mut state: Blake2bState = config.to_state();
    let mut start = 0;
    for end in offsets {
        state
            .update(&data[start..end])
            .expect("active state accepts input");
        start = end;
    }
    state
        .update(&data[start..])
        .expect("active state accepts input");
    state.finalize().expect("first finalize succeeds")
}

/// Reference digest from the `blake2b_simd` crate.
pub fn reference_digest(
    data: &[u8],
    key: &[u8],
    digest_length: usize,
    salt: &[u8],
    personal: &[u8],
) -> Vec<u8> {
    blake2b_simd::Params::new()
        .hash_length(digest_length)
        .key(key)
        .salt(salt)
        .personal(personal)
        .hash(data)
        .as_bytes()
        .to_vec()
}

/// Deterministic test payload of `len` bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
}
