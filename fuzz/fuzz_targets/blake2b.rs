//! Fuzz target for BLAKE2b streaming
//!
//! Checks that arbitrary update splits agree with the one-shot digest and
//! with the blake2b_simd reference implementation.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use kestrel_blake2b::{Params, hash_with};

#[derive(Debug, Arbitrary)]
struct StreamInput {
    data: Vec<u8>,
    splits: Vec<u16>,
    key: Vec<u8>,
    digest_length: u8,
}

fuzz_target!(|input: StreamInput| {
    let digest_length = usize::from(input.digest_length % 64) + 1;
    let key = &input.key[..input.key.len().min(64)];

    let config = match Params::new().digest_length(digest_length).key(key).build() {
        Ok(config) => config,
        Err(_) => return,
    };

    let oneshot = hash_with(&config, &input.data);

    // Streaming with arbitrary split points - must match one-shot
    let mut state = config.to_state();
    let mut rest = &input.data[..];
    for split in &input.splits {
        let at = usize::from(*split).min(rest.len());
        let (head, tail) = rest.split_at(at);
        state.update(head).unwrap();
        rest = tail;
    }
    state.update(rest).unwrap();
    assert_eq!(state.finalize().unwrap(), oneshot);

    // Finalized state rejects further use
    assert!(state.update(b"x").is_err());
    assert!(state.finalize().is_err());

    let reference = blake2b_simd::Params::new()
        .hash_length(digest_length)
        .key(key)
        .hash(&input.data);
    assert_eq!(oneshot.as_bytes(), reference.as_bytes());
});
