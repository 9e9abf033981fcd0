//! Fuzz target for parameter validation
//!
//! Tests that arbitrary lengths are either accepted or rejected with a
//! ConfigError, never a panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use kestrel_blake2b::{ConfigError, configure};

#[derive(Debug, Arbitrary)]
struct ParamInput {
    digest_length: usize,
    key: Vec<u8>,
    salt: Vec<u8>,
    personal: Vec<u8>,
}

fuzz_target!(|input: ParamInput| {
    match configure(input.digest_length, &input.key, &input.salt, &input.personal) {
        Ok(config) => {
            assert!((1..=64).contains(&input.digest_length));
            assert_eq!(config.digest_length(), input.digest_length);
            assert_eq!(config.hash(b"").len(), input.digest_length);
        }
        Err(ConfigError::InvalidDigestLength(len)) => {
            assert_eq!(len, input.digest_length);
            assert!(len == 0 || len > 64);
        }
        Err(ConfigError::KeyTooLong(len)) => assert!(len > 64),
        Err(ConfigError::SaltTooLong(len)) => assert!(len > 16),
        Err(ConfigError::PersonalTooLong(len)) => assert!(len > 16),
    }
});
