//! Test helpers for codec tests.

use crate::*;
use jsonwebtoken::Algorithm;

pub const TEST_KEY: [u8; 32] = [42u8; 32];
pub const TEST_ISSUER: &str = "tenant-vault.test";

/// Fixed starting instant, on a whole second
pub const START_MILLIS: u64 = 1_700_000_000_000;

/// Helper to create a codec driven by a manual clock
pub fn create_test_codec() -> (TokenCodec<ManualClock>, ManualClock) {
    create_test_codec_with(Algorithm::HS256)
}

pub fn create_test_codec_with(algorithm: Algorithm) -> (TokenCodec<ManualClock>, ManualClock) {
    let clock = ManualClock::new(START_MILLIS);
    let codec = TokenCodec::new(&TEST_KEY, algorithm, TEST_ISSUER.to_string(), clock.clone())
        .unwrap();
    (codec, clock)
}
