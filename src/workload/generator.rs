//! Deterministic pseudo-random byte sequences.
//!
//! The sequence is produced by a Lehmer (Park–Miller) recurrence with a fixed
//! seed, so any party that knows the requested length can recompute the exact
//! bytes. The fan-out pages in `http::pages` embed the same recurrence.
//!
//! The product `seed * MULTIPLIER` needs more than 32 bits; all arithmetic is
//! done in `u64`.

use std::convert::Infallible;

use axum::body::Bytes;
use futures_util::stream::{self, Stream};

/// Lehmer multiplier.
pub const MULTIPLIER: u64 = 48_271;

/// Lehmer modulus (2^31 - 1).
pub const MODULUS: u64 = 2_147_483_647;

const INITIAL_SEED: u64 = 1;

/// An unbounded iterator over the generator output.
///
/// Use `Sequence::new().take(n)` for the first `n` bytes; the result equals
/// [`generate(n)`](generate).
#[derive(Debug, Clone)]
pub struct Sequence {
    seed: u64,
}

impl Sequence {
    /// Start a sequence at the fixed initial seed.
    pub fn new() -> Self {
        Self { seed: INITIAL_SEED }
    }

    /// Advance the recurrence and return the low byte of the new seed.
    #[inline]
    pub fn next_byte(&mut self) -> u8 {
        self.seed = self.seed * MULTIPLIER % MODULUS;
        self.seed as u8
    }

    /// Fill `buf` with the next `buf.len()` bytes.
    pub fn fill(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.next_byte();
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Sequence {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        Some(self.next_byte())
    }
}

/// Generate the first `length` bytes of the sequence.
pub fn generate(length: usize) -> Vec<u8> {
    let mut out = vec![0u8; length];
    Sequence::new().fill(&mut out);
    out
}

/// Stream `generate(length)` as chunks of at most `chunk_size` bytes.
///
/// Only one chunk is held in memory at a time.
pub fn chunk_stream(
    length: usize,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let chunk_size = chunk_size.max(1);
    stream::unfold(
        (Sequence::new(), length),
        move |(mut sequence, remaining)| async move {
            if remaining == 0 {
                return None;
            }
            let n = remaining.min(chunk_size);
            let mut chunk = vec![0u8; n];
            sequence.fill(&mut chunk);
            Some((Ok(Bytes::from(chunk)), (sequence, remaining - n)))
        },
    )
}
