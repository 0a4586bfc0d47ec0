//! Streaming verification of received payloads against the sequence.

use thiserror::Error;

use crate::workload::generator::Sequence;

/// A payload that did not match `generate(expected_len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "payload diverges from sequence at byte {offset} \
     (expected {expected_len} bytes, received {received_len})"
)]
pub struct Mismatch {
    /// First offset that differs, or the shorter of the two lengths.
    pub offset: usize,
    pub expected_len: usize,
    pub received_len: usize,
}

/// Compares a payload delivered in arbitrary chunks against the sequence.
///
/// Keeps no copy of the payload; memory use is constant.
#[derive(Debug, Clone)]
pub struct SequenceVerifier {
    sequence: Sequence,
    expected_len: usize,
    received: usize,
    mismatch: Option<usize>,
}

impl SequenceVerifier {
    pub fn new(expected_len: usize) -> Self {
        Self {
            sequence: Sequence::new(),
            expected_len,
            received: 0,
            mismatch: None,
        }
    }

    /// Feed the next chunk of the payload.
    pub fn update(&mut self, chunk: &[u8]) {
        if self.mismatch.is_some() {
            self.received += chunk.len();
            return;
        }
        for (i, &byte) in chunk.iter().enumerate() {
            let offset = self.received + i;
            if offset >= self.expected_len || byte != self.sequence.next_byte() {
                self.mismatch = Some(offset);
                break;
            }
        }
        self.received += chunk.len();
    }

    /// Bytes fed so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Offset of the first bad byte seen so far, if any.
    pub fn first_mismatch(&self) -> Option<usize> {
        self.mismatch
    }

    /// Check the total length and return the verified byte count.
    pub fn finish(self) -> Result<usize, Mismatch> {
        let offset = match self.mismatch {
            Some(offset) => offset,
            None if self.received != self.expected_len => self.received.min(self.expected_len),
            None => return Ok(self.received),
        };
        Err(Mismatch {
            offset,
            expected_len: self.expected_len,
            received_len: self.received,
        })
    }
}

/// Verify a fully buffered payload.
pub fn verify(expected_len: usize, payload: &[u8]) -> Result<(), Mismatch> {
    let mut verifier = SequenceVerifier::new(expected_len);
    verifier.update(payload);
    verifier.finish().map(|_| ())
}
