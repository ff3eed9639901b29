use std::fmt::{self, Display};

use bio::alphabets::dna;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placeholder base used when a sequence has to be padded.
pub const UNKNOWN_BASE: u8 = b'N';

///
/// A DNA sequence payload, stored as upper-case ASCII bases.
///
/// Sequences attached to markers are always kept on the positive strand.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DnaSeq(Vec<u8>);

impl DnaSeq {
    pub fn new<S: AsRef<[u8]>>(bases: S) -> Self {
        DnaSeq(bases.as_ref().to_ascii_uppercase())
    }

    /// A run of `len` unknown bases.
    pub fn unknown(len: usize) -> Self {
        DnaSeq(vec![UNKNOWN_BASE; len])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Reverse complement (IUPAC aware).
    pub fn revcomp(&self) -> DnaSeq {
        DnaSeq(dna::revcomp(&self.0))
    }

    /// Sub-sequence `[index, index + len)`, clipped to the available bases.
    pub fn slice(&self, index: usize, len: usize) -> DnaSeq {
        let start = index.min(self.0.len());
        let end = start.saturating_add(len).min(self.0.len());
        DnaSeq(self.0[start..end].to_vec())
    }

    /// Insert `bases` before `index` (clamped to the sequence end).
    pub fn insert(&mut self, index: usize, bases: &[u8]) {
        let at = index.min(self.0.len());
        let upper = bases.to_ascii_uppercase();
        self.0.splice(at..at, upper);
    }

    /// Remove up to `len` bases starting at `index`.
    pub fn remove(&mut self, index: usize, len: usize) {
        let start = index.min(self.0.len());
        let end = start.saturating_add(len).min(self.0.len());
        self.0.drain(start..end);
    }

    /// Overwrite bases starting at `index`; bases falling past the end are dropped.
    pub fn replace(&mut self, index: usize, bases: &[u8]) {
        for (offset, base) in bases.iter().enumerate() {
            match self.0.get_mut(index + offset) {
                Some(slot) => *slot = base.to_ascii_uppercase(),
                None => break,
            }
        }
    }

    /// Force the sequence to exactly `len` bases, padding with `N` or truncating.
    pub fn resize(&mut self, len: usize) {
        self.0.resize(len, UNKNOWN_BASE);
    }
}

impl From<&str> for DnaSeq {
    fn from(value: &str) -> Self {
        DnaSeq::new(value)
    }
}

impl From<String> for DnaSeq {
    fn from(value: String) -> Self {
        DnaSeq::new(value)
    }
}

impl Display for DnaSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
