use std::cmp::{max, min};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::chromosome::simple_name;
use crate::errors::GeometryError;

/// A genomic coordinate. Zero-based and inclusive on both ends.
///
/// Signed so that a zero-length interval anchored at position 0 (`end == -1`)
/// and negative shifts produced by deletions are representable.
pub type Pos = i64;

/// Strand of a genomic feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    #[inline]
    pub fn is_minus(&self) -> bool {
        matches!(self, Strand::Minus)
    }

    #[inline]
    pub fn is_plus(&self) -> bool {
        matches!(self, Strand::Plus)
    }

    pub fn flip(&self) -> Strand {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// Anything with a chromosome and a closed `[start, end]` range.
///
/// All predicates are chromosome-aware: intervals on different chromosomes
/// never intersect or include one another.
pub trait GenomicInterval {
    fn chr(&self) -> &str;
    fn start(&self) -> Pos;
    fn end(&self) -> Pos;

    /// Number of bases covered. Zero for an insertion point (`end == start - 1`).
    #[inline]
    fn len(&self) -> Pos {
        self.end() - self.start() + 1
    }

    #[inline]
    fn is_zero_length(&self) -> bool {
        self.len() == 0
    }

    /// `start <= end + 1`
    #[inline]
    fn is_valid(&self) -> bool {
        self.start() <= self.end() + 1
    }

    /// Chromosomes are compared by [`simple_name`], so `chr1` and `1` match.
    #[inline]
    fn same_chr<O: GenomicInterval + ?Sized>(&self, other: &O) -> bool {
        simple_name(self.chr()) == simple_name(other.chr())
    }

    #[inline]
    fn intersects<O: GenomicInterval + ?Sized>(&self, other: &O) -> bool {
        self.same_chr(other) && other.end() >= self.start() && other.start() <= self.end()
    }

    #[inline]
    fn intersects_pos(&self, pos: Pos) -> bool {
        self.start() <= pos && pos <= self.end()
    }

    /// Number of bases shared by both intervals, 0 if they do not intersect.
    fn intersect_size<O: GenomicInterval + ?Sized>(&self, other: &O) -> Pos {
        if !self.same_chr(other) {
            return 0;
        }
        let start = max(self.start(), other.start());
        let end = min(self.end(), other.end());
        if end < start { 0 } else { end - start + 1 }
    }

    /// True if `other` lies completely within this interval.
    #[inline]
    fn includes<O: GenomicInterval + ?Sized>(&self, other: &O) -> bool {
        self.same_chr(other) && self.start() <= other.start() && other.end() <= self.end()
    }

    /// Gap in bases between two intervals. Adjacent intervals are at distance 1,
    /// intersecting intervals at distance 0.
    fn distance<O: GenomicInterval + ?Sized>(&self, other: &O) -> Result<Pos, GeometryError> {
        if !self.same_chr(other) {
            return Err(GeometryError::ChromosomeMismatch {
                left: self.chr().to_string(),
                right: other.chr().to_string(),
            });
        }

        if self.intersects(other) {
            Ok(0)
        } else if self.start() > other.end() {
            Ok(self.start() - other.end())
        } else {
            Ok(other.start() - self.end())
        }
    }

    fn to_span(&self) -> Span {
        Span::new(self.chr(), self.start(), self.end())
    }

    /// Smallest interval spanning both. `None` across chromosomes.
    fn union_span<O: GenomicInterval + ?Sized>(&self, other: &O) -> Option<Span> {
        if !self.same_chr(other) {
            return None;
        }
        Some(Span::new(
            self.chr(),
            min(self.start(), other.start()),
            max(self.end(), other.end()),
        ))
    }

    /// Overlapping part of both intervals. `None` when they do not intersect.
    fn intersect_span<O: GenomicInterval + ?Sized>(&self, other: &O) -> Option<Span> {
        if !self.intersects(other) {
            return None;
        }
        Some(Span::new(
            self.chr(),
            max(self.start(), other.start()),
            min(self.end(), other.end()),
        ))
    }
}

impl<T: GenomicInterval + ?Sized> GenomicInterval for &T {
    #[inline]
    fn chr(&self) -> &str {
        (**self).chr()
    }

    #[inline]
    fn start(&self) -> Pos {
        (**self).start()
    }

    #[inline]
    fn end(&self) -> Pos {
        (**self).end()
    }
}

///
/// An anonymous closed interval, the result of union/intersection arithmetic
/// and the key type for ad hoc overlap queries.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub chr: String,
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(chr: &str, start: Pos, end: Pos) -> Self {
        Span {
            chr: chr.to_string(),
            start,
            end,
        }
    }

    /// A single base at `pos`.
    pub fn point(chr: &str, pos: Pos) -> Self {
        Span::new(chr, pos, pos)
    }
}

impl GenomicInterval for Span {
    #[inline]
    fn chr(&self) -> &str {
        &self.chr
    }

    #[inline]
    fn start(&self) -> Pos {
        self.start
    }

    #[inline]
    fn end(&self) -> Pos {
        self.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}
