use varfx_core::models::{GenomicInterval, Pos};

use crate::traits::{Overlapper, overlaps};

/// A Binary Interval Search data structure for genomic interval overlap queries.
///
/// From the journal article: <https://academic.oup.com/bioinformatics/article/29/1/1/273289>
///
/// Intervals are kept in one array sorted by start. A query binary-searches for
/// the first interval whose start could still reach the query (`start - max_len`)
/// and scans forward until starts pass the query end. Fast when overlaps are
/// sparse; dense, long intervals make the scan longer than the tree's.
///
/// # Examples
///
/// ```
/// use varfx_core::models::Span;
/// use varfx_overlaprs::{Bits, Overlapper};
///
/// let reads = vec![
///     Span::new("chr1", 100, 150),
///     Span::new("chr1", 200, 250),
///     Span::new("chr1", 225, 275),
/// ];
///
/// let bits = Bits::build(reads);
/// assert_eq!(bits.find(210, 240).len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Bits<T> {
    intervals: Vec<T>,
    /// Largest `end - start` among the intervals
    max_len: Pos,
}

impl<T> Overlapper<T> for Bits<T>
where
    T: GenomicInterval + Clone + Send + Sync,
{
    /// Create a new instance of Bits by passing in a vector of intervals. This vector will
    /// immediately be sorted by start order.
    fn build(mut intervals: Vec<T>) -> Self
    where
        Self: Sized,
    {
        intervals.sort_by_key(|iv| (iv.start(), iv.end()));
        let max_len = intervals
            .iter()
            .map(|iv| iv.end() - iv.start())
            .max()
            .unwrap_or(0)
            .max(0);
        Bits { intervals, max_len }
    }

    fn find_iter<'a>(&'a self, start: Pos, end: Pos) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        Box::new(IterFind {
            inner: self,
            off: Self::lower_bound(start - self.max_len, &self.intervals),
            start,
            end,
        })
    }

    fn len(&self) -> usize {
        self.intervals.len()
    }
}

impl<T> Bits<T>
where
    T: GenomicInterval + Clone + Send + Sync,
{
    /// Determine the first index that we should start checking for overlaps for via a binary
    /// search.
    /// Assumes that the maximum interval length in `intervals` has been subtracted from
    /// `start`, otherwise the result is undefined
    #[inline]
    pub fn lower_bound(start: Pos, intervals: &[T]) -> usize {
        let mut size = intervals.len();
        let mut low = 0;

        while size > 0 {
            let half = size / 2;
            let other_half = size - half;
            let probe = low + half;
            let other_low = low + other_half;
            size = half;
            low = if intervals[probe].start() < start {
                other_low
            } else {
                low
            }
        }
        low
    }

    /// Intervals in start order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.intervals.iter()
    }
}

/// An iterator over intervals in a [`Bits`] structure that overlap with a query range.
#[derive(Debug)]
pub struct IterFind<'a, T> {
    inner: &'a Bits<T>,
    off: usize,
    start: Pos,
    end: Pos,
}

impl<'a, T> Iterator for IterFind<'a, T>
where
    T: GenomicInterval,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.inner.intervals.len() {
            let interval = &self.inner.intervals[self.off];
            self.off += 1;
            if overlaps(interval, self.start, self.end) {
                return Some(interval);
            } else if interval.start() > self.end {
                break;
            }
        }
        None
    }
}

impl<T> IntoIterator for Bits<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.into_iter()
    }
}
