use varfx_core::models::{GenomicInterval, Pos};

///
/// A static, single-chromosome overlap index.
///
/// Implementations only look at the `[start, end]` coordinates of their items;
/// chromosome dispatch is the job of [`crate::IntervalForest`]. Every
/// implementation must report exactly the items for which
/// [`overlaps`] holds, in no particular order.
///
pub trait Overlapper<T>: Send + Sync
where
    T: GenomicInterval + Clone + Send + Sync,
{
    fn build(intervals: Vec<T>) -> Self
    where
        Self: Sized;

    fn find_iter<'a>(&'a self, start: Pos, end: Pos) -> Box<dyn Iterator<Item = &'a T> + 'a>;

    fn find(&self, start: Pos, end: Pos) -> Vec<T> {
        self.find_iter(start, end).cloned().collect()
    }

    /// Items containing `pos`.
    fn stab(&self, pos: Pos) -> Vec<T> {
        self.find(pos, pos)
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Closed-interval overlap on coordinates alone.
#[inline]
pub fn overlaps<T: GenomicInterval + ?Sized>(interval: &T, start: Pos, end: Pos) -> bool {
    interval.end() >= start && interval.start() <= end
}
