use varfx_core::models::{GenomicInterval, Pos};

use crate::traits::{Overlapper, overlaps};

/// Brute-force `O(n)` scan. Used to check the real indexes against.
#[derive(Debug, Clone)]
pub struct LinearScan<T> {
    intervals: Vec<T>,
}

impl<T> Overlapper<T> for LinearScan<T>
where
    T: GenomicInterval + Clone + Send + Sync,
{
    fn build(intervals: Vec<T>) -> Self
    where
        Self: Sized,
    {
        LinearScan { intervals }
    }

    fn find_iter<'a>(&'a self, start: Pos, end: Pos) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        Box::new(
            self.intervals
                .iter()
                .filter(move |iv| overlaps(*iv, start, end)),
        )
    }

    fn len(&self) -> usize {
        self.intervals.len()
    }
}
