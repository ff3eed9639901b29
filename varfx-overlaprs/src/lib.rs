//! Overlap indexes for genomic markers.
//!
//! This crate answers "which stored intervals intersect `[start, end]`?" for
//! the varfx workspace. All coordinates are closed and zero-based, the same as
//! [`varfx_core::models::GenomicInterval`].
//!
//! - [`IntervalTree`]: a centered interval tree, the default index.
//! - [`Bits`]: a sorted array searched with a binary search, simpler and
//!   competitive when overlaps are sparse.
//! - [`forest::IntervalForest`]: one index per chromosome, built once and then
//!   queried from any number of threads.
//!
//! Both indexes implement [`Overlapper`] and must agree with each other and
//! with the brute-force `LinearScan` (enabled by the `oracle` feature) on every
//! query.
//!
//! ## Quick Start
//!
//! ```rust
//! use varfx_core::models::Span;
//! use varfx_overlaprs::{IntervalTree, Overlapper};
//!
//! let intervals = vec![
//!     Span::new("chr1", 100, 200),
//!     Span::new("chr1", 150, 300),
//!     Span::new("chr1", 400, 500),
//! ];
//!
//! let tree = IntervalTree::build(intervals);
//!
//! let overlaps = tree.find(180, 250);
//! assert_eq!(overlaps.len(), 2);
//!
//! for interval in tree.find_iter(180, 250) {
//!     println!("Found overlap: {}", interval);
//! }
//! ```

/// Binary Interval Search implementation.
///
/// See [`Bits`] for details.
pub mod bits;

pub mod errors;

/// Per-chromosome indexing.
pub mod forest;

/// Centered interval tree.
///
/// See [`IntervalTree`] for details.
pub mod interval_tree;

#[cfg(any(test, feature = "oracle"))]
pub mod oracle;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::bits::Bits;
pub use self::errors::ForestError;
pub use self::forest::{
    GenomeForest, IntervalForest, IntervalForestBuilder, IntoIntervalForest, MarkerHandle,
};
pub use self::interval_tree::IntervalTree;
#[cfg(any(test, feature = "oracle"))]
pub use self::oracle::LinearScan;
pub use self::traits::Overlapper;

/// The type of overlap data structure to use.
///
/// # Variants
///
/// * `IntervalTree` - Centered interval tree. Predictable `O(log n + k)` queries,
///   also on dense annotations with long features.
/// * `Bits` - Binary Interval Search. Best for sparse, short intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapperType {
    #[default]
    IntervalTree,
    Bits,
    /// Brute-force scan, for validating the other two.
    #[cfg(any(test, feature = "oracle"))]
    LinearScan,
}
