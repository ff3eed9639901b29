//! Set algebra for genomic marker collections.
//!
//! This crate provides the collection-level operations used while loading and
//! checking a genome:
//!
//! - [`MarkerRanges`]: merge, union, intersect and minus over [`Markers`]
//! - [`collapse_zero_gap`]: join touching markers and keep track of where each
//!   original marker went, e.g. to re-parent records after exons collapse
//! - [`find_redundant`]: markers fully included in another one
//!
//! # Example
//!
//! ```
//! use varfx_core::models::{Marker, MarkerKind, Markers, Strand};
//! use varfx_ranges::MarkerRanges;
//!
//! let exon = |start, end| Marker::new("chr1", start, end, Strand::Plus, "e", MarkerKind::Exon);
//!
//! let a = Markers::from(vec![exon(10, 90)]);
//! let b = Markers::from(vec![exon(40, 60)]);
//!
//! let rest = a.minus(&b);
//! assert_eq!(rest.len(), 2);
//! assert_eq!((rest.markers[0].start, rest.markers[0].end), (10, 39));
//! assert_eq!((rest.markers[1].start, rest.markers[1].end), (61, 90));
//! ```
//!
//! [`Markers`]: varfx_core::models::Markers

pub mod errors;
pub mod marker_ranges;
pub mod utils;

// re-exports
pub use errors::RangesError;
pub use marker_ranges::MarkerRanges;
pub use utils::{ZeroGapCollapse, collapse_zero_gap, find_redundant};
