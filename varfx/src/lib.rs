//! # varfx
//!
//! Genome annotation models, overlap indexes and variant application for
//! variant effect prediction.
//!
//! The workspace is split into crates that are re-exported here behind cargo
//! features:
//!
//! - `core` (default): interval geometry, markers, the genome arena, variants
//!   and `Marker::apply`
//! - `overlaprs` (default): interval tree, binary interval search and the
//!   per-chromosome interval forest
//! - `ranges` (default): merge, union, intersect, minus and zero-gap collapse
//! - `serde`: `Serialize`/`Deserialize` on the core models
//!
//! ## Example
//!
//! ```
//! use varfx::core::models::{GenomeBuilder, Marker, MarkerKind, Strand, Variant};
//! use varfx::core::Applied;
//! use varfx::overlaprs::{GenomeForest, OverlapperType};
//!
//! let mut builder = GenomeBuilder::new("demo");
//! let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
//! let mut tr = Marker::new("chr1", 1000, 2000, Strand::Plus, "tr1", MarkerKind::Transcript);
//! tr.add_child(Marker::new("chr1", 1000, 1100, Strand::Plus, "ex1", MarkerKind::Exon))
//!     .unwrap();
//! builder.add_child(chr1, tr).unwrap();
//! let genome = builder.build();
//!
//! let forest = genome.forest(Some(MarkerKind::Transcript), OverlapperType::IntervalTree);
//! let del = Variant::new("chr1", 1049, "CA", "C", "del").unwrap();
//!
//! for hit in forest.query(&del) {
//!     let transcript = genome.subtree(hit.id).unwrap();
//!     let applied = transcript.apply(&del).unwrap();
//!     assert!(matches!(applied, Applied::Edited(ref m) if m.end == 1999));
//! }
//! ```

#[cfg(feature = "core")]
#[doc(inline)]
pub use varfx_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use varfx_overlaprs as overlaprs;

#[cfg(feature = "ranges")]
#[doc(inline)]
pub use varfx_ranges as ranges;
