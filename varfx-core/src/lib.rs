//! Core models for genomic variant annotation.
//!
//! This crate holds the annotation data model shared by the rest of the
//! varfx workspace:
//!
//! - **Interval geometry**: closed, zero-based `[start, end]` ranges through the
//!   [`models::GenomicInterval`] trait, chromosome-aware by construction.
//! - **Markers**: typed annotations (genes, transcripts, exons, ...) that own
//!   their children, plus [`models::Markers`] collections.
//! - **Genome arena**: [`models::GenomeBuilder`] loads markers once and freezes
//!   them into an immutable, shareable [`models::Genome`].
//! - **Variants and variant application**: [`models::Variant`] classifies an
//!   edit, and [`models::Marker::apply`] computes what a marker looks like after it.
//!
//! ## Quick Start
//!
//! ```rust
//! use varfx_core::apply::Applied;
//! use varfx_core::models::{Marker, MarkerKind, Strand, Variant, VariantKind};
//!
//! let mut transcript = Marker::new("chr1", 100, 500, Strand::Plus, "tr1", MarkerKind::Transcript);
//! transcript
//!     .add_child(Marker::new("chr1", 100, 150, Strand::Plus, "ex1", MarkerKind::Exon))
//!     .unwrap();
//! transcript
//!     .add_child(Marker::new("chr1", 400, 500, Strand::Plus, "ex2", MarkerKind::Exon))
//!     .unwrap();
//!
//! // a 5 base insertion between the two exons
//! let ins = Variant::new("chr1", 200, "", "ACGTA", "ins").unwrap();
//! assert_eq!(ins.kind(), VariantKind::Ins);
//!
//! match transcript.apply(&ins).unwrap() {
//!     Applied::Edited(tr) => {
//!         assert_eq!(tr.end, 505);
//!         assert_eq!(tr.children()[1].start, 405);
//!     }
//!     _ => unreachable!(),
//! }
//! ```
pub mod apply;
pub mod errors;
pub mod models;

pub use self::apply::Applied;
