pub mod chromosome;
pub mod genome;
pub mod interval;
pub mod marker;
pub mod markers;
pub mod sequence;
pub mod variant;

// re-export for cleaner imports
pub use self::genome::{BuildWarning, Genome, GenomeBuilder, GenomeBuilderConfig, MarkerId};
pub use self::interval::{GenomicInterval, Pos, Span, Strand};
pub use self::marker::{Marker, MarkerKind};
pub use self::markers::Markers;
pub use self::sequence::DnaSeq;
pub use self::variant::{Variant, VariantKind};
