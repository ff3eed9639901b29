use std::cmp::{Ordering, max, min};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::chromosome::compare_names;
use super::genome::MarkerId;
use super::interval::{GenomicInterval, Pos, Strand};
use super::sequence::DnaSeq;
use crate::errors::GenomeError;

/// Annotation kind of a [`Marker`]. Only used for effect reporting, never for geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarkerKind {
    Genome,
    Chromosome,
    Gene,
    Transcript,
    Exon,
    Intron,
    Cds,
    Utr5,
    Utr3,
    Upstream,
    Downstream,
    SpliceSiteAcceptor,
    SpliceSiteDonor,
    SpliceSiteRegion,
    Intergenic,
    Sequence,
    Motif,
    Custom,
    #[default]
    None,
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Genome => "GENOME",
            MarkerKind::Chromosome => "CHROMOSOME",
            MarkerKind::Gene => "GENE",
            MarkerKind::Transcript => "TRANSCRIPT",
            MarkerKind::Exon => "EXON",
            MarkerKind::Intron => "INTRON",
            MarkerKind::Cds => "CDS",
            MarkerKind::Utr5 => "UTR_5_PRIME",
            MarkerKind::Utr3 => "UTR_3_PRIME",
            MarkerKind::Upstream => "UPSTREAM",
            MarkerKind::Downstream => "DOWNSTREAM",
            MarkerKind::SpliceSiteAcceptor => "SPLICE_SITE_ACCEPTOR",
            MarkerKind::SpliceSiteDonor => "SPLICE_SITE_DONOR",
            MarkerKind::SpliceSiteRegion => "SPLICE_SITE_REGION",
            MarkerKind::Intergenic => "INTERGENIC",
            MarkerKind::Sequence => "SEQUENCE",
            MarkerKind::Motif => "MOTIF",
            MarkerKind::Custom => "CUSTOM",
            MarkerKind::None => "NONE",
        }
    }
}

impl Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// A typed, named genomic interval taking part in the annotation hierarchy.
///
/// Composite markers (genes, transcripts) own their children by value and keep
/// them in natural order (chromosome, start, end, id). `parent` is a plain
/// handle into the [`crate::models::Genome`] the marker was built in; it is never
/// followed to reach owned data.
///
/// A sequence payload, when present, is stored on the positive strand and always
/// has exactly `len()` bases.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Marker {
    pub chr: String,
    pub start: Pos,
    pub end: Pos,
    pub strand: Strand,
    pub id: String,
    pub kind: MarkerKind,
    pub parent: Option<MarkerId>,
    /// Reading frame (0, 1 or 2) for coding features.
    pub frame: Option<u8>,
    children: Vec<Marker>,
    sequence: Option<DnaSeq>,
}

impl Marker {
    pub fn new(chr: &str, start: Pos, end: Pos, strand: Strand, id: &str, kind: MarkerKind) -> Self {
        Marker {
            chr: chr.to_string(),
            start,
            end,
            strand,
            id: id.to_string(),
            kind,
            parent: None,
            frame: None,
            children: Vec::new(),
            sequence: None,
        }
    }

    pub fn with_sequence(mut self, sequence: DnaSeq) -> Self {
        self.set_sequence(sequence);
        self
    }

    pub fn with_frame(mut self, frame: u8) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Copy of every field except the children.
    pub(crate) fn shallow_clone(&self) -> Marker {
        Marker {
            chr: self.chr.clone(),
            start: self.start,
            end: self.end,
            strand: self.strand,
            id: self.id.clone(),
            kind: self.kind,
            parent: self.parent,
            frame: self.frame,
            children: Vec::new(),
            sequence: self.sequence.clone(),
        }
    }

    // ── ordering ────────────────────────────────────────────────────────

    /// Chromosome, then start, then end.
    pub fn cmp_position(&self, other: &Marker) -> Ordering {
        compare_names(&self.chr, &other.chr)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }

    /// Natural order: [`Marker::cmp_position`] with the id as final tie-break.
    pub fn cmp_with_id(&self, other: &Marker) -> Ordering {
        self.cmp_position(other).then_with(|| self.id.cmp(&other.id))
    }

    /// Chromosome, then end, then start, then id.
    pub fn cmp_by_end(&self, other: &Marker) -> Ordering {
        compare_names(&self.chr, &other.chr)
            .then(self.end.cmp(&other.end))
            .then(self.start.cmp(&other.start))
            .then_with(|| self.id.cmp(&other.id))
    }

    // ── children ────────────────────────────────────────────────────────

    /// Children in natural order.
    #[inline]
    pub fn children(&self) -> &[Marker] {
        &self.children
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, id: &str) -> Option<&Marker> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Add a child, keeping children sorted. Child ids are unique per parent.
    pub fn add_child(&mut self, child: Marker) -> Result<(), GenomeError> {
        if self.child(&child.id).is_some() {
            return Err(GenomeError::DuplicateChildId {
                parent: self.id.clone(),
                child: child.id,
            });
        }
        let idx = self
            .children
            .partition_point(|c| c.cmp_with_id(&child) == Ordering::Less);
        self.children.insert(idx, child);
        Ok(())
    }

    pub fn remove_child(&mut self, id: &str) -> Option<Marker> {
        let idx = self.children.iter().position(|c| c.id == id)?;
        Some(self.children.remove(idx))
    }

    /// Replace all children at once. They are re-sorted into natural order.
    pub(crate) fn set_children(&mut self, mut children: Vec<Marker>) {
        children.sort_by(|a, b| a.cmp_with_id(b));
        self.children = children;
    }

    pub(crate) fn take_children(&mut self) -> Vec<Marker> {
        std::mem::take(&mut self.children)
    }

    /// Children in transcription order: by start on the plus strand, by end
    /// (descending) on the minus strand.
    pub fn sorted_children_by_strand(&self) -> Vec<&Marker> {
        let mut sorted: Vec<&Marker> = self.children.iter().collect();
        if self.strand.is_minus() {
            sorted.sort_by(|a, b| b.cmp_by_end(a));
        }
        sorted
    }

    /// All descendants intersecting `interval`, depth first.
    pub fn query<O: GenomicInterval + ?Sized>(&self, interval: &O) -> Vec<&Marker> {
        let mut hits = Vec::new();
        let mut stack: Vec<&Marker> = self.children.iter().rev().collect();
        while let Some(m) = stack.pop() {
            if m.intersects(interval) {
                hits.push(m);
            }
            stack.extend(m.children.iter().rev());
        }
        hits
    }

    /// Shift this marker and every descendant by `delta` bases.
    pub fn shift_coordinates(&mut self, delta: Pos) {
        self.start += delta;
        self.end += delta;
        for child in self.children.iter_mut() {
            child.shift_coordinates(delta);
        }
    }

    /// Set the strand on this marker and every descendant.
    pub fn set_strand(&mut self, strand: Strand) {
        self.strand = strand;
        for child in self.children.iter_mut() {
            child.set_strand(strand);
        }
    }

    // ── sequence ────────────────────────────────────────────────────────

    /// Positive-strand sequence payload.
    #[inline]
    pub fn sequence(&self) -> Option<&DnaSeq> {
        self.sequence.as_ref()
    }

    #[inline]
    pub fn has_sequence(&self) -> bool {
        self.sequence.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Attach a positive-strand sequence. A sequence that does not match the
    /// marker length is padded with `N` or truncated.
    pub fn set_sequence(&mut self, mut sequence: DnaSeq) {
        let expected = self.len().max(0) as usize;
        if sequence.len() != expected {
            log::warn!(
                "Sequence length {} does not match marker '{}' length {}, {}",
                sequence.len(),
                self.id,
                expected,
                if sequence.len() < expected {
                    "padding with N"
                } else {
                    "truncating"
                }
            );
            sequence.resize(expected);
        }
        self.sequence = Some(sequence);
    }

    pub fn clear_sequence(&mut self) {
        self.sequence = None;
    }

    /// Mutable access for the variant application engine, which keeps the
    /// payload length in step with the coordinates itself.
    pub(crate) fn sequence_mut(&mut self) -> Option<&mut DnaSeq> {
        self.sequence.as_mut()
    }

    /// Sequence in coding orientation (reverse complemented on the minus strand).
    pub fn sequence_coding(&self) -> Option<DnaSeq> {
        let seq = self.sequence.as_ref()?;
        Some(if self.strand.is_minus() {
            seq.revcomp()
        } else {
            seq.clone()
        })
    }

    /// `len` bases starting at `index`, both counted in coding orientation.
    pub fn bases_at(&self, index: usize, len: usize) -> Option<DnaSeq> {
        let seq = self.sequence.as_ref()?;
        if self.strand.is_minus() {
            let idx = seq.len().checked_sub(index + len)?;
            Some(seq.slice(idx, len).revcomp())
        } else {
            Some(seq.slice(index, len))
        }
    }

    /// Positive-strand bases starting at genomic position `pos`.
    pub fn bases_at_pos(&self, pos: Pos, len: usize) -> Option<DnaSeq> {
        let seq = self.sequence.as_ref()?;
        if !self.intersects_pos(pos) {
            return None;
        }
        Some(seq.slice((pos - self.start) as usize, len))
    }

    /// Positive-strand bases covered by `interval`, which must lie inside this marker.
    pub fn sequence_of<O: GenomicInterval + ?Sized>(&self, interval: &O) -> Option<DnaSeq> {
        let seq = self.sequence.as_ref()?;
        if !self.includes(interval) {
            return None;
        }
        Some(seq.slice(
            (interval.start() - self.start) as usize,
            interval.len().max(0) as usize,
        ))
    }

    /// Marker spanning both `self` and `other` (same chromosome only). When both
    /// carry sequences and they overlap or touch, the sequences are joined;
    /// otherwise the result has no sequence.
    pub fn union_with_sequence(&self, other: &Marker) -> Option<Marker> {
        if !self.same_chr(other) {
            return None;
        }

        let mut union = self.shallow_clone();
        union.start = min(self.start, other.start);
        union.end = max(self.end, other.end);
        union.sequence = None;

        let (Some(a), Some(b)) = (&self.sequence, &other.sequence) else {
            return Some(union);
        };

        let joined = if self.includes(other) {
            Some(a.clone())
        } else if other.includes(self) {
            Some(b.clone())
        } else if self.intersects(other) || self.end + 1 == other.start || other.end + 1 == self.start {
            let ((first, first_seq), (second, second_seq)) = if self.start < other.start {
                ((self, a), (other, b))
            } else {
                ((other, b), (self, a))
            };
            let overlap = first.end - second.start + 1;
            let mut seq = first_seq.clone();
            let tail = second_seq.slice(overlap.max(0) as usize, second_seq.len());
            seq.insert(seq.len(), tail.as_bytes());
            Some(seq)
        } else {
            None
        };

        if let Some(seq) = joined {
            union.set_sequence(seq);
        }
        Some(union)
    }

    /// Parts of this marker not covered by `other`: nothing, one shortened
    /// marker, or a left and a right remainder. Remainders keep the id, kind,
    /// strand and parent, but no children, frame or sequence.
    pub fn minus<O: GenomicInterval + ?Sized>(&self, other: &O) -> Vec<Marker> {
        if !self.intersects(other) {
            return vec![self.clone()];
        }

        let (start, end) = (other.start(), other.end());
        if start <= self.start && self.end <= end {
            // fully covered
            Vec::new()
        } else if start <= self.start && end < self.end {
            // covers the left part
            vec![self.fragment(end + 1, self.end)]
        } else if self.start < start && self.end <= end {
            // covers the right part
            vec![self.fragment(self.start, start - 1)]
        } else {
            vec![self.fragment(self.start, start - 1), self.fragment(end + 1, self.end)]
        }
    }

    fn fragment(&self, start: Pos, end: Pos) -> Marker {
        let mut part = Marker::new(&self.chr, start, end, self.strand, &self.id, self.kind);
        part.parent = self.parent;
        part
    }
}

impl GenomicInterval for Marker {
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

impl Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{} {}", self.chr, self.start, self.end, self.kind)?;
        if !self.id.is_empty() {
            write!(f, " '{}'", self.id)?;
        }
        Ok(())
    }
}
