use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::interval::{GenomicInterval, Pos};
use crate::errors::VariantError;

/// Category of a proposed edit to the reference sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VariantKind {
    Snp,
    Mnp,
    Ins,
    Del,
    Dup,
    Inv,
    Bnd,
    Mixed,
    /// Reference equals alternate: an advisory interval, not an edit.
    Interval,
}

impl VariantKind {
    /// Derive the kind from a reference/alternate allele pair.
    pub fn from_alleles(reference: &str, alternate: &str) -> VariantKind {
        if reference == alternate {
            VariantKind::Interval
        } else if reference.len() == 1 && alternate.len() == 1 {
            VariantKind::Snp
        } else if reference.len() == alternate.len() {
            VariantKind::Mnp
        } else if reference.len() < alternate.len() && alternate.starts_with(reference) {
            VariantKind::Ins
        } else if reference.len() > alternate.len() && reference.starts_with(alternate) {
            VariantKind::Del
        } else {
            VariantKind::Mixed
        }
    }
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VariantKind::Snp => "SNP",
            VariantKind::Mnp => "MNP",
            VariantKind::Ins => "INS",
            VariantKind::Del => "DEL",
            VariantKind::Dup => "DUP",
            VariantKind::Inv => "INV",
            VariantKind::Bnd => "BND",
            VariantKind::Mixed => "MIXED",
            VariantKind::Interval => "INTERVAL",
        };
        write!(f, "{s}")
    }
}

///
/// A proposed edit to the reference sequence.
///
/// `start` is the leftmost affected base and `end` the rightmost affected
/// reference base. Insertions and deletions are stored without the shared
/// anchor base(s) of VCF-style alleles: an insertion has an empty reference and
/// `start == end` at the first base following the inserted sequence, a deletion
/// has an empty alternate and spans exactly the removed bases.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variant {
    chr: String,
    start: Pos,
    end: Pos,
    reference: String,
    alternate: String,
    kind: VariantKind,
    id: String,
}

impl Variant {
    /// Build a variant from an allele pair at `pos`, deriving its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use varfx_core::models::{GenomicInterval, Variant, VariantKind};
    ///
    /// // VCF-style insertion anchored on the preceding base
    /// let ins = Variant::new("chr1", 99, "A", "ACGT", "rs1").unwrap();
    /// assert_eq!(ins.kind(), VariantKind::Ins);
    /// assert_eq!(ins.start(), 100);
    /// assert_eq!(ins.alternate(), "CGT");
    /// assert_eq!(ins.length_change(), 3);
    /// ```
    pub fn new(
        chr: &str,
        pos: Pos,
        reference: &str,
        alternate: &str,
        id: &str,
    ) -> Result<Variant, VariantError> {
        if alternate.contains([',', '/']) {
            return Err(VariantError::MultipleAlternates(alternate.to_string()));
        }
        if let Some(bad) = [reference, alternate].into_iter().find(|a| !is_nucleotides(a)) {
            return Err(VariantError::InvalidAllele(bad.to_string()));
        }

        let mut reference = reference.to_ascii_uppercase();
        let mut alternate = alternate.to_ascii_uppercase();
        let kind = VariantKind::from_alleles(&reference, &alternate);

        let mut start = pos;
        if matches!(kind, VariantKind::Ins | VariantKind::Del) {
            let anchor = reference.len().min(alternate.len());
            reference.drain(..anchor);
            alternate.drain(..anchor);
            start += anchor as Pos;
        }

        let end = match kind {
            VariantKind::Ins | VariantKind::Snp => start,
            _ => start + (reference.len().max(1) as Pos) - 1,
        };

        Ok(Variant {
            chr: chr.to_string(),
            start,
            end,
            reference,
            alternate,
            kind,
            id: id.to_string(),
        })
    }

    /// An advisory interval `[start, end]` that edits nothing.
    pub fn interval(chr: &str, start: Pos, end: Pos, id: &str) -> Variant {
        Variant {
            chr: chr.to_string(),
            start,
            end,
            reference: String::new(),
            alternate: String::new(),
            kind: VariantKind::Interval,
            id: id.to_string(),
        }
    }

    /// A structural variant (DEL, DUP, INV, BND or INTERVAL) covering
    /// `[start, end]` without allele sequences.
    pub fn structural(
        chr: &str,
        start: Pos,
        end: Pos,
        kind: VariantKind,
        id: &str,
    ) -> Result<Variant, VariantError> {
        if start > end {
            return Err(VariantError::InvalidCoordinates {
                chr: chr.to_string(),
                start,
                end,
            });
        }
        match kind {
            VariantKind::Del
            | VariantKind::Dup
            | VariantKind::Inv
            | VariantKind::Bnd
            | VariantKind::Interval => Ok(Variant {
                chr: chr.to_string(),
                start,
                end,
                reference: String::new(),
                alternate: String::new(),
                kind,
                id: id.to_string(),
            }),
            other => Err(VariantError::UnsupportedKind(other)),
        }
    }

    #[inline]
    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    #[inline]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[inline]
    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Bases gained (positive) or lost (negative) by applying this variant.
    pub fn length_change(&self) -> Pos {
        match self.kind {
            VariantKind::Snp | VariantKind::Mnp => 0,
            _ if !self.reference.is_empty() || !self.alternate.is_empty() => {
                self.alternate.len() as Pos - self.reference.len() as Pos
            }
            VariantKind::Dup => self.len(),
            VariantKind::Del => -self.len(),
            _ => 0,
        }
    }

    /// Split a MIXED variant into an equal-length substitution followed by the
    /// insertion or deletion of the remaining bases.
    pub fn decompose(&self) -> Result<[Variant; 2], VariantError> {
        if self.kind != VariantKind::Mixed {
            return Err(VariantError::NotDecomposable(self.kind));
        }

        let shared = self.reference.len().min(self.alternate.len());
        let substitution = Variant::new(
            &self.chr,
            self.start,
            &self.reference[..shared],
            &self.alternate[..shared],
            &format!("{}_MNP", self.id),
        )?;

        let remainder = if self.reference.len() < self.alternate.len() {
            Variant::new(
                &self.chr,
                self.start + shared as Pos,
                "",
                &self.alternate[shared..],
                &format!("{}_INS", self.id),
            )?
        } else {
            Variant::new(
                &self.chr,
                self.start + shared as Pos,
                &self.reference[shared..],
                "",
                &format!("{}_DEL", self.id),
            )?
        };

        Ok([substitution, remainder])
    }

    /// Inserted (or, for deletions, removed) bases restricted to `interval`,
    /// on the positive strand.
    pub fn net_change<O: GenomicInterval + ?Sized>(&self, interval: &O) -> String {
        let change = if self.is_del() {
            &self.reference
        } else {
            &self.alternate
        };

        let remove_before = (interval.start() - self.start).max(0) as usize;
        let remove_after = (self.end - interval.end()).max(0) as usize;
        if remove_before + remove_after >= change.len() {
            return String::new();
        }
        change[remove_before..change.len() - remove_after].to_string()
    }

    /// The variant that undoes this one.
    ///
    /// A duplication is undone by deleting the copy that follows it.
    pub fn reverse(&self) -> Result<Variant, VariantError> {
        let mut reversed = self.clone();
        match self.kind {
            VariantKind::Ins => {
                reversed.kind = VariantKind::Del;
                reversed.reference = self.alternate.clone();
                reversed.alternate = String::new();
                reversed.end = self.start + self.alternate.len() as Pos - 1;
            }
            VariantKind::Del if !self.reference.is_empty() => {
                reversed.kind = VariantKind::Ins;
                reversed.reference = String::new();
                reversed.alternate = self.reference.clone();
                reversed.end = self.start;
            }
            VariantKind::Dup => {
                reversed.kind = VariantKind::Del;
                reversed.start = self.end + 1;
                reversed.end = self.end + self.len();
            }
            VariantKind::Snp | VariantKind::Mnp | VariantKind::Mixed => {
                reversed.reference = self.alternate.clone();
                reversed.alternate = self.reference.clone();
                reversed.kind = VariantKind::from_alleles(&reversed.reference, &reversed.alternate);
                reversed.end = self.start + (reversed.reference.len().max(1) as Pos) - 1;
            }
            VariantKind::Inv | VariantKind::Interval => {}
            VariantKind::Del | VariantKind::Bnd => {
                return Err(VariantError::UnsupportedKind(self.kind));
            }
        }
        Ok(reversed)
    }

    #[inline]
    pub fn is_snp(&self) -> bool {
        self.kind == VariantKind::Snp
    }

    #[inline]
    pub fn is_mnp(&self) -> bool {
        self.kind == VariantKind::Mnp
    }

    #[inline]
    pub fn is_ins(&self) -> bool {
        self.kind == VariantKind::Ins
    }

    #[inline]
    pub fn is_del(&self) -> bool {
        self.kind == VariantKind::Del
    }

    #[inline]
    pub fn is_dup(&self) -> bool {
        self.kind == VariantKind::Dup
    }

    #[inline]
    pub fn is_mixed(&self) -> bool {
        self.kind == VariantKind::Mixed
    }

    #[inline]
    pub fn is_inv(&self) -> bool {
        self.kind == VariantKind::Inv
    }

    #[inline]
    pub fn is_bnd(&self) -> bool {
        self.kind == VariantKind::Bnd
    }

    #[inline]
    pub fn is_interval(&self) -> bool {
        self.kind == VariantKind::Interval
    }

    pub fn is_indel(&self) -> bool {
        self.is_ins() || self.is_del()
    }

    /// Structural variants carry no allele sequences.
    pub fn is_structural(&self) -> bool {
        match self.kind {
            VariantKind::Dup | VariantKind::Inv | VariantKind::Bnd => true,
            VariantKind::Del => self.reference.is_empty(),
            _ => false,
        }
    }

    /// Anything that actually edits the reference.
    pub fn is_variant(&self) -> bool {
        !self.is_interval()
    }
}

/// IUPAC nucleotide codes, either case. Keeps byte offsets into alleles on
/// character boundaries.
fn is_nucleotides(allele: &str) -> bool {
    allele
        .bytes()
        .all(|b| b"ACGTUNRYSWKMBDHV".contains(&b.to_ascii_uppercase()))
}

impl GenomicInterval for Variant {
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

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_structural() {
            write!(f, "{}:{}-{}[{}]", self.chr, self.start, self.end, self.kind)
        } else {
            write!(
                f,
                "{}:{}_{}/{}",
                self.chr,
                self.start,
                if self.reference.is_empty() { "-" } else { &self.reference },
                if self.alternate.is_empty() { "-" } else { &self.alternate }
            )
        }
    }
}
