//! Variant application: the coordinate transform that produces a marker's
//! post-edit state.
//!
//! [`Marker::apply`] never mutates its input. It returns a new marker, an
//! explicit [`Applied::Deleted`] when the edit consumes the marker, or
//! [`Applied::Unchanged`] when the edit cannot affect it. Sequence payloads
//! (positive strand) are edited alongside the coordinates so that they keep
//! matching the marker length.

use crate::errors::VariantError;
use crate::models::{GenomicInterval, Marker, Variant, VariantKind};

/// Outcome of applying a [`Variant`] to a [`Marker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The post-edit marker.
    Edited(Marker),
    /// The variant lies past the marker or edits nothing.
    Unchanged,
    /// The variant removes the whole marker.
    Deleted,
}

impl Applied {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Applied::Deleted)
    }

    #[inline]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Applied::Unchanged)
    }

    /// The marker after the edit: the edited copy, a copy of `original` when
    /// unchanged, or `None` when deleted.
    pub fn into_marker(self, original: &Marker) -> Option<Marker> {
        match self {
            Applied::Edited(m) => Some(m),
            Applied::Unchanged => Some(original.clone()),
            Applied::Deleted => None,
        }
    }
}

impl Marker {
    /// Apply `variant` to this marker and, recursively, to its children.
    ///
    /// Children deleted by the edit are dropped. A duplication that fully
    /// contains a child yields an extra, unmodified copy of that child with a
    /// `.dup` id suffix, and the child itself is shifted past the duplicated
    /// segment. The parent's own bounds follow the same rules as a
    /// leaf and are not recomputed from the children.
    ///
    /// INV and BND variants are not coordinate-transformed and are rejected
    /// with [`VariantError::UnsupportedKind`].
    ///
    /// # Examples
    ///
    /// ```
    /// use varfx_core::apply::Applied;
    /// use varfx_core::models::{Marker, MarkerKind, Strand, Variant};
    ///
    /// let exon = Marker::new("chr1", 100, 200, Strand::Plus, "ex1", MarkerKind::Exon);
    /// let del = Variant::new("chr1", 150, "ACGTACGTAC", "", "del").unwrap();
    ///
    /// let Applied::Edited(edited) = exon.apply(&del).unwrap() else { panic!() };
    /// assert_eq!((edited.start, edited.end), (100, 190));
    /// ```
    pub fn apply(&self, variant: &Variant) -> Result<Applied, VariantError> {
        match variant.kind() {
            VariantKind::Inv | VariantKind::Bnd => {
                return Err(VariantError::UnsupportedKind(variant.kind()));
            }
            VariantKind::Interval => return Ok(Applied::Unchanged),
            _ => {}
        }

        if !self.same_chr(variant) || variant.start() > self.end {
            return Ok(Applied::Unchanged);
        }

        if variant.is_mixed() {
            return self.apply_mixed(variant);
        }

        let edited = match variant.kind() {
            VariantKind::Snp | VariantKind::Mnp => Some(substitute(self, variant)),
            VariantKind::Ins => Some(insert(self, variant)),
            VariantKind::Del => delete(self, variant),
            VariantKind::Dup => Some(duplicate(self, variant)),
            other => return Err(VariantError::UnsupportedKind(other)),
        };
        let Some(mut edited) = edited else {
            return Ok(Applied::Deleted);
        };

        if self.is_composite() {
            let mut children = Vec::with_capacity(self.num_children());
            for child in self.children() {
                if variant.is_dup() && variant.includes(child) {
                    let mut copy = child.clone();
                    copy.id = format!("{}.dup", child.id);
                    children.push(copy);

                    // the original child moves past the duplicated segment,
                    // even when its range equals the duplication
                    let mut shifted = child.clone();
                    shifted.shift_coordinates(variant.length_change());
                    children.push(shifted);
                    continue;
                }
                match child.apply(variant)? {
                    Applied::Edited(c) => children.push(c),
                    Applied::Unchanged => children.push(child.clone()),
                    Applied::Deleted => {}
                }
            }
            edited.set_children(children);
        }

        Ok(Applied::Edited(edited))
    }

    /// MIXED = substitution followed by an insertion or deletion, applied in
    /// sequence. Deletion at either step deletes the marker.
    fn apply_mixed(&self, variant: &Variant) -> Result<Applied, VariantError> {
        let mut current: Option<Marker> = None;
        for part in variant.decompose()? {
            let base = current.as_ref().unwrap_or(self);
            match base.apply(&part)? {
                Applied::Edited(m) => current = Some(m),
                Applied::Unchanged => {}
                Applied::Deleted => return Ok(Applied::Deleted),
            }
        }
        Ok(current.map_or(Applied::Unchanged, Applied::Edited))
    }
}

/// SNP/MNP: coordinates are kept, overlapping alternate bases are spliced in.
fn substitute(marker: &Marker, variant: &Variant) -> Marker {
    let mut m = marker.shallow_clone();
    if !variant.intersects(marker) {
        return m;
    }

    if let Some(seq) = m.sequence_mut() {
        // variant may start before the marker
        let offset = variant.start() - marker.start;
        let (idx, idx_alt) = if offset < 0 {
            (0, (-offset) as usize)
        } else {
            (offset as usize, 0)
        };
        let size = variant.intersect_size(marker) as usize;
        if let Some(bases) = variant.alternate().as_bytes().get(idx_alt..idx_alt + size) {
            seq.replace(idx, bases);
        }
    }
    m
}

fn insert(marker: &Marker, variant: &Variant) -> Marker {
    let mut m = marker.shallow_clone();
    let change = variant.length_change();
    let pos = variant.start();

    if pos < marker.start {
        m.start += change;
        m.end += change;
    } else if pos <= marker.end {
        m.end += change;
        if let Some(seq) = m.sequence_mut() {
            let bases = variant.net_change(marker);
            seq.insert((pos - marker.start) as usize, bases.as_bytes());
        }
    }
    m
}

fn delete(marker: &Marker, variant: &Variant) -> Option<Marker> {
    let mut m = marker.shallow_clone();

    if variant.end() < marker.start {
        let change = variant.length_change();
        m.start += change;
        m.end += change;
    } else if variant.includes(marker) {
        return None;
    } else if marker.includes(variant) {
        m.end += variant.length_change();
        remove_overlap(&mut m, marker, variant);
    } else {
        // partial overlap: shrink by the overlap first, then shift by the
        // part of the deletion that precedes the marker
        m.end -= variant.intersect_size(marker);

        if variant.start() < marker.start {
            if marker.strand.is_minus() {
                log::debug!(
                    "Deletion {} straddles the start of minus-strand marker '{}', applying shrink then shift",
                    variant,
                    marker.id
                );
            }
            let delta = marker.start - variant.start();
            m.start -= delta;
            m.end -= delta;
        }
        remove_overlap(&mut m, marker, variant);
    }

    Some(m)
}

fn duplicate(marker: &Marker, variant: &Variant) -> Marker {
    let mut m = marker.shallow_clone();
    let change = variant.length_change();

    if variant.end() < marker.start {
        m.start += change;
        m.end += change;
    } else if marker.includes(variant) {
        // checked before `variant.includes(marker)`: a duplication of the
        // marker's own extent grows it
        m.end += change;
        insert_duplicated(&mut m, marker, variant);
    } else if variant.includes(marker) {
        m.start += change;
        m.end += change;
    } else if variant.intersects(marker) {
        m.end += variant.intersect_size(marker);
        insert_duplicated(&mut m, marker, variant);
    }
    m
}

/// Drop the bases of `original` covered by `variant` from `edited`'s payload.
fn remove_overlap(edited: &mut Marker, original: &Marker, variant: &Variant) {
    let Some(overlap) = original.intersect_span(variant) else {
        return;
    };
    if let Some(seq) = edited.sequence_mut() {
        seq.remove(
            (overlap.start - original.start) as usize,
            overlap.len() as usize,
        );
    }
}

/// Insert the duplicated bases of `original` ahead of the duplicated segment.
fn insert_duplicated(edited: &mut Marker, original: &Marker, variant: &Variant) {
    let Some(overlap) = original.intersect_span(variant) else {
        return;
    };
    let Some(bases) = original.sequence_of(&overlap) else {
        return;
    };
    if let Some(seq) = edited.sequence_mut() {
        let idx = (variant.start() - original.start).max(0) as usize;
        seq.insert(idx, bases.as_bytes());
    }
}
