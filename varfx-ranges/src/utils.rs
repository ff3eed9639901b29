use fxhash::FxHashMap;

use varfx_core::models::{GenomicInterval, Marker, Markers};

use crate::errors::RangesError;

/// Result of [`collapse_zero_gap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroGapCollapse {
    /// Collapsed markers, in natural order.
    pub collapsed: Vec<Marker>,
    /// `mapping[i]` is the index in `collapsed` that input marker `i` ended up in.
    pub mapping: Vec<usize>,
}

impl ZeroGapCollapse {
    /// The marker that input marker `i` was collapsed into.
    pub fn replacement(&self, i: usize) -> Option<&Marker> {
        self.collapsed.get(*self.mapping.get(i)?)
    }
}

///
/// Collapse markers separated by a gap of zero bases: `[1,100]` and `[101,200]`
/// become `[1,200]`. Overlapping markers on the same chromosome collapse too.
///
/// A collapsed marker keeps the identity of its leftmost member. Sequences are
/// joined when every member carries one; children are not carried over to a
/// marker that absorbed a neighbour. On the minus strand the reading frame of
/// the rightmost framed member wins.
///
pub fn collapse_zero_gap(markers: &Markers) -> Result<ZeroGapCollapse, RangesError> {
    let mut order: Vec<usize> = (0..markers.len()).collect();
    order.sort_by(|&a, &b| markers.markers[a].cmp_with_id(&markers.markers[b]));

    let mut collapsed: Vec<Marker> = Vec::new();
    let mut mapping = vec![0; markers.len()];
    let mut absorbed = 0;

    for i in order {
        let m = &markers.markers[i];

        match collapsed.last_mut() {
            Some(current) if current.same_chr(m) && m.start - current.end - 1 <= 0 => {
                absorbed += 1;
                if let Some(union) = current.union_with_sequence(m) {
                    *current = union;
                }

                if current.strand.is_minus() && current.frame.is_some() && m.frame.is_some() {
                    log::debug!(
                        "Frame of {} taken from collapsed marker {}: {:?}",
                        current.id,
                        m.id,
                        m.frame
                    );
                    current.frame = m.frame;
                }
            }
            _ => collapsed.push(m.clone()),
        }

        mapping[i] = collapsed.len() - 1;
    }

    if markers.len() - absorbed != collapsed.len() {
        return Err(RangesError::InconsistentCollapse {
            markers: markers.len(),
            absorbed,
            collapsed: collapsed.len(),
        });
    }

    Ok(ZeroGapCollapse { collapsed, mapping })
}

///
/// Markers fully included in another marker of the same slice, as a map from
/// the included marker's index to the index of one marker including it.
///
/// Markers with `start > end` are ignored. Of two identical markers only the
/// first one is reported, so one of them always survives. Quadratic in the
/// number of markers.
///
pub fn find_redundant(markers: &[Marker]) -> FxHashMap<usize, usize> {
    let valid: Vec<usize> = (0..markers.len())
        .filter(|&i| markers[i].start <= markers[i].end)
        .collect();

    let mut redundant = FxHashMap::default();
    for &i in &valid {
        let mi = &markers[i];
        let large = valid.iter().copied().find(|&j| {
            let mj = &markers[j];
            i != j && mj.includes(mi) && !(mi.includes(mj) && i > j)
        });
        if let Some(j) = large {
            redundant.insert(i, j);
        }
    }

    redundant
}
