//! Set algebra over marker collections.
//!
//! Provides merge, union, intersect and minus for [`Markers`]. All operations
//! use closed, zero-based coordinates and return new collections; the input is
//! never modified.

use std::cmp::{max, min};

use varfx_core::models::chromosome::simple_name;
use varfx_core::models::{GenomicInterval, Marker, MarkerKind, Markers, Pos, Span, Strand};
use varfx_overlaprs::{IntervalForest, IntoIntervalForest, OverlapperType};

/// Position of a marker inside the collection being indexed.
#[derive(Debug, Clone)]
struct Indexed {
    idx: usize,
    span: Span,
}

impl GenomicInterval for Indexed {
    fn chr(&self) -> &str {
        &self.span.chr
    }

    fn start(&self) -> Pos {
        self.span.start
    }

    fn end(&self) -> Pos {
        self.span.end
    }
}

/// Set algebra operations on marker collections.
pub trait MarkerRanges {
    /// Coalesce overlapping and adjacent markers per chromosome.
    ///
    /// Sorts by position, then sweeps and joins every marker whose start is at
    /// most one base past the current end. Merged markers are on the plus
    /// strand, have no kind, and their id lists the ids of every marker they
    /// absorbed, separated by spaces.
    ///
    /// # Example
    /// ```text
    /// in : chr1 10-20 'a', chr1 21-30 'b', chr1 15-25 'c', chr1 40-50 'd'
    /// out: chr1 10-30 'a c b', chr1 40-50 'd'
    /// ```
    fn merge(&self) -> Markers;

    /// For each marker not seen yet, the span of it and every marker
    /// overlapping it. A marker taking part in one group is not used to start
    /// another.
    fn union(&self) -> Markers;

    /// For each marker not seen yet, the part of it shared with every marker
    /// overlapping it. Groups whose members have no common base yield nothing.
    fn intersect(&self) -> Markers;

    /// Subtract every marker of `other`, one after the other.
    ///
    /// # Example
    /// ```text
    /// self : chr1 10-90
    /// other: chr1 40-60
    /// out  : chr1 10-39, chr1 61-90
    /// ```
    fn minus(&self, other: &Markers) -> Markers;

    /// Subtract a single marker from every marker of the collection.
    fn minus_marker(&self, other: &Marker) -> Markers;
}

impl MarkerRanges for Markers {
    fn merge(&self) -> Markers {
        let sorted = self.sorted();
        let mut merged = Markers::new();

        // (chr, start, end, ids) of the block being extended
        let mut current: Option<(String, Pos, Pos, String)> = None;
        for m in sorted.iter() {
            let extends = matches!(
                &current,
                Some((chr, _, end, _)) if simple_name(chr) == simple_name(&m.chr) && m.start <= *end + 1
            );
            if extends {
                if let Some((_, _, end, tag)) = current.as_mut() {
                    *end = max(*end, m.end);
                    tag.push(' ');
                    tag.push_str(&m.id);
                }
            } else {
                if let Some((chr, start, end, tag)) = current.take() {
                    merged.push(merged_marker(&chr, start, end, &tag));
                }
                current = Some((m.chr.clone(), m.start, m.end, m.id.clone()));
            }
        }
        if let Some((chr, start, end, tag)) = current {
            merged.push(merged_marker(&chr, start, end, &tag));
        }

        merged
    }

    fn union(&self) -> Markers {
        let forest = index(self);
        let mut done = vec![false; self.len()];
        let mut unions = Markers::new();

        for (i, mi) in self.iter().enumerate() {
            if done[i] {
                continue;
            }
            done[i] = true;

            let (mut start, mut end) = (mi.start, mi.end);
            for hit in forest.query_iter(mi) {
                let m = &self.markers[hit.idx];
                start = min(start, m.start);
                end = max(end, m.end);
                done[hit.idx] = true;
            }
            unions.push(resized(mi, start, end));
        }

        unions
    }

    fn intersect(&self) -> Markers {
        let forest = index(self);
        let mut done = vec![false; self.len()];
        let mut intersections = Markers::new();

        for (i, mi) in self.iter().enumerate() {
            if done[i] {
                continue;
            }
            done[i] = true;

            let mut common = Some((mi.start, mi.end));
            for hit in forest.query_iter(mi) {
                let m = &self.markers[hit.idx];
                common = common
                    .map(|(start, end)| (max(start, m.start), min(end, m.end)))
                    .filter(|(start, end)| start <= end);
                done[hit.idx] = true;
            }
            if let Some((start, end)) = common {
                intersections.push(resized(mi, start, end));
            }
        }

        intersections
    }

    fn minus(&self, other: &Markers) -> Markers {
        let mut result = self.clone();
        for m in other.iter() {
            result = result.minus_marker(m);
        }
        result
    }

    fn minus_marker(&self, other: &Marker) -> Markers {
        let markers = self.iter().flat_map(|m| m.minus(other)).collect();
        Markers {
            markers,
            name: self.name.clone(),
        }
    }
}

fn index(markers: &Markers) -> IntervalForest<Indexed> {
    markers
        .iter()
        .enumerate()
        .map(|(idx, m)| Indexed {
            idx,
            span: m.to_span(),
        })
        .collect::<Vec<_>>()
        .into_interval_forest(OverlapperType::default())
}

fn merged_marker(chr: &str, start: Pos, end: Pos, tag: &str) -> Marker {
    Marker::new(chr, start, end, Strand::Plus, tag, MarkerKind::default())
}

/// `m` with new coordinates, keeping its identity but none of its payload.
fn resized(m: &Marker, start: Pos, end: Pos) -> Marker {
    let mut r = Marker::new(&m.chr, start, end, m.strand, &m.id, m.kind);
    r.parent = m.parent;
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    use fxhash::FxHashSet;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::*;

    fn make_marker(chr: &str, start: Pos, end: Pos, id: &str) -> Marker {
        Marker::new(chr, start, end, Strand::Plus, id, MarkerKind::Exon)
    }

    fn make_markers(markers: Vec<(&str, Pos, Pos)>) -> Markers {
        markers
            .into_iter()
            .enumerate()
            .map(|(i, (chr, start, end))| make_marker(chr, start, end, &format!("m{i}")))
            .collect()
    }

    fn positions(markers: &Markers) -> Vec<(String, Pos, Pos)> {
        markers
            .sorted()
            .iter()
            .map(|m| (m.chr.clone(), m.start, m.end))
            .collect()
    }

    fn bases(markers: &Markers) -> FxHashSet<(String, Pos)> {
        markers
            .iter()
            .flat_map(|m| (m.start..=m.end).map(move |p| (m.chr.clone(), p)))
            .collect()
    }

    fn random_markers(seed: u64, n: usize) -> Markers {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let chr = if rng.gen_bool(0.8) { "chr1" } else { "chr2" };
                let start = rng.gen_range(0..1000);
                let len = rng.gen_range(1..50);
                make_marker(chr, start, start + len - 1, &format!("r{i}"))
            })
            .collect()
    }

    // ── merge tests ──

    #[rstest]
    fn test_merge_overlapping_and_adjacent() {
        let markers = Markers::from(vec![
            make_marker("chr1", 10, 20, "a"),
            make_marker("chr1", 21, 30, "b"),
            make_marker("chr1", 15, 25, "c"),
            make_marker("chr1", 40, 50, "d"),
            make_marker("chr2", 10, 20, "e"),
        ]);
        let merged = markers.merge();

        let got: Vec<(String, Pos, Pos, String)> = merged
            .iter()
            .map(|m| (m.chr.clone(), m.start, m.end, m.id.clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("chr1".to_string(), 10, 30, "a c b".to_string()),
                ("chr1".to_string(), 40, 50, "d".to_string()),
                ("chr2".to_string(), 10, 20, "e".to_string()),
            ]
        );
    }

    #[rstest]
    fn test_merge_keeps_gap_of_one_base() {
        let merged = make_markers(vec![("chr1", 10, 20), ("chr1", 22, 30)]).merge();
        assert_eq!(merged.len(), 2);
    }

    #[rstest]
    fn test_merge_chromosome_aliases() {
        let merged = make_markers(vec![("chr1", 10, 20), ("1", 15, 30), ("chr2", 25, 40)]).merge();
        assert_eq!(
            positions(&merged),
            vec![("chr1".to_string(), 10, 30), ("chr2".to_string(), 25, 40)]
        );
    }

    #[rstest]
    fn test_merge_empty() {
        assert_eq!(Markers::new().merge().is_empty(), true);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_merge_idempotent(#[case] seed: u64) {
        let once = random_markers(seed, 200).merge();
        let twice = once.merge();
        assert_eq!(twice, once);
        assert_eq!(bases(&once), bases(&random_markers(seed, 200)));
    }

    // ── union tests ──

    #[rstest]
    fn test_union_groups() {
        let markers = make_markers(vec![("chr1", 10, 20), ("chr1", 15, 30), ("chr1", 50, 60), ("chr2", 15, 30)]);
        let union = markers.union();
        assert_eq!(
            positions(&union),
            vec![
                ("chr1".to_string(), 10, 30),
                ("chr1".to_string(), 50, 60),
                ("chr2".to_string(), 15, 30),
            ]
        );
        // the group keeps the identity of the marker that started it
        assert_eq!(union.markers[0].id, "m0");
    }

    #[rstest]
    #[case(4)]
    #[case(5)]
    fn test_union_never_loses_coverage(#[case] seed: u64) {
        let markers = random_markers(seed, 300);
        let union = markers.union();
        assert!(union.len() <= markers.len());
        assert!(bases(&markers).is_subset(&bases(&union)));
    }

    // ── intersect tests ──

    #[rstest]
    fn test_intersect_groups() {
        let markers = make_markers(vec![("chr1", 10, 20), ("chr1", 15, 30), ("chr1", 50, 60)]);
        assert_eq!(
            positions(&markers.intersect()),
            vec![("chr1".to_string(), 15, 20), ("chr1".to_string(), 50, 60)]
        );
    }

    #[rstest]
    fn test_intersect_without_common_base() {
        // both outer markers hit the middle one but not each other
        let markers = make_markers(vec![("chr1", 20, 30), ("chr1", 10, 20), ("chr1", 30, 40)]);
        let intersect = markers.intersect();
        assert_eq!(intersect.is_empty(), true);
    }

    #[rstest]
    #[case(6)]
    #[case(7)]
    fn test_intersect_only_shrinks(#[case] seed: u64) {
        let markers = random_markers(seed, 300);
        for m in markers.intersect().iter() {
            assert!(markers.iter().any(|orig| orig.includes(m)), "{m} grew");
        }
    }

    // ── minus tests ──

    #[rstest]
    fn test_minus_middle() {
        let a = make_markers(vec![("chr1", 10, 90)]);
        let b = make_markers(vec![("chr1", 40, 60)]);
        assert_eq!(
            positions(&a.minus(&b)),
            vec![("chr1".to_string(), 10, 39), ("chr1".to_string(), 61, 90)]
        );
    }

    #[rstest]
    fn test_minus_several() {
        let a = make_markers(vec![("chr1", 10, 90), ("chr2", 10, 90)]);
        let b = make_markers(vec![("chr1", 0, 20), ("chr1", 80, 85), ("chr3", 0, 100)]);
        assert_eq!(
            positions(&a.minus(&b)),
            vec![
                ("chr1".to_string(), 21, 79),
                ("chr1".to_string(), 86, 90),
                ("chr2".to_string(), 10, 90),
            ]
        );
    }

    #[rstest]
    fn test_minus_does_not_touch_input() {
        let a = make_markers(vec![("chr1", 10, 90)]);
        let before = a.clone();
        let _ = a.minus_marker(&make_marker("chr1", 40, 60, "x"));
        assert_eq!(a, before);
    }

    #[rstest]
    #[case(8)]
    #[case(9)]
    fn test_minus_self_is_empty(#[case] seed: u64) {
        let markers = random_markers(seed, 100);
        assert_eq!(markers.minus(&markers).is_empty(), true);
    }

    #[rstest]
    #[case(10)]
    fn test_minus_removes_exactly_the_other_bases(#[case] seed: u64) {
        let a = random_markers(seed, 50).merge();
        let b = random_markers(seed + 100, 50);
        let expected: FxHashSet<(String, Pos)> = bases(&a).difference(&bases(&b)).cloned().collect();
        assert_eq!(bases(&a.minus(&b)), expected);
    }
}
