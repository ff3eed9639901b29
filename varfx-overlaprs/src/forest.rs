//! Genome-wide interval indexing for multi-chromosome overlap queries.
//!
//! [`IntervalForest`] keeps one [`Overlapper`] per chromosome and dispatches
//! each query to the tree of the query's chromosome. Chromosome names are
//! compared by their simple name, so `chr1`, `1` and `chromosome1` share a tree.
//!
//! Construction is two-phase by type: intervals are collected in an
//! [`IntervalForestBuilder`], and only the [`IntervalForest`] it builds can be
//! queried. A built forest is immutable and `Send + Sync`.
//!
//! # Examples
//!
//! ```
//! use varfx_core::models::{Marker, MarkerKind, Markers, Span, Strand};
//! use varfx_overlaprs::{OverlapperType, forest::IntoIntervalForest};
//!
//! let genes = Markers::from(vec![
//!     Marker::new("chr1", 1000, 2000, Strand::Plus, "BRCA1", MarkerKind::Gene),
//!     Marker::new("chr1", 5000, 6000, Strand::Plus, "TP53", MarkerKind::Gene),
//!     Marker::new("chr2", 1000, 3000, Strand::Minus, "EGFR", MarkerKind::Gene),
//! ]);
//!
//! let forest = genes.into_interval_forest(OverlapperType::IntervalTree);
//!
//! let hits = forest.query(&Span::new("1", 1500, 2500));
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id, "BRCA1");
//! ```

use fxhash::{FxHashMap, FxHashSet};
use rayon::prelude::*;

use varfx_core::models::chromosome::{compare_names, simple_name};
use varfx_core::models::{Genome, GenomicInterval, Marker, MarkerId, MarkerKind, Markers, Pos, Span};

use crate::errors::ForestError;
use crate::{Bits, IntervalTree, Overlapper, OverlapperType};

/// Collects intervals per chromosome until [`IntervalForestBuilder::build`].
#[derive(Debug, Clone)]
pub struct IntervalForestBuilder<T> {
    intervals: FxHashMap<String, Vec<T>>,
}

impl<T> Default for IntervalForestBuilder<T> {
    fn default() -> Self {
        IntervalForestBuilder {
            intervals: FxHashMap::default(),
        }
    }
}

impl<T> IntervalForestBuilder<T>
where
    T: GenomicInterval + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interval: T) {
        self.intervals
            .entry(simple_name(interval.chr()).to_string())
            .or_default()
            .push(interval);
    }

    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, intervals: I) {
        for interval in intervals {
            self.add(interval);
        }
    }

    /// Number of intervals added so far.
    pub fn len(&self) -> usize {
        self.intervals.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build one index per chromosome.
    pub fn build(self, overlapper_type: OverlapperType) -> IntervalForest<T> {
        let mut trees: FxHashMap<String, Box<dyn Overlapper<T>>> = FxHashMap::default();

        for (chr, chr_intervals) in self.intervals.into_iter() {
            let lapper: Box<dyn Overlapper<T>> = match overlapper_type {
                OverlapperType::IntervalTree => Box::new(IntervalTree::build(chr_intervals)),
                OverlapperType::Bits => Box::new(Bits::build(chr_intervals)),
                #[cfg(any(test, feature = "oracle"))]
                OverlapperType::LinearScan => Box::new(crate::LinearScan::build(chr_intervals)),
            };
            trees.insert(chr, lapper);
        }

        IntervalForest {
            trees,
            overlapper_type,
        }
    }
}

///
/// A read-only, genome-wide overlap index: one [`Overlapper`] per chromosome.
///
/// Queries on a chromosome without a tree return nothing; use
/// [`IntervalForest::query_strict`] to treat that as an error.
///
pub struct IntervalForest<T>
where
    T: GenomicInterval + Clone + Send + Sync + 'static,
{
    trees: FxHashMap<String, Box<dyn Overlapper<T>>>,
    overlapper_type: OverlapperType,
}

impl<T> IntervalForest<T>
where
    T: GenomicInterval + Clone + Send + Sync + 'static,
{
    pub fn overlapper_type(&self) -> OverlapperType {
        self.overlapper_type
    }

    /// The index for `chr`, if any interval was added on it.
    pub fn tree(&self, chr: &str) -> Option<&dyn Overlapper<T>> {
        self.trees.get(simple_name(chr)).map(|t| t.as_ref())
    }

    pub fn has_tree(&self, chr: &str) -> bool {
        self.trees.contains_key(simple_name(chr))
    }

    /// Simple chromosome names with a tree, numeric chromosomes first.
    pub fn chromosome_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.trees.keys().map(|k| k.as_str()).collect();
        names.sort_by(|a, b| compare_names(a, b));
        names
    }

    /// Total number of indexed intervals.
    pub fn len(&self) -> usize {
        self.trees.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over everything intersecting `query`, without cloning.
    pub fn query_iter<'a, Q>(&'a self, query: &Q) -> Box<dyn Iterator<Item = &'a T> + 'a>
    where
        Q: GenomicInterval + ?Sized,
    {
        match self.trees.get(simple_name(query.chr())) {
            Some(tree) => tree.find_iter(query.start(), query.end()),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Everything intersecting `query`. Empty for an unknown chromosome.
    pub fn query<Q>(&self, query: &Q) -> Vec<T>
    where
        Q: GenomicInterval + ?Sized,
    {
        self.query_iter(query).cloned().collect()
    }

    /// Like [`IntervalForest::query`], but an unknown chromosome is an error.
    pub fn query_strict<Q>(&self, query: &Q) -> Result<Vec<T>, ForestError>
    where
        Q: GenomicInterval + ?Sized,
    {
        let tree = self
            .trees
            .get(simple_name(query.chr()))
            .ok_or_else(|| ForestError::UnknownChromosome(query.chr().to_string()))?;
        Ok(tree.find(query.start(), query.end()))
    }

    /// Hits of every query, concatenated in query order. An interval hit by
    /// two queries appears twice.
    pub fn query_all<'q, Q, I>(&self, queries: I) -> Vec<T>
    where
        Q: GenomicInterval + ?Sized + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        queries
            .into_iter()
            .flat_map(|q| self.query_iter(q))
            .cloned()
            .collect()
    }

    /// Every interval hit by at least one query, each reported once, in order
    /// of first hit.
    pub fn query_unique<'q, Q, I>(&self, queries: I) -> Vec<T>
    where
        Q: GenomicInterval + ?Sized + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        // stored intervals never move, their address identifies them
        let mut seen: FxHashSet<*const T> = FxHashSet::default();
        let mut hits = Vec::new();
        for query in queries {
            for hit in self.query_iter(query) {
                if seen.insert(hit as *const T) {
                    hits.push(hit.clone());
                }
            }
        }
        hits
    }

    /// Intervals containing `chr:pos`.
    pub fn stab(&self, chr: &str, pos: Pos) -> Vec<T> {
        self.trees
            .get(simple_name(chr))
            .map(|t| t.stab(pos))
            .unwrap_or_default()
    }

    /// For each query, its intersection with every interval it hits.
    pub fn intersect<'q, Q, I>(&self, queries: I) -> Vec<Span>
    where
        Q: GenomicInterval + ?Sized + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        let mut spans = Vec::new();
        for query in queries {
            for hit in self.query_iter(query) {
                spans.push(Span::new(
                    hit.chr(),
                    hit.start().max(query.start()),
                    hit.end().min(query.end()),
                ));
            }
        }
        spans
    }

    /// Run [`IntervalForest::query`] for a batch of queries on the rayon
    /// thread pool. Results come back in query order.
    pub fn par_query<Q>(&self, queries: &[Q]) -> Vec<Vec<T>>
    where
        Q: GenomicInterval + Sync,
    {
        queries.par_iter().map(|q| self.query(q)).collect()
    }
}

impl<T> std::fmt::Debug for IntervalForest<T>
where
    T: GenomicInterval + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalForest")
            .field("overlapper_type", &self.overlapper_type)
            .field("chromosomes", &self.chromosome_names())
            .field("len", &self.len())
            .finish()
    }
}

///
/// A genome marker as stored in a genome-wide forest: its arena id plus the
/// coordinates needed for overlap. Resolve it with [`Genome::get`] or
/// [`Genome::subtree`].
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerHandle {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub span: Span,
}

impl MarkerHandle {
    pub fn new(id: MarkerId, marker: &Marker) -> Self {
        MarkerHandle {
            id,
            kind: marker.kind,
            span: marker.to_span(),
        }
    }
}

impl GenomicInterval for MarkerHandle {
    #[inline]
    fn chr(&self) -> &str {
        &self.span.chr
    }

    #[inline]
    fn start(&self) -> Pos {
        self.span.start
    }

    #[inline]
    fn end(&self) -> Pos {
        self.span.end
    }
}

/// Building a forest straight from the markers of a [`Genome`].
pub trait GenomeForest {
    /// Index every marker of `kind`, or every leaf marker when `kind` is `None`.
    fn forest(&self, kind: Option<MarkerKind>, overlapper_type: OverlapperType) -> IntervalForest<MarkerHandle>;
}

impl GenomeForest for Genome {
    fn forest(&self, kind: Option<MarkerKind>, overlapper_type: OverlapperType) -> IntervalForest<MarkerHandle> {
        let mut builder = IntervalForestBuilder::new();
        match kind {
            Some(kind) => builder.add_all(self.of_kind(kind).map(|(id, m)| MarkerHandle::new(id, m))),
            None => builder.add_all(self.leaves().map(|(id, m)| MarkerHandle::new(id, m))),
        }
        builder.build(overlapper_type)
    }
}

/// A trait for converting a collection of intervals into an [`IntervalForest`].
pub trait IntoIntervalForest<T>
where
    T: GenomicInterval + Clone + Send + Sync + 'static,
{
    fn into_interval_forest(self, overlapper_type: OverlapperType) -> IntervalForest<T>;
}

impl IntoIntervalForest<Marker> for Markers {
    fn into_interval_forest(self, overlapper_type: OverlapperType) -> IntervalForest<Marker> {
        self.markers.into_interval_forest(overlapper_type)
    }
}

impl<T> IntoIntervalForest<T> for Vec<T>
where
    T: GenomicInterval + Clone + Send + Sync + 'static,
{
    fn into_interval_forest(self, overlapper_type: OverlapperType) -> IntervalForest<T> {
        let mut builder = IntervalForestBuilder::new();
        builder.add_all(self);
        builder.build(overlapper_type)
    }
}

impl IntoIntervalForest<MarkerHandle> for &Genome {
    fn into_interval_forest(self, overlapper_type: OverlapperType) -> IntervalForest<MarkerHandle> {
        self.forest(None, overlapper_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varfx_core::models::{GenomeBuilder, Strand};

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn marker(chr: &str, start: Pos, end: Pos, id: &str) -> Marker {
        Marker::new(chr, start, end, Strand::Plus, id, MarkerKind::Custom)
    }

    fn ids(markers: &[Marker]) -> Vec<&str> {
        let mut ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        ids
    }

    #[fixture]
    fn markers() -> Markers {
        Markers::from(vec![
            marker("chr1", 100, 200, "a"),
            marker("chr1", 300, 400, "b"),
            marker("chr1", 600, 800, "c"),
            marker("chr2", 300, 400, "d"),
            marker("chr3", 500, 600, "e"),
        ])
    }

    #[rstest]
    #[case(OverlapperType::IntervalTree)]
    #[case(OverlapperType::Bits)]
    fn test_basic_overlaps(markers: Markers, #[case] overlapper_type: OverlapperType) {
        let forest = markers.into_interval_forest(overlapper_type);

        let hits = forest.query(&Span::new("chr1", 110, 210));
        assert_eq!(ids(&hits), vec!["a"]);
        assert_eq!(forest.len(), 5);
    }

    #[rstest]
    #[case(OverlapperType::IntervalTree)]
    #[case(OverlapperType::Bits)]
    fn test_multiple_overlaps_single_query(#[case] overlapper_type: OverlapperType) {
        let forest = vec![
            marker("chr1", 100, 200, "a"),
            marker("chr1", 150, 250, "b"),
            marker("chr1", 180, 300, "c"),
        ]
        .into_interval_forest(overlapper_type);

        let hits = forest.query(&Span::new("chr1", 160, 190));
        assert_eq!(ids(&hits), vec!["a", "b", "c"]);
    }

    #[rstest]
    #[case(OverlapperType::IntervalTree)]
    #[case(OverlapperType::Bits)]
    fn test_exact_boundary_overlaps(#[case] overlapper_type: OverlapperType) {
        let forest = vec![marker("chr1", 100, 200, "a")].into_interval_forest(overlapper_type);

        // closed intervals: sharing the last base is an overlap
        assert_eq!(forest.query(&Span::new("chr1", 200, 300)).len(), 1);
        assert_eq!(forest.query(&Span::new("chr1", 201, 300)).len(), 0);
    }

    #[rstest]
    #[case(OverlapperType::IntervalTree)]
    #[case(OverlapperType::Bits)]
    fn test_chromosome_aliases(markers: Markers, #[case] overlapper_type: OverlapperType) {
        let forest = markers.into_interval_forest(overlapper_type);

        assert_eq!(forest.has_tree("2"), true);
        assert_eq!(forest.has_tree("chromosome3"), true);
        assert_eq!(ids(&forest.query(&Span::new("2", 350, 360))), vec!["d"]);
        assert_eq!(forest.chromosome_names(), vec!["1", "2", "3"]);
    }

    #[rstest]
    #[case(OverlapperType::IntervalTree)]
    #[case(OverlapperType::Bits)]
    fn test_query_nonexistent_chromosome(markers: Markers, #[case] overlapper_type: OverlapperType) {
        let forest = markers.into_interval_forest(overlapper_type);

        let query = Span::new("chr99", 100, 200);
        assert_eq!(forest.query(&query).len(), 0);
        assert_eq!(forest.has_tree("chr99"), false);
        assert_eq!(
            forest.query_strict(&query),
            Err(ForestError::UnknownChromosome("chr99".to_string()))
        );
    }

    #[rstest]
    fn test_query_all_and_unique(markers: Markers) {
        let forest = markers.into_interval_forest(OverlapperType::default());
        let queries = vec![Span::new("chr1", 150, 350), Span::new("chr1", 390, 650)];

        let all = forest.query_all(&queries);
        assert_eq!(ids(&all), vec!["a", "b", "b", "c"]);

        let unique = forest.query_unique(&queries);
        assert_eq!(ids(&unique), vec!["a", "b", "c"]);
    }

    #[rstest]
    fn test_query_unique_keeps_identical_intervals() {
        let forest = vec![marker("chr1", 10, 20, "x"), marker("chr1", 10, 20, "x")]
            .into_interval_forest(OverlapperType::IntervalTree);
        let queries = vec![Span::new("chr1", 10, 10), Span::new("chr1", 20, 20)];
        assert_eq!(forest.query_unique(&queries).len(), 2);
    }

    #[rstest]
    fn test_stab(markers: Markers) {
        let forest = markers.into_interval_forest(OverlapperType::IntervalTree);
        assert_eq!(ids(&forest.stab("chr1", 300)), vec!["b"]);
        assert_eq!(forest.stab("chr1", 250).is_empty(), true);
        assert_eq!(forest.stab("chrX", 250).is_empty(), true);
    }

    #[rstest]
    fn test_intersect(markers: Markers) {
        let forest = markers.into_interval_forest(OverlapperType::IntervalTree);
        let spans = forest.intersect(&vec![Span::new("chr1", 150, 350)]);
        let mut spans: Vec<(Pos, Pos)> = spans.iter().map(|s| (s.start, s.end)).collect();
        spans.sort();
        assert_eq!(spans, vec![(150, 200), (300, 350)]);
    }

    #[rstest]
    fn test_par_query_keeps_order(markers: Markers) {
        let forest = markers.into_interval_forest(OverlapperType::IntervalTree);
        let queries: Vec<Span> = vec![
            Span::new("chr3", 550, 550),
            Span::new("chr1", 0, 10),
            Span::new("chr1", 650, 700),
        ];
        let results = forest.par_query(&queries);
        assert_eq!(results.len(), 3);
        assert_eq!(ids(&results[0]), vec!["e"]);
        assert_eq!(results[1].is_empty(), true);
        assert_eq!(ids(&results[2]), vec!["c"]);
    }

    #[rstest]
    fn test_builder() {
        let mut builder = IntervalForestBuilder::new();
        assert_eq!(builder.is_empty(), true);
        builder.add(Span::new("chr1", 1, 10));
        builder.add_all(vec![Span::new("1", 5, 6), Span::new("chrX", 1, 1)]);
        assert_eq!(builder.len(), 3);

        let forest = builder.build(OverlapperType::Bits);
        assert_eq!(forest.overlapper_type(), OverlapperType::Bits);
        assert_eq!(forest.query(&Span::new("chr1", 6, 6)).len(), 2);
        assert_eq!(forest.tree("X").map(|t| t.len()), Some(1));
    }

    #[rstest]
    fn test_genome_forest() {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
        let mut gene = Marker::new("chr1", 1000, 5000, Strand::Plus, "g1", MarkerKind::Gene);
        let mut tr = Marker::new("chr1", 1000, 5000, Strand::Plus, "t1", MarkerKind::Transcript);
        tr.add_child(Marker::new("chr1", 1000, 1200, Strand::Plus, "e1", MarkerKind::Exon))
            .unwrap();
        tr.add_child(Marker::new("chr1", 4000, 5000, Strand::Plus, "e2", MarkerKind::Exon))
            .unwrap();
        gene.add_child(tr).unwrap();
        builder.add_child(chr1, gene).unwrap();
        let genome = builder.build();

        let leaves = (&genome).into_interval_forest(OverlapperType::IntervalTree);
        assert_eq!(leaves.len(), 2);
        let hits = leaves.query(&Span::new("chr1", 1100, 1100));
        assert_eq!(hits.len(), 1);
        assert_eq!(genome.get(hits[0].id).map(|m| m.id.as_str()), Some("e1"));

        let transcripts = genome.forest(Some(MarkerKind::Transcript), OverlapperType::Bits);
        let hits = transcripts.query(&Span::new("chr1", 3000, 3000));
        assert_eq!(hits.len(), 1);
        let tr = genome.subtree(hits[0].id).unwrap();
        assert_eq!(tr.num_children(), 2);
    }
}
