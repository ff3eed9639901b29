//! The genome arena.
//!
//! Markers are loaded once through a [`GenomeBuilder`] (single threaded, mutable)
//! and frozen into a [`Genome`] that can be shared read-only between threads.
//! Parent links are plain [`MarkerId`] indices into the arena, so upward
//! navigation is O(1) without reference cycles.

use std::fmt::{self, Display};

use fxhash::{FxHashMap, FxHashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::chromosome::{compare_names, simple_name};
use super::interval::{GenomicInterval, Pos, Span, Strand};
use super::marker::{Marker, MarkerKind};
use crate::errors::GenomeError;

/// Handle of a marker inside a [`Genome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerId(pub u32);

impl MarkerId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-fatal data problems found while building a genome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BuildWarning {
    /// A child did not fit in its parent, so the parent was widened.
    ParentWidened {
        parent: String,
        child: String,
        before: Span,
        after: Span,
    },
}

impl Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::ParentWidened {
                parent,
                child,
                before,
                after,
            } => write!(
                f,
                "Marker '{parent}' widened from {before} to {after} to include child '{child}'"
            ),
        }
    }
}

/// Options controlling how a [`GenomeBuilder`] treats inconsistent input.
#[derive(Debug, Clone)]
pub struct GenomeBuilderConfig {
    /// Grow a parent (and its ancestors) to include an out-of-bounds child.
    /// When false such a child is rejected.
    pub widen_parent_to_fit_child: bool,
    /// Emit a `log::warn!` for every widened parent.
    pub warn_on_widen: bool,
}

impl Default for GenomeBuilderConfig {
    fn default() -> Self {
        GenomeBuilderConfig {
            widen_parent_to_fit_child: true,
            warn_on_widen: true,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Node {
    /// Stored without its children; those live in `children` as arena ids.
    marker: Marker,
    children: Vec<MarkerId>,
}

/// Mutable, single-threaded construction phase of a [`Genome`].
#[derive(Debug, Default)]
pub struct GenomeBuilder {
    name: String,
    config: GenomeBuilderConfig,
    nodes: Vec<Node>,
    chromosomes: FxHashMap<String, MarkerId>,
    /// Child ids per node, parallel to `nodes`.
    child_ids: Vec<FxHashSet<String>>,
    warnings: Vec<BuildWarning>,
}

impl GenomeBuilder {
    pub fn new(name: &str) -> Self {
        GenomeBuilder {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: GenomeBuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a chromosome spanning `[0, length - 1]`.
    pub fn add_chromosome(&mut self, name: &str, length: Pos) -> Result<MarkerId, GenomeError> {
        let key = simple_name(name).to_string();
        if self.chromosomes.contains_key(&key) {
            return Err(GenomeError::DuplicateChromosome(name.to_string()));
        }
        let marker = Marker::new(name, 0, length - 1, Strand::Plus, name, MarkerKind::Chromosome);
        check_coordinates(&marker)?;

        let id = self.push_node(marker, None);
        self.chromosomes.insert(key, id);
        Ok(id)
    }

    /// Look up a chromosome registered so far.
    pub fn chromosome(&self, name: &str) -> Option<MarkerId> {
        self.chromosomes.get(simple_name(name)).copied()
    }

    /// Add `marker` under `parent`. Children already nested inside `marker`
    /// are added recursively. Returns the id of `marker`.
    ///
    /// The whole nested subtree is checked before anything is inserted, so on
    /// error the builder is left as it was.
    pub fn add_child(&mut self, parent: MarkerId, marker: Marker) -> Result<MarkerId, GenomeError> {
        let parent_marker = &self
            .nodes
            .get(parent.index())
            .ok_or(GenomeError::UnknownParent(parent.0))?
            .marker;

        if self.child_ids[parent.index()].contains(&marker.id) {
            return Err(GenomeError::DuplicateChildId {
                parent: parent_marker.id.clone(),
                child: marker.id.clone(),
            });
        }
        self.validate(parent_marker, &marker)?;

        Ok(self.insert(parent, marker))
    }

    fn validate(&self, parent: &Marker, marker: &Marker) -> Result<(), GenomeError> {
        check_coordinates(marker)?;

        if !parent.same_chr(marker) {
            return Err(GenomeError::ChromosomeMismatch {
                parent: parent.id.clone(),
                parent_chr: parent.chr.clone(),
                child: marker.id.clone(),
                child_chr: marker.chr.clone(),
            });
        }

        let inside = parent.start <= marker.start && marker.end <= parent.end;
        if !inside && !self.config.widen_parent_to_fit_child {
            return Err(GenomeError::ChildOutOfBounds {
                parent: parent.id.clone(),
                child: marker.id.clone(),
            });
        }

        let mut seen = FxHashSet::default();
        for child in marker.children() {
            if !seen.insert(child.id.as_str()) {
                return Err(GenomeError::DuplicateChildId {
                    parent: marker.id.clone(),
                    child: child.id.clone(),
                });
            }
            self.validate(marker, child)?;
        }
        Ok(())
    }

    fn insert(&mut self, parent: MarkerId, mut marker: Marker) -> MarkerId {
        let parent_marker = &self.nodes[parent.index()].marker;
        if !(parent_marker.start <= marker.start && marker.end <= parent_marker.end) {
            self.widen_ancestors(parent, &marker);
        }

        let nested = marker.take_children();
        self.child_ids[parent.index()].insert(marker.id.clone());
        let id = self.push_node(marker, Some(parent));
        self.nodes[parent.index()].children.push(id);

        for child in nested {
            self.insert(id, child);
        }
        id
    }

    /// Add a marker directly under its chromosome, which must already exist.
    pub fn add_to_chromosome(&mut self, marker: Marker) -> Result<MarkerId, GenomeError> {
        let chr = self
            .chromosome(&marker.chr)
            .ok_or_else(|| GenomeError::UnknownChromosome(marker.chr.clone()))?;
        self.add_child(chr, marker)
    }

    /// Freeze the arena. Children are sorted into natural order; data
    /// warnings stay available through [`Genome::warnings`].
    pub fn build(mut self) -> Genome {
        let order: Vec<Vec<MarkerId>> = self
            .nodes
            .iter()
            .map(|node| {
                let mut children = node.children.clone();
                children.sort_by(|a, b| {
                    self.nodes[a.index()]
                        .marker
                        .cmp_with_id(&self.nodes[b.index()].marker)
                });
                children
            })
            .collect();

        for (node, children) in self.nodes.iter_mut().zip(order) {
            node.children = children;
        }

        let mut roots: Vec<MarkerId> = self.chromosomes.values().copied().collect();
        roots.sort_by(|a, b| {
            compare_names(
                &self.nodes[a.index()].marker.chr,
                &self.nodes[b.index()].marker.chr,
            )
        });

        Genome {
            name: self.name,
            nodes: self.nodes,
            chromosomes: self.chromosomes,
            roots,
            warnings: self.warnings,
        }
    }

    fn push_node(&mut self, mut marker: Marker, parent: Option<MarkerId>) -> MarkerId {
        let id = MarkerId(self.nodes.len() as u32);
        marker.parent = parent;
        self.nodes.push(Node {
            marker,
            children: Vec::new(),
        });
        self.child_ids.push(FxHashSet::default());
        id
    }

    fn widen_ancestors(&mut self, from: MarkerId, child: &Marker) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.nodes[id.index()];
            let m = &mut node.marker;
            if m.start <= child.start && child.end <= m.end {
                break;
            }

            let before = m.to_span();
            m.start = m.start.min(child.start);
            m.end = m.end.max(child.end);
            if let Some(seq) = m.sequence().cloned() {
                // keep the payload length in step with the new bounds
                m.set_sequence(seq);
            }
            let warning = BuildWarning::ParentWidened {
                parent: m.id.clone(),
                child: child.id.clone(),
                before,
                after: m.to_span(),
            };
            if self.config.warn_on_widen {
                log::warn!("{warning}");
            }
            current = m.parent;
            self.warnings.push(warning);
        }
    }
}

fn check_coordinates(marker: &Marker) -> Result<(), GenomeError> {
    if !marker.is_valid() {
        return Err(GenomeError::InvalidCoordinates {
            id: marker.id.clone(),
            chr: marker.chr.clone(),
            start: marker.start,
            end: marker.end,
        });
    }
    Ok(())
}

///
/// An immutable genome: chromosomes, genes, transcripts and their sub-features
/// in a flat arena.
///
/// Markers returned by [`Genome::get`] carry no children; use
/// [`Genome::children`] to walk down, or [`Genome::subtree`] to materialise an
/// owned composite marker for variant application.
///
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Genome {
    name: String,
    nodes: Vec<Node>,
    chromosomes: FxHashMap<String, MarkerId>,
    roots: Vec<MarkerId>,
    warnings: Vec<BuildWarning>,
}

impl Genome {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of markers in the arena, chromosomes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Data warnings collected while building.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    #[inline]
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.nodes.get(id.index()).map(|n| &n.marker)
    }

    #[inline]
    pub fn parent(&self, id: MarkerId) -> Option<MarkerId> {
        self.get(id)?.parent
    }

    /// Children of `id` in natural order.
    pub fn children(&self, id: MarkerId) -> &[MarkerId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Closest strict ancestor of the given kind.
    pub fn find_ancestor(&self, id: MarkerId, kind: MarkerKind) -> Option<MarkerId> {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if self.get(p)?.kind == kind {
                return Some(p);
            }
            current = self.parent(p);
        }
        None
    }

    pub fn chromosome(&self, name: &str) -> Option<MarkerId> {
        self.chromosomes.get(simple_name(name)).copied()
    }

    /// The chromosome a marker belongs to (itself, for a chromosome).
    pub fn chromosome_of(&self, id: MarkerId) -> Option<MarkerId> {
        let mut current = id;
        while let Some(p) = self.parent(current) {
            current = p;
        }
        self.get(current)?;
        Some(current)
    }

    /// Chromosome names, numeric chromosomes first.
    pub fn chromosome_names(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter_map(|id| self.get(*id))
            .map(|m| m.chr.as_str())
            .collect()
    }

    /// Every marker in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (MarkerId(i as u32), &n.marker))
    }

    /// Markers without children, chromosomes excluded.
    pub fn leaves(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.children.is_empty() && n.marker.parent.is_some())
            .map(|(i, n)| (MarkerId(i as u32), &n.marker))
    }

    pub fn of_kind(&self, kind: MarkerKind) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.markers().filter(move |(_, m)| m.kind == kind)
    }

    /// Owned copy of `id` with all of its descendants nested as children.
    pub fn subtree(&self, id: MarkerId) -> Option<Marker> {
        let node = self.nodes.get(id.index())?;
        let mut marker = node.marker.shallow_clone();
        let children = node
            .children
            .iter()
            .filter_map(|c| self.subtree(*c))
            .collect();
        marker.set_children(children);
        Some(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn exon(start: Pos, end: Pos, id: &str) -> Marker {
        Marker::new("chr1", start, end, Strand::Plus, id, MarkerKind::Exon)
    }

    #[fixture]
    fn genome() -> Genome {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
        builder.add_chromosome("chr2", 5_000).unwrap();

        let gene = builder
            .add_child(
                chr1,
                Marker::new("chr1", 1000, 2000, Strand::Plus, "gene1", MarkerKind::Gene),
            )
            .unwrap();

        let mut tr = Marker::new("chr1", 1000, 2000, Strand::Plus, "tr1", MarkerKind::Transcript);
        tr.add_child(exon(1500, 2000, "ex2")).unwrap();
        tr.add_child(exon(1000, 1200, "ex1")).unwrap();
        builder.add_child(gene, tr).unwrap();

        builder.build()
    }

    #[rstest]
    fn test_navigation(genome: Genome) {
        assert_eq!(genome.len(), 6);
        let chr1 = genome.chromosome("1").unwrap();
        let (ex1, _) = genome.markers().find(|(_, m)| m.id == "ex1").unwrap();

        let tr = genome.parent(ex1).unwrap();
        assert_eq!(genome.get(tr).unwrap().id, "tr1");
        let gene = genome.find_ancestor(ex1, MarkerKind::Gene).unwrap();
        assert_eq!(genome.get(gene).unwrap().id, "gene1");
        assert_eq!(genome.chromosome_of(ex1), Some(chr1));
        assert_eq!(genome.find_ancestor(ex1, MarkerKind::Utr5), None);
    }

    #[rstest]
    fn test_children_sorted(genome: Genome) {
        let (tr, _) = genome.markers().find(|(_, m)| m.id == "tr1").unwrap();
        let ids: Vec<&str> = genome
            .children(tr)
            .iter()
            .map(|c| genome.get(*c).unwrap().id.as_str())
            .collect();
        assert_eq!(ids, vec!["ex1", "ex2"]);
    }

    #[rstest]
    fn test_leaves_and_kinds(genome: Genome) {
        let leaves: Vec<&str> = genome.leaves().map(|(_, m)| m.id.as_str()).collect();
        assert_eq!(leaves, vec!["ex1", "ex2"]);
        assert_eq!(genome.of_kind(MarkerKind::Exon).count(), 2);
        assert_eq!(genome.chromosome_names(), vec!["chr1", "chr2"]);
    }

    #[rstest]
    fn test_subtree(genome: Genome) {
        let (gene, _) = genome.markers().find(|(_, m)| m.id == "gene1").unwrap();
        let subtree = genome.subtree(gene).unwrap();
        assert_eq!(subtree.num_children(), 1);
        let tr = &subtree.children()[0];
        assert_eq!(tr.children().len(), 2);
        assert_eq!(tr.children()[0].id, "ex1");
        assert_eq!(tr.children()[0].parent.is_some(), true);
    }

    #[rstest]
    fn test_parent_widened_with_warning() {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
        let gene = builder
            .add_child(
                chr1,
                Marker::new("chr1", 1000, 2000, Strand::Plus, "gene1", MarkerKind::Gene),
            )
            .unwrap();
        builder.add_child(gene, exon(900, 1100, "ex1")).unwrap();
        let genome = builder.build();

        assert_eq!(genome.get(gene).unwrap().start, 900);
        assert_eq!(genome.warnings().len(), 1);
        assert_eq!(
            genome.warnings()[0],
            BuildWarning::ParentWidened {
                parent: "gene1".to_string(),
                child: "ex1".to_string(),
                before: Span::new("chr1", 1000, 2000),
                after: Span::new("chr1", 900, 2000),
            }
        );
    }

    #[rstest]
    fn test_widening_disabled_rejects_child() {
        let mut builder = GenomeBuilder::new("test").with_config(GenomeBuilderConfig {
            widen_parent_to_fit_child: false,
            ..Default::default()
        });
        let chr1 = builder.add_chromosome("chr1", 100).unwrap();
        let err = builder.add_child(chr1, exon(50, 150, "ex1")).unwrap_err();
        assert_eq!(
            err,
            GenomeError::ChildOutOfBounds {
                parent: "chr1".to_string(),
                child: "ex1".to_string()
            }
        );
    }

    #[rstest]
    #[case(exon(500, 400, "bad"), "invalid")]
    #[case(Marker::new("chr2", 10, 20, Strand::Plus, "other", MarkerKind::Exon), "chromosome")]
    fn test_build_errors_name_the_marker(#[case] marker: Marker, #[case] kind: &str) {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
        let err = builder.add_child(chr1, marker).unwrap_err();
        let message = err.to_string();
        match kind {
            "invalid" => assert_eq!(message.contains("'bad'"), true),
            _ => assert_eq!(message.contains("'other'"), true),
        }
    }

    #[rstest]
    fn test_duplicate_chromosome_and_child() {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
        assert_eq!(
            builder.add_chromosome("1", 10).unwrap_err(),
            GenomeError::DuplicateChromosome("1".to_string())
        );
        builder.add_child(chr1, exon(10, 20, "ex1")).unwrap();
        assert_eq!(
            builder.add_child(chr1, exon(30, 40, "ex1")).is_err(),
            true
        );
        assert_eq!(
            builder.add_to_chromosome(Marker::new("chrX", 1, 2, Strand::Plus, "x", MarkerKind::Gene)),
            Err(GenomeError::UnknownChromosome("chrX".to_string()))
        );
    }

    #[rstest]
    #[case(Marker::new("chr2", 1500, 1600, Strand::Plus, "ex9", MarkerKind::Exon))]
    #[case(exon(1700, 1600, "ex9"))]
    fn test_failed_nested_add_leaves_builder_untouched(#[case] bad: Marker) {
        let build = |bad: Option<Marker>| {
            let mut builder = GenomeBuilder::new("test");
            let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
            builder.add_chromosome("chr2", 5_000).unwrap();
            let gene = builder
                .add_child(
                    chr1,
                    Marker::new("chr1", 1000, 2000, Strand::Plus, "gene1", MarkerKind::Gene),
                )
                .unwrap();

            if let Some(bad) = bad {
                // the first exon would widen the gene, the second one fails
                let mut tr =
                    Marker::new("chr1", 900, 2000, Strand::Plus, "tr1", MarkerKind::Transcript);
                tr.add_child(exon(900, 1200, "ex1")).unwrap();
                tr.add_child(bad).unwrap();
                assert_eq!(builder.add_child(gene, tr).is_err(), true);
            }
            builder.build()
        };

        let failed = build(Some(bad));
        let clean = build(None);
        assert_eq!(failed.len(), clean.len());
        assert_eq!(failed.warnings().is_empty(), true);
        for (id, m) in clean.markers() {
            assert_eq!(failed.get(id), Some(m));
            assert_eq!(failed.children(id), clean.children(id));
        }
    }

    #[rstest]
    fn test_duplicate_child_among_many() {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 1_000_000).unwrap();
        for i in 0..5_000 {
            let start = i * 100;
            builder
                .add_child(
                    chr1,
                    Marker::new("chr1", start, start + 50, Strand::Plus, &format!("g{i}"), MarkerKind::Gene),
                )
                .unwrap();
        }
        assert_eq!(
            builder.add_child(chr1, exon(10, 20, "g4999")),
            Err(GenomeError::DuplicateChildId {
                parent: "chr1".to_string(),
                child: "g4999".to_string()
            })
        );
        assert_eq!(builder.build().children(chr1).len(), 5_000);
    }

    #[rstest]
    fn test_child_may_use_chromosome_alias() {
        let mut builder = GenomeBuilder::new("test");
        let chr1 = builder.add_chromosome("chr1", 10_000).unwrap();
        let gene = Marker::new("1", 100, 200, Strand::Plus, "gene1", MarkerKind::Gene);
        assert_eq!(builder.add_child(chr1, gene).is_ok(), true);
    }
}
