use varfx_core::models::markers::median_of_endpoints;
use varfx_core::models::{GenomicInterval, Pos};

use crate::traits::{Overlapper, overlaps};

///
/// A centered interval tree.
///
/// Each node splits its intervals around `center`, the median of all their
/// endpoints. Intervals containing `center` stay in the node, once sorted by
/// start (ascending) and once by end (descending); the rest recurse into the
/// left subtree (`end < center`) or the right subtree (`start > center`).
/// Nodes live in a flat arena and point at items by index.
///
/// Build is `O(n log n)`, a query is `O(log n + k)`.
///
/// # Examples
///
/// ```
/// use varfx_core::models::Span;
/// use varfx_overlaprs::{IntervalTree, Overlapper};
///
/// let tree = IntervalTree::build(vec![
///     Span::new("chr1", 100, 200),
///     Span::new("chr1", 150, 300),
///     Span::new("chr1", 400, 500),
/// ]);
///
/// assert_eq!(tree.find(180, 250).len(), 2);
/// assert_eq!(tree.stab(450), vec![Span::new("chr1", 400, 500)]);
/// ```
#[derive(Debug, Clone)]
pub struct IntervalTree<T> {
    items: Vec<T>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

#[derive(Debug, Clone)]
struct Node {
    center: Pos,
    by_start: Vec<usize>,
    by_end: Vec<usize>,
    left: Option<usize>,
    right: Option<usize>,
    /// The split made no progress: `by_start` holds every interval and is
    /// scanned in full.
    exhaustive: bool,
}

impl<T> IntervalTree<T>
where
    T: GenomicInterval + Clone + Send + Sync,
{
    fn build_node(&mut self, members: Vec<usize>) -> Option<usize> {
        if members.is_empty() {
            return None;
        }

        let n = members.len();
        let center = median_of_endpoints(members.iter().map(|&i| &self.items[i]))?;

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut bucket = Vec::new();
        for i in members {
            let interval = &self.items[i];
            if interval.end() < center {
                left.push(i);
            } else if interval.start() > center {
                right.push(i);
            } else {
                bucket.push(i);
            }
        }

        let exhaustive = left.len() == n || right.len() == n;
        if exhaustive {
            bucket.append(&mut left);
            bucket.append(&mut right);
        }

        let mut by_start = bucket.clone();
        by_start.sort_by_key(|&i| (self.items[i].start(), self.items[i].end()));
        let mut by_end = bucket;
        by_end.sort_by(|&a, &b| self.items[b].end().cmp(&self.items[a].end()));

        let id = self.nodes.len();
        self.nodes.push(Node {
            center,
            by_start,
            by_end,
            left: None,
            right: None,
            exhaustive,
        });

        let left = self.build_node(left);
        let right = self.build_node(right);
        self.nodes[id].left = left;
        self.nodes[id].right = right;

        Some(id)
    }

    fn collect<'a>(&'a self, start: Pos, end: Pos, hits: &mut Vec<&'a T>) {
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];

            if node.exhaustive {
                hits.extend(
                    node.by_start
                        .iter()
                        .map(|&i| &self.items[i])
                        .filter(|iv| overlaps(*iv, start, end)),
                );
                continue;
            }

            if end < node.center {
                // every bucket interval reaches past the query end
                for &i in &node.by_start {
                    let interval = &self.items[i];
                    if interval.start() > end {
                        break;
                    }
                    if overlaps(interval, start, end) {
                        hits.push(interval);
                    }
                }
            } else if start > node.center {
                for &i in &node.by_end {
                    let interval = &self.items[i];
                    if interval.end() < start {
                        break;
                    }
                    if overlaps(interval, start, end) {
                        hits.push(interval);
                    }
                }
            } else {
                hits.extend(node.by_start.iter().map(|&i| &self.items[i]));
            }

            if start < node.center {
                stack.extend(node.left);
            }
            if end > node.center {
                stack.extend(node.right);
            }
        }
    }

    /// Depth of the deepest node, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: Option<usize>) -> usize {
            match id {
                None => 0,
                Some(id) => 1 + walk(nodes, nodes[id].left).max(walk(nodes, nodes[id].right)),
            }
        }
        walk(&self.nodes, self.root)
    }

    /// Stored items, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Overlapper<T> for IntervalTree<T>
where
    T: GenomicInterval + Clone + Send + Sync,
{
    fn build(intervals: Vec<T>) -> Self
    where
        Self: Sized,
    {
        let members = (0..intervals.len()).collect();
        let mut tree = IntervalTree {
            items: intervals,
            nodes: Vec::new(),
            root: None,
        };
        tree.root = tree.build_node(members);
        tree
    }

    fn find_iter<'a>(&'a self, start: Pos, end: Pos) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        let mut hits = Vec::new();
        self.collect(start, end, &mut hits);
        Box::new(hits.into_iter())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> IntoIterator for IntervalTree<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varfx_core::models::Span;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn span(start: Pos, end: Pos) -> Span {
        Span::new("chr1", start, end)
    }

    fn sorted(mut spans: Vec<Span>) -> Vec<(Pos, Pos)> {
        spans.sort_by_key(|s| (s.start, s.end));
        spans.into_iter().map(|s| (s.start, s.end)).collect()
    }

    #[fixture]
    fn intervals() -> Vec<Span> {
        vec![span(1, 5), span(3, 7), span(6, 10), span(8, 12)]
    }

    #[rstest]
    fn test_build_and_len(intervals: Vec<Span>) {
        let tree = IntervalTree::build(intervals.clone());
        assert_eq!(tree.len(), intervals.len());
        assert_eq!(tree.is_empty(), false);
    }

    #[rstest]
    #[case(2, 4, vec![(1, 5), (3, 7)])]
    #[case(9, 11, vec![(6, 10), (8, 12)])]
    #[case(5, 6, vec![(1, 5), (3, 7), (6, 10)])]
    #[case(12, 12, vec![(8, 12)])]
    #[case(13, 15, vec![])]
    #[case(-10, 0, vec![])]
    fn test_find(intervals: Vec<Span>, #[case] start: Pos, #[case] end: Pos, #[case] expected: Vec<(Pos, Pos)>) {
        let tree = IntervalTree::build(intervals);
        assert_eq!(sorted(tree.find(start, end)), expected);
    }

    #[rstest]
    fn test_closed_boundaries() {
        let tree = IntervalTree::build(vec![span(100, 200)]);
        assert_eq!(tree.find(200, 300).len(), 1);
        assert_eq!(tree.find(0, 100).len(), 1);
        assert_eq!(tree.find(201, 300).len(), 0);
        assert_eq!(tree.find(0, 99).len(), 0);
    }

    #[rstest]
    fn test_stab(intervals: Vec<Span>) {
        let tree = IntervalTree::build(intervals);
        assert_eq!(sorted(tree.stab(6)), vec![(3, 7), (6, 10)]);
        assert_eq!(tree.stab(0).is_empty(), true);
    }

    #[rstest]
    fn test_empty_tree() {
        let tree: IntervalTree<Span> = IntervalTree::build(vec![]);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.is_empty(), true);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.find(1, 2).is_empty(), true);
    }

    #[rstest]
    fn test_identical_intervals() {
        let tree = IntervalTree::build(vec![span(10, 10); 20]);
        assert_eq!(tree.find(10, 10).len(), 20);
        assert_eq!(tree.find(11, 20).len(), 0);
    }

    #[rstest]
    fn test_zero_length_intervals() {
        // insertion points between bases 9/10 and 19/20
        let tree = IntervalTree::build(vec![span(10, 9), span(20, 19)]);
        assert_eq!(sorted(tree.find(9, 10)), vec![(10, 9)]);
        assert_eq!(sorted(tree.find(0, 100)), vec![(10, 9), (20, 19)]);
        assert_eq!(tree.find(11, 18).len(), 0);
    }

    #[rstest]
    fn test_depth_is_logarithmic() {
        let intervals: Vec<Span> = (0..1024).map(|i| span(i * 10, i * 10 + 5)).collect();
        let tree = IntervalTree::build(intervals);
        assert!(tree.depth() <= 12, "depth {}", tree.depth());
    }
}
