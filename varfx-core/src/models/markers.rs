use std::fmt::{self, Display};

use fxhash::FxHashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::chromosome::simple_name;
use super::interval::{GenomicInterval, Pos};
use super::marker::Marker;

///
/// An ordered bag of markers. No uniqueness is enforced unless
/// [`Markers::unique`] is called.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Markers {
    pub markers: Vec<Marker>,
    pub name: Option<String>,
}

impl Markers {
    pub fn new() -> Self {
        Markers::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Marker> {
        self.markers.get(idx)
    }

    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Stable sort by chromosome, start, end and id.
    pub fn sort_by_start(&mut self, reverse: bool) {
        if reverse {
            self.markers.sort_by(|a, b| b.cmp_with_id(a));
        } else {
            self.markers.sort_by(|a, b| a.cmp_with_id(b));
        }
    }

    /// Stable sort by chromosome, end, start and id.
    pub fn sort_by_end(&mut self, reverse: bool) {
        if reverse {
            self.markers.sort_by(|a, b| b.cmp_by_end(a));
        } else {
            self.markers.sort_by(|a, b| a.cmp_by_end(b));
        }
    }

    /// A sorted copy (natural order).
    pub fn sorted(&self) -> Markers {
        let mut sorted = self.clone();
        sorted.sort_by_start(false);
        sorted
    }

    /// Median of all start and end coordinates.
    pub fn median(&self) -> Option<Pos> {
        median_of_endpoints(self.markers.iter())
    }

    /// Copy without duplicates (same chromosome, coordinates, strand and id),
    /// keeping the first occurrence.
    pub fn unique(&self) -> Markers {
        let mut seen = FxHashSet::default();
        let markers = self
            .markers
            .iter()
            .filter(|m| seen.insert((simple_name(&m.chr), m.start, m.end, m.strand, m.id.as_str())))
            .cloned()
            .collect();
        Markers {
            markers,
            name: self.name.clone(),
        }
    }

    /// Markers intersecting `interval`.
    pub fn intersect_with<O: GenomicInterval + ?Sized>(&self, interval: &O) -> Markers {
        Markers {
            markers: self
                .markers
                .iter()
                .filter(|m| m.intersects(interval))
                .cloned()
                .collect(),
            name: self.name.clone(),
        }
    }

    /// Same set of positions (chromosome, start, end), irrespective of order.
    pub fn same_as(&self, other: &Markers) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let a = self.sorted();
        let b = other.sorted();
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| x.same_chr(y) && x.start == y.start && x.end == y.end)
    }

    /// Sum of marker lengths (overlapping bases are counted repeatedly).
    pub fn total_len(&self) -> Pos {
        self.markers.iter().map(|m| m.len()).sum()
    }
}

/// Median of the pooled start/end coordinates of `intervals`.
pub fn median_of_endpoints<'a, I, T>(intervals: I) -> Option<Pos>
where
    I: IntoIterator<Item = &'a T>,
    T: GenomicInterval + 'a,
{
    let mut points: Vec<Pos> = intervals
        .into_iter()
        .flat_map(|m| [m.start(), m.end()])
        .collect();
    if points.is_empty() {
        return None;
    }
    let mid = points.len() / 2;
    let (_, median, _) = points.select_nth_unstable(mid);
    Some(*median)
}

impl From<Vec<Marker>> for Markers {
    fn from(markers: Vec<Marker>) -> Self {
        Markers {
            markers,
            name: None,
        }
    }
}

impl FromIterator<Marker> for Markers {
    fn from_iter<T: IntoIterator<Item = Marker>>(iter: T) -> Self {
        Markers::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Extend<Marker> for Markers {
    fn extend<T: IntoIterator<Item = Marker>>(&mut self, iter: T) {
        self.markers.extend(iter);
    }
}

impl IntoIterator for Markers {
    type Item = Marker;
    type IntoIter = std::vec::IntoIter<Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.into_iter()
    }
}

impl<'a> IntoIterator for &'a Markers {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

impl Display for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.markers {
            writeln!(f, "{m}")?;
        }
        Ok(())
    }
}
