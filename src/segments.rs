use std::slice;

use geo::{Coordinate, GeoFloat, Line};

use crate::{
    error::{Error, Result},
    events::SweepPoint,
    naive,
    predicates::{segments_intersect, CollinearPolicy},
    sweep::Sweep,
};

/// A line segment between two distinct, finite points.
///
/// The direction (`begin` to `end`) is kept as given; the sweep only
/// cares about the lexicographic order of the end points, see
/// [`Segment::left`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<T: GeoFloat> {
    begin: Coordinate<T>,
    end: Coordinate<T>,
}

impl<T: GeoFloat> Segment<T> {
    /// Create a segment, rejecting coincident or non-finite end points.
    pub fn new<C: Into<Coordinate<T>>>(begin: C, end: C) -> Result<Self> {
        let begin = begin.into();
        let end = end.into();
        if ![begin.x, begin.y, end.x, end.y].iter().all(|c| c.is_finite()) {
            return Err(Error::NonFinite);
        }
        if begin == end {
            return Err(Error::Degenerate);
        }
        Ok(Segment { begin, end })
    }

    #[inline]
    pub fn begin(&self) -> Coordinate<T> {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> Coordinate<T> {
        self.end
    }

    /// The lexicographically smaller end point.
    pub fn left(&self) -> SweepPoint<T> {
        self.endpoints().0
    }

    /// The lexicographically larger end point.
    pub fn right(&self) -> SweepPoint<T> {
        self.endpoints().1
    }

    /// Both end points, ordered lexicographically.
    pub(crate) fn endpoints(&self) -> (SweepPoint<T>, SweepPoint<T>) {
        let begin = SweepPoint::from(self.begin);
        let end = SweepPoint::from(self.end);
        if end < begin {
            (end, begin)
        } else {
            (begin, end)
        }
    }

    /// Test for an intersection with the default [`CollinearPolicy`].
    pub fn intersects(&self, other: &Self) -> bool {
        segments_intersect(self, other, CollinearPolicy::default())
    }

    #[inline]
    pub fn line(&self) -> Line<T> {
        Line::new(self.begin, self.end)
    }
}

impl<T: GeoFloat> TryFrom<Line<T>> for Segment<T> {
    type Error = Error;

    fn try_from(l: Line<T>) -> Result<Self> {
        Segment::new(l.start, l.end)
    }
}

/// A pair of intersecting segments, by index into a [`SegmentSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crossing {
    pub first: usize,
    pub second: usize,
}

impl Crossing {
    /// The pair with its indices in increasing order.
    pub fn sorted(self) -> Self {
        if self.first <= self.second {
            self
        } else {
            Crossing {
                first: self.second,
                second: self.first,
            }
        }
    }
}

/// An append-only collection of segments.
///
/// Segments are addressed by their insertion index, which stays valid
/// for the lifetime of the set. The set carries the
/// [`CollinearPolicy`] used by both intersection algorithms.
#[derive(Debug, Clone)]
pub struct SegmentSet<T: GeoFloat> {
    segments: Vec<Segment<T>>,
    policy: CollinearPolicy,
}

impl<T: GeoFloat> Default for SegmentSet<T> {
    fn default() -> Self {
        SegmentSet::new()
    }
}

impl<T: GeoFloat> SegmentSet<T> {
    pub fn new() -> Self {
        Self::with_policy(CollinearPolicy::default())
    }

    pub fn with_policy(policy: CollinearPolicy) -> Self {
        SegmentSet {
            segments: Vec::new(),
            policy,
        }
    }

    pub fn with_capacity(size: usize) -> Self {
        SegmentSet {
            segments: Vec::with_capacity(size),
            policy: CollinearPolicy::default(),
        }
    }

    #[inline]
    pub fn policy(&self) -> CollinearPolicy {
        self.policy
    }

    /// Add a segment and return its index.
    pub fn add<C: Into<Coordinate<T>>>(&mut self, begin: C, end: C) -> Result<usize> {
        let segment = Segment::new(begin, end)?;
        Ok(self.add_segment(segment))
    }

    /// Add an already validated segment and return its index.
    pub fn add_segment(&mut self, segment: Segment<T>) -> usize {
        self.segments.push(segment);
        self.segments.len() - 1
    }

    /// Bulk load segments from pairs of end points.
    ///
    /// The batch is validated as a whole: if any pair is rejected,
    /// nothing is added.
    pub fn extend_from_pairs<I, C>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (C, C)>,
        C: Into<Coordinate<T>>,
    {
        let batch = pairs
            .into_iter()
            .map(|(p, q)| Segment::new(p, q))
            .collect::<Result<Vec<_>>>()?;
        self.segments.extend(batch);
        Ok(())
    }

    /// Build a set from geo [`Line`]s with the default policy.
    pub fn from_lines<I: IntoIterator<Item = Line<T>>>(lines: I) -> Result<Self> {
        let mut set = SegmentSet::new();
        set.extend_from_pairs(lines.into_iter().map(|l| (l.start, l.end)))?;
        Ok(set)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bounds checked segment lookup.
    pub fn get(&self, index: usize) -> Result<&Segment<T>> {
        self.segments.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.segments.len(),
        })
    }

    #[inline]
    pub fn segments(&self) -> &[Segment<T>] {
        &self.segments
    }

    pub fn iter(&self) -> slice::Iter<'_, Segment<T>> {
        self.segments.iter()
    }

    /// Test two segments of this set under the set's policy.
    #[inline]
    pub(crate) fn intersect(&self, first: usize, second: usize) -> bool {
        segments_intersect(&self.segments[first], &self.segments[second], self.policy)
    }

    /// Exhaustive pairwise search. Returns the lowest intersecting
    /// index pair.
    pub fn find_intersection_naive(&self) -> Option<Crossing> {
        naive::find_intersection_naive(self)
    }

    /// Plane-sweep search. Returns some intersecting pair, not
    /// necessarily the one found by the naive search.
    pub fn find_intersection_sweep(&self) -> Option<Crossing> {
        Sweep::new(self).run()
    }

    /// Check if any two segments intersect, using the sweep.
    pub fn has_intersection(&self) -> bool {
        self.find_intersection_sweep().is_some()
    }
}

impl<T: GeoFloat> TryFrom<Vec<Line<T>>> for SegmentSet<T> {
    type Error = Error;

    fn try_from(lines: Vec<Line<T>>) -> Result<Self> {
        SegmentSet::from_lines(lines)
    }
}

impl<'a, T: GeoFloat> IntoIterator for &'a SegmentSet<T> {
    type Item = &'a Segment<T>;
    type IntoIter = slice::Iter<'a, Segment<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
