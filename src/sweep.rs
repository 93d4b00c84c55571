use std::{borrow::Cow, cmp::Ordering};

use geo::GeoFloat;
use log::{debug, trace};

use crate::{
    avl::AvlMap,
    events::{build_events, Event, EventType, SweepPoint},
    predicates::y_at_x,
    segments::{Crossing, Segment, SegmentSet},
};

/// Order of an active segment relative to the segment `key`, which
/// passes through `(x, y)`.
///
/// Active segments are compared by their `y` at the current sweep `x`
/// rather than at the `x` they were inserted at. Until the sweep
/// passes the leftmost crossing, the active segments don't cross, so
/// this order agrees with the shape of the tree. Ties (eg. segments
/// sharing an end point) are broken by segment index.
#[inline]
fn cmp_at<T: GeoFloat>(active: &Segment<T>, active_key: usize, x: T, y: T, key: usize) -> Ordering {
    y_at_x(active, x)
        .partial_cmp(&y)
        .unwrap_or(Ordering::Equal)
        .then_with(|| active_key.cmp(&key))
}

/// Plane sweep to detect one crossing in a [`SegmentSet`].
///
/// This is the Shamos-Hoey sweep: end points are processed left to
/// right while maintaining the segments crossing the sweep line in an
/// [`AvlMap`] ordered by `y`. A new segment is tested against its
/// neighbours, and a departing segment's neighbours are tested against
/// each other. The sweep stops at the first intersecting pair. Runs in
/// O(n log n) time.
pub struct Sweep<'a, T: GeoFloat> {
    segments: &'a SegmentSet<T>,
    events: Cow<'a, [Event<T>]>,
    next: usize,
    active_segments: AvlMap<Segment<T>, usize>,
    sweep_x: Option<T>,
    crossing: Option<Crossing>,
}

impl<'a, T: GeoFloat> Sweep<'a, T> {
    pub fn new(segments: &'a SegmentSet<T>) -> Self {
        Self::from_events(segments, build_events(segments).into())
    }

    /// Sweep over prepared events, as returned by [`build_events`] for
    /// the same set.
    ///
    /// Useful to time the sweep separately from sorting.
    pub fn with_events(segments: &'a SegmentSet<T>, events: &'a [Event<T>]) -> Self {
        debug_assert_eq!(events.len(), 2 * segments.len());
        debug_assert!(events.windows(2).all(|w| w[0] <= w[1]), "events must be sorted");
        Self::from_events(segments, events.into())
    }

    fn from_events(segments: &'a SegmentSet<T>, events: Cow<'a, [Event<T>]>) -> Self {
        Sweep {
            segments,
            events,
            next: 0,
            active_segments: AvlMap::with_capacity(segments.len()),
            sweep_x: None,
            crossing: None,
        }
    }

    /// The crossing found so far, if any.
    #[inline]
    pub fn crossing(&self) -> Option<Crossing> {
        self.crossing
    }

    /// Number of segments currently crossing the sweep line.
    #[inline]
    pub fn active_len(&self) -> usize {
        self.active_segments.len()
    }

    /// Peek and return the next point in the sweep.
    #[inline]
    pub fn peek_point(&self) -> Option<SweepPoint<T>> {
        if self.crossing.is_some() {
            return None;
        }
        self.events.get(self.next).map(|e| e.point)
    }

    /// Process the next event and return its point.
    ///
    /// Returns `None` once the events are exhausted or a crossing has
    /// been found.
    pub fn next_event(&mut self) -> Option<SweepPoint<T>> {
        if self.crossing.is_some() {
            return None;
        }
        let event = self.events.get(self.next)?.clone();
        self.next += 1;
        self.crossing = self.handle_event(&event);
        Some(event.point)
    }

    /// Run the sweep to completion.
    pub fn run(mut self) -> Option<Crossing> {
        while self.next_event().is_some() {}
        self.crossing
    }

    fn handle_event(&mut self, event: &Event<T>) -> Option<Crossing> {
        trace!("handling event: {:?}", event);

        let x = event.point.x();
        debug_assert!(
            self.sweep_x.map_or(true, |prev| prev <= x),
            "sweep went backwards"
        );
        self.sweep_x = Some(x);

        let key = event.segment_key;
        let segment = self.segments.segments()[key];
        let y = y_at_x(&segment, x);
        let probe = |active: &Segment<T>, active_key: &usize| cmp_at(active, *active_key, x, y, key);

        match event.ty {
            EventType::Insert => {
                let replaced = self.active_segments.insert_by(segment, key, probe);
                debug_assert!(replaced.is_none(), "segment {} inserted twice", key);

                let prev = self.active_segments.predecessor_by(probe).map(|(_, k)| *k);
                let next = self.active_segments.successor_by(probe).map(|(_, k)| *k);
                for adj_key in prev.into_iter().chain(next.into_iter()) {
                    if self.segments.intersect(adj_key, key) {
                        debug!(
                            "found crossing at insert of {}: {:?} and {:?}",
                            key,
                            self.segments.segments()[adj_key],
                            segment
                        );
                        return Some(Crossing {
                            first: adj_key,
                            second: key,
                        });
                    }
                }
            }
            EventType::Remove => {
                // Neighbours become adjacent once `key` is removed.
                let prev = self.active_segments.predecessor_by(probe).map(|(_, k)| *k);
                let next = self.active_segments.successor_by(probe).map(|(_, k)| *k);
                if let (Some(prev_key), Some(next_key)) = (prev, next) {
                    if self.segments.intersect(prev_key, next_key) {
                        debug!(
                            "found crossing at removal of {}: {:?} and {:?}",
                            key,
                            self.segments.segments()[prev_key],
                            self.segments.segments()[next_key]
                        );
                        return Some(Crossing {
                            first: prev_key,
                            second: next_key,
                        });
                    }
                }

                if self.active_segments.remove_by(probe).is_none() {
                    trace!("segment {} was not active at removal", key);
                }
            }
        }
        None
    }
}

/// Detect a crossing with the plane sweep. See [`Sweep`].
pub fn find_intersection_sweep<T: GeoFloat>(set: &SegmentSet<T>) -> Option<Crossing> {
    Sweep::new(set).run()
}

/// Like [`find_intersection_sweep`], over events already built (and
/// sorted) by [`build_events`].
pub fn find_intersection_with_events<T: GeoFloat>(
    set: &SegmentSet<T>,
    events: &[Event<T>],
) -> Option<Crossing> {
    Sweep::with_events(set, events).run()
}
