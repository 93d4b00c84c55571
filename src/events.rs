use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};

use crate::segments::SegmentSet;

/// A sweep event: one end point of one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<T: GeoFloat> {
    pub point: SweepPoint<T>,
    pub segment_key: usize,
    pub ty: EventType,
}

/// Event type to associate with event.
///
/// The ordering of the variants is used to order events at the same
/// point: insertions come first, so that segments sharing an end point
/// are active together and get compared.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub enum EventType {
    Insert,
    Remove,
}

/// Total order used to sort the events: by point, then type, then
/// segment index.
impl<T: GeoFloat> Eq for Event<T> {}

impl<T: GeoFloat> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: GeoFloat> Ord for Event<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.point
            .cmp(&other.point)
            .then_with(|| self.ty.cmp(&other.ty))
            .then_with(|| self.segment_key.cmp(&other.segment_key))
    }
}

/// A finite [`Coordinate`], totally ordered by `x` and then `y`.
///
/// This is the order in which the sweep visits end points.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SweepPoint<T: GeoFloat>(Coordinate<T>);

impl<T: GeoFloat> SweepPoint<T> {
    #[inline]
    pub fn coord(&self) -> Coordinate<T> {
        self.0
    }

    #[inline]
    pub fn x(&self) -> T {
        self.0.x
    }
}

/// Lexicographic: by `x`, then by `y`.
impl<T: GeoFloat> PartialOrd for SweepPoint<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

/// Total, as the coordinates are checked finite on construction.
impl<T: GeoFloat> Ord for SweepPoint<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl<T: GeoFloat> Eq for SweepPoint<T> {}

/// Panics on a NaN or infinite coordinate.
impl<T: GeoFloat> From<Coordinate<T>> for SweepPoint<T> {
    fn from(pt: Coordinate<T>) -> Self {
        assert!(
            pt.x.is_finite() && pt.y.is_finite(),
            "sweep point must be finite: {:?}",
            pt
        );
        SweepPoint(pt)
    }
}

impl<T: GeoFloat> From<(T, T)> for SweepPoint<T> {
    fn from(pt: (T, T)) -> Self {
        Coordinate::from(pt).into()
    }
}

/// Build the sorted event sequence for a set: an insertion at the left
/// end point and a removal at the right end point of every segment.
pub fn build_events<T: GeoFloat>(set: &SegmentSet<T>) -> Vec<Event<T>> {
    let mut events = Vec::with_capacity(2 * set.len());
    for (segment_key, segment) in set.iter().enumerate() {
        let (left, right) = segment.endpoints();
        events.push(Event {
            point: left,
            segment_key,
            ty: EventType::Insert,
        });
        events.push(Event {
            point: right,
            segment_key,
            ty: EventType::Remove,
        });
    }
    events.sort();
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_point_ordering() {
        let p1 = SweepPoint::from(Coordinate { x: 0., y: 0. });
        let p2 = SweepPoint::from(Coordinate { x: 1., y: 0. });
        let p3 = SweepPoint::from(Coordinate { x: 1., y: 1. });
        let p4 = SweepPoint::from(Coordinate { x: 1., y: 1. });

        assert!(p1 < p2);
        assert!(p1 < p3);
        assert!(p2 < p3);
        assert!(p3 <= p4);
    }

    #[test]
    #[should_panic]
    fn test_sweep_point_rejects_nan() {
        let _ = SweepPoint::from(Coordinate { x: f64::NAN, y: 0. });
    }

    #[test]
    fn test_event_ordering() {
        let e1 = Event {
            point: SweepPoint::from((0., 0.)),
            segment_key: 0,
            ty: EventType::Remove,
        };
        let e2 = Event {
            point: SweepPoint::from((1., 0.)),
            segment_key: 1,
            ty: EventType::Insert,
        };
        let e3 = Event {
            point: SweepPoint::from((1., 0.)),
            segment_key: 2,
            ty: EventType::Remove,
        };
        let e4 = Event {
            point: SweepPoint::from((1., 0.)),
            segment_key: 3,
            ty: EventType::Remove,
        };
        let e5 = Event {
            point: SweepPoint::from((1., 1.)),
            segment_key: 4,
            ty: EventType::Insert,
        };

        let mut events = vec![e5, e3, e1, e4, e2];
        events.sort();
        let order: Vec<_> = events.iter().map(|e| e.segment_key).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_build_events() {
        let mut set = SegmentSet::new();
        set.add((2., 2.), (0., 0.)).unwrap();
        set.add((1., 0.), (1., -3.)).unwrap();
        set.add((0., 0.), (3., 1.)).unwrap();

        let events = build_events(&set);
        assert_eq!(events.len(), 6);
        assert!(events.windows(2).all(|w| w[0] <= w[1]));

        let summary: Vec<_> = events
            .iter()
            .map(|e| (e.point.coord().x_y(), e.segment_key, e.ty))
            .collect();
        use EventType::*;
        assert_eq!(
            summary,
            vec![
                ((0., 0.), 0, Insert),
                ((0., 0.), 2, Insert),
                ((1., -3.), 1, Insert),
                ((1., 0.), 1, Remove),
                ((2., 2.), 0, Remove),
                ((3., 1.), 2, Remove),
            ]
        );
    }

    #[test]
    fn test_build_events_empty() {
        let set = SegmentSet::<f64>::new();
        assert!(build_events(&set).is_empty());
    }
}
