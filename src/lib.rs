//! Detects whether any two of a set of planar line segments intersect.
//!
//! 1. [Usage](#usage)
//! 1. [Algorithms](#algorithms)
//! 1. [Collinear segments](#collinear-segments)
//!
//! # Usage
//!
//! Collect the segments in a [`SegmentSet`], then query it. Adding a
//! segment whose end points coincide fails with [`Error::Degenerate`].
//!
//! ```rust
//! use crossing_pair::{Crossing, SegmentSet};
//!
//! let mut set = SegmentSet::new();
//! set.add((0., 0.), (1., 1.)).unwrap();
//! set.add((0., 1.), (1., 0.)).unwrap();
//! set.add((5., 5.), (6., 5.)).unwrap();
//!
//! assert!(set.has_intersection());
//! assert_eq!(
//!     set.find_intersection_naive(),
//!     Some(Crossing { first: 0, second: 1 })
//! );
//! assert!(set.add((2., 2.), (2., 2.)).is_err());
//! ```
//!
//! # Algorithms
//!
//! [`SegmentSet::find_intersection_sweep`] runs a [Shamos-Hoey] plane
//! sweep ([`Sweep`]) in O(n log n) time. The segments crossing the
//! sweep line are kept in an [`AvlMap`], a height-balanced map with
//! logarithmic neighbour queries. The sweep stops at the first
//! intersecting pair it finds, which need not be the lowest indexed
//! one.
//!
//! [`SegmentSet::find_intersection_naive`] tests all pairs in O(n^2)
//! time and returns the lowest intersecting pair. Both agree on
//! whether a crossing exists.
//!
//! # Collinear segments
//!
//! Orientation tests are exact, so an end point may lie exactly on
//! the line of another segment. With the default
//! [`CollinearPolicy::Overlap`], such segments intersect only if they
//! actually share a point. [`CollinearPolicy::Line`] counts any end
//! point on the other segment's infinite line as an intersection.
//!
//! [Shamos-Hoey]: //en.wikipedia.org/wiki/Shamos%E2%80%93Hoey_algorithm
mod error;
pub use error::{Error, Result};

mod events;
pub use events::{build_events, Event, EventType, SweepPoint};

mod predicates;
pub use predicates::{
    orientation, segments_intersect, y_at_x, CollinearPolicy, Orientation, VERTICAL_TOLERANCE,
};

mod segments;
pub use segments::{Crossing, Segment, SegmentSet};

pub mod avl;
pub use avl::AvlMap;

mod naive;
pub use naive::find_intersection_naive;

mod sweep;
pub use sweep::{find_intersection_sweep, find_intersection_with_events, Sweep};

#[cfg(any(test, feature = "generators"))]
pub mod generators;
