use geo::{
    kernels::{HasKernel, Kernel, Orientation as KernelOrientation},
    Coordinate, GeoFloat,
};

use crate::segments::Segment;

/// End points closer than this in `x` are treated as a vertical
/// segment by [`y_at_x`].
pub const VERTICAL_TOLERANCE: f64 = 1e-9;

/// Side of a directed line on which a point lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Left,
    Right,
    Collinear,
}

impl From<KernelOrientation> for Orientation {
    #[inline]
    fn from(orientation: KernelOrientation) -> Self {
        match orientation {
            KernelOrientation::CounterClockwise => Orientation::Left,
            KernelOrientation::Clockwise => Orientation::Right,
            KernelOrientation::Collinear => Orientation::Collinear,
        }
    }
}

/// How [`segments_intersect`] treats an end point lying exactly on
/// the other segment's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollinearPolicy {
    /// The end point must also lie within the other segment. Collinear
    /// segments intersect only if they touch or overlap.
    Overlap,

    /// Any end point on the other segment's infinite line counts as an
    /// intersection, even if the segments are far apart along it.
    Line,
}

impl Default for CollinearPolicy {
    fn default() -> Self {
        CollinearPolicy::Overlap
    }
}

/// Sign of the cross product `(b - a) x (c - a)`.
///
/// There is no tolerance: the sign comes from the kernel of `T`, which
/// is exact for the float types.
#[inline]
pub fn orientation<T: GeoFloat>(a: Coordinate<T>, b: Coordinate<T>, c: Coordinate<T>) -> Orientation {
    <T as HasKernel>::Ker::orient2d(a, b, c).into()
}

/// Check whether `r`, known to be collinear with `p` and `q`, lies in
/// their bounding box (and hence on the segment `pq`).
#[inline]
fn within_bounds<T: GeoFloat>(p: Coordinate<T>, q: Coordinate<T>, r: Coordinate<T>) -> bool {
    r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
}

/// Test whether two segments share at least one point.
///
/// A proper crossing is detected when each segment's end points lie on
/// opposite sides of the other's line. End points that are exactly
/// collinear are resolved as per `policy`.
pub fn segments_intersect<T: GeoFloat>(
    s1: &Segment<T>,
    s2: &Segment<T>,
    policy: CollinearPolicy,
) -> bool {
    let (a, b) = (s1.begin(), s1.end());
    let (c, d) = (s2.begin(), s2.end());

    let abc = orientation(a, b, c);
    let abd = orientation(a, b, d);
    let cda = orientation(c, d, a);
    let cdb = orientation(c, d, b);

    use Orientation::Collinear;
    match policy {
        CollinearPolicy::Line => {
            if abc == Collinear || abd == Collinear || cda == Collinear || cdb == Collinear {
                return true;
            }
        }
        CollinearPolicy::Overlap => {
            if (abc == Collinear && within_bounds(a, b, c))
                || (abd == Collinear && within_bounds(a, b, d))
                || (cda == Collinear && within_bounds(c, d, a))
                || (cdb == Collinear && within_bounds(c, d, b))
            {
                return true;
            }
        }
    }

    abc != abd && cda != cdb && abc != Collinear && abd != Collinear && cda != Collinear && cdb != Collinear
}

/// The `y` coordinate of the segment's line at `x`.
///
/// A (near) vertical segment has no single `y` at its `x`; the midpoint
/// of its end points is returned instead.
pub fn y_at_x<T: GeoFloat>(segment: &Segment<T>, x: T) -> T {
    let (p, q) = (segment.begin(), segment.end());
    let dx = q.x - p.x;
    let tolerance = T::from(VERTICAL_TOLERANCE).unwrap_or_else(T::epsilon);
    if dx.abs() < tolerance {
        return (p.y + q.y) / (T::one() + T::one());
    }
    p.y + (q.y - p.y) * (x - p.x) / dx
}
