//! Random segment sets for tests and benchmarks.
//!
//! All generators draw from a caller supplied [`Rng`], so a seeded
//! generator (eg. `StdRng::seed_from_u64`) reproduces a set exactly.
//! Degenerate draws are re-drawn; a generator gives up with
//! [`Error::Degenerate`] only if [`MAX_ATTEMPTS`] draws in a row are
//! rejected, which happens when the bounds (or the length) are empty.
use std::f64::consts::PI;

use geo::{Coordinate, Line, Rect};
use log::{debug, trace};
use rand::Rng;
use rand_distr::Standard;

use crate::{
    error::{Error, Result},
    segments::{Segment, SegmentSet},
};

/// Number of draws tried per segment.
pub const MAX_ATTEMPTS: usize = 100;

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coordinate<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coordinate {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

#[inline]
pub fn uniform_line<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Line<f64> {
    Line::new(uniform_point(rng, bounds), uniform_point(rng, bounds))
}

/// A line of the given length, centered at a uniform point of `bounds`
/// with a uniform direction. The end points may fall outside `bounds`.
#[inline]
pub fn uniform_line_with_length<R: Rng>(rng: &mut R, bounds: Rect<f64>, length: f64) -> Line<f64> {
    let center = uniform_point(rng, bounds);
    let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
    let half: Coordinate<f64> = (0.5 * length * angle.cos(), 0.5 * length * angle.sin()).into();
    Line::new(center - half, center + half)
}

/// Draw lines until one makes a valid segment.
fn draw<R, F>(rng: &mut R, mut line: F) -> Result<Segment<f64>>
where
    R: Rng,
    F: FnMut(&mut R) -> Line<f64>,
{
    let mut last_err = Error::Degenerate;
    for _ in 0..MAX_ATTEMPTS {
        match Segment::try_from(line(&mut *rng)) {
            Ok(segment) => return Ok(segment),
            Err(err) => {
                trace!("re-drawing rejected segment: {}", err);
                last_err = err;
            }
        }
    }
    Err(last_err)
}

fn fill<R, F>(set: &mut SegmentSet<f64>, n: usize, rng: &mut R, mut line: F) -> Result<()>
where
    R: Rng,
    F: FnMut(&mut R) -> Line<f64>,
{
    while set.len() < n {
        let segment = draw(rng, &mut line)?;
        set.add_segment(segment);
    }
    Ok(())
}

/// `n` segments with both end points uniform in `bounds`.
pub fn random_segments<R: Rng>(rng: &mut R, n: usize, bounds: Rect<f64>) -> Result<SegmentSet<f64>> {
    let mut set = SegmentSet::with_capacity(n);
    fill(&mut set, n, rng, |rng| uniform_line(rng, bounds))?;
    Ok(set)
}

/// `n` segments of the given length, see [`uniform_line_with_length`].
pub fn fixed_length_segments<R: Rng>(
    rng: &mut R,
    n: usize,
    length: f64,
    bounds: Rect<f64>,
) -> Result<SegmentSet<f64>> {
    let mut set = SegmentSet::with_capacity(n);
    fill(&mut set, n, rng, |rng| uniform_line_with_length(rng, bounds, length))?;
    Ok(set)
}

/// The diagonals of the box spanning `lo..hi` (as fractions of
/// `bounds`); they cross at its center.
fn crossing_pair(bounds: Rect<f64>, lo: f64, hi: f64) -> Result<[Segment<f64>; 2]> {
    let min = bounds.min();
    let dims = bounds.max() - min;
    let at = |fx: f64, fy: f64| Coordinate {
        x: min.x + dims.x * fx,
        y: min.y + dims.y * fy,
    };
    Ok([
        Segment::new(at(lo, lo), at(hi, hi))?,
        Segment::new(at(lo, hi), at(hi, lo))?,
    ])
}

fn crosses_any(set: &SegmentSet<f64>, segment: &Segment<f64>) -> bool {
    set.iter().any(|s| s.intersects(segment))
}

/// A set with a known crossing.
///
/// First up to `k` pairwise disjoint uniform segments are drawn. If no
/// disjoint segment is found within [`MAX_ATTEMPTS`], a short segment
/// (a thousandth of the bounds) is placed at a random point instead.
/// Then, if `n > k`, two segments crossing at the center of `bounds`
/// are added, followed by uniform segments until the set has `n`.
pub fn controlled_segments<R: Rng>(
    rng: &mut R,
    n: usize,
    k: usize,
    bounds: Rect<f64>,
) -> Result<SegmentSet<f64>> {
    let mut set = SegmentSet::with_capacity(n.max(k));
    let dims = bounds.max() - bounds.min();

    for _ in 0..k {
        let mut disjoint = None;
        for _ in 0..MAX_ATTEMPTS {
            let segment = draw(rng, |rng| uniform_line(rng, bounds))?;
            if !crosses_any(&set, &segment) {
                disjoint = Some(segment);
                break;
            }
        }
        let segment = match disjoint {
            Some(segment) => segment,
            None => {
                let start = uniform_point(rng, bounds);
                let end = Coordinate {
                    x: start.x + dims.x * 1e-3,
                    y: start.y + dims.y * 1e-3,
                };
                Segment::new(start, end)?
            }
        };
        set.add_segment(segment);
    }

    if n > k {
        for segment in crossing_pair(bounds, 0.3, 0.7)? {
            set.add_segment(segment);
        }
        fill(&mut set, n, rng, |rng| uniform_line(rng, bounds))?;
    }
    debug!("generated {} controlled segments", set.len());
    Ok(set)
}

/// Fixed length version of [`controlled_segments`].
///
/// The disjoint segments must also lie within `bounds`; a slot for
/// which no such segment is found is left out rather than filled.
pub fn controlled_fixed_length_segments<R: Rng>(
    rng: &mut R,
    n: usize,
    k: usize,
    length: f64,
    bounds: Rect<f64>,
) -> Result<SegmentSet<f64>> {
    let mut set = SegmentSet::with_capacity(n.max(k));
    let inside = |c: Coordinate<f64>| {
        c.x >= bounds.min().x && c.x <= bounds.max().x && c.y >= bounds.min().y && c.y <= bounds.max().y
    };

    for _ in 0..k {
        for _ in 0..MAX_ATTEMPTS {
            let segment = draw(rng, |rng| uniform_line_with_length(rng, bounds, length))?;
            if inside(segment.begin()) && inside(segment.end()) && !crosses_any(&set, &segment) {
                set.add_segment(segment);
                break;
            }
        }
    }

    if n > k {
        for segment in crossing_pair(bounds, 0.4, 0.6)? {
            set.add_segment(segment);
        }
        fill(&mut set, n, rng, |rng| uniform_line_with_length(rng, bounds, length))?;
    }
    debug!("generated {} controlled fixed length segments", set.len());
    Ok(set)
}
