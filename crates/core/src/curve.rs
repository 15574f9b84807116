//! Outline geometry for area paths.
//!
//! The cardinal curve uses zero tension and the basis curve is the uniform
//! cubic B-spline; both degrade to straight lines below three points.

use tracklane_protocol::{Interpolation, Point};

/// One piece of an outline, continuing from wherever the previous one ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathStep {
    Line(Point),
    /// Cubic Bézier: two control points, then the end point.
    Cubic(Point, Point, Point),
}

/// Steps joining `points` after the first one, which is where the outline
/// starts.
pub fn outline(points: &[Point], interpolation: Interpolation) -> Vec<PathStep> {
    if points.len() < 2 {
        return Vec::new();
    }
    match interpolation {
        Interpolation::Step => points
            .windows(2)
            .flat_map(|w| {
                [
                    PathStep::Line(Point::new(w[1].x, w[0].y)),
                    PathStep::Line(w[1]),
                ]
            })
            .collect(),
        Interpolation::Cardinal if points.len() > 2 => cardinal(points),
        Interpolation::Basis if points.len() > 2 => basis(points),
        _ => points[1..].iter().map(|p| PathStep::Line(*p)).collect(),
    }
}

fn cardinal(points: &[Point]) -> Vec<PathStep> {
    let n = points.len();
    (1..n)
        .map(|i| {
            let (from, to) = (points[i - 1], points[i]);
            let before = if i >= 2 { points[i - 2] } else { to };
            let after = if i + 1 < n { points[i + 1] } else { from };
            PathStep::Cubic(
                Point::new(
                    from.x + (to.x - before.x) / 6.0,
                    from.y + (to.y - before.y) / 6.0,
                ),
                Point::new(
                    to.x + (from.x - after.x) / 6.0,
                    to.y + (from.y - after.y) / 6.0,
                ),
                to,
            )
        })
        .collect()
}

fn basis_step(a: Point, b: Point, c: Point) -> PathStep {
    PathStep::Cubic(
        Point::new((2.0 * a.x + b.x) / 3.0, (2.0 * a.y + b.y) / 3.0),
        Point::new((a.x + 2.0 * b.x) / 3.0, (a.y + 2.0 * b.y) / 3.0),
        Point::new((a.x + 4.0 * b.x + c.x) / 6.0, (a.y + 4.0 * b.y + c.y) / 6.0),
    )
}

fn basis(points: &[Point]) -> Vec<PathStep> {
    let n = points.len();
    let (first, second) = (points[0], points[1]);
    let mut steps = Vec::with_capacity(n + 2);
    steps.push(PathStep::Line(Point::new(
        (5.0 * first.x + second.x) / 6.0,
        (5.0 * first.y + second.y) / 6.0,
    )));
    steps.extend(points.windows(3).map(|w| basis_step(w[0], w[1], w[2])));
    let last = points[n - 1];
    steps.push(basis_step(points[n - 2], last, last));
    steps.push(PathStep::Line(last));
    steps
}

/// The outline as a polyline, sampling each cubic at `samples` points.
pub fn flatten(points: &[Point], interpolation: Interpolation, samples: usize) -> Vec<Point> {
    let Some(&start) = points.first() else {
        return Vec::new();
    };
    let samples = samples.max(1);
    let mut out = vec![start];
    let mut current = start;
    for step in outline(points, interpolation) {
        match step {
            PathStep::Line(p) => {
                out.push(p);
                current = p;
            }
            PathStep::Cubic(c1, c2, end) => {
                for s in 1..=samples {
                    let t = s as f64 / samples as f64;
                    out.push(cubic_at(current, c1, c2, end, t));
                }
                current = end;
            }
        }
    }
    out
}

fn cubic_at(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}
