//! Point reduction for area tracks.
//!
//! Large per-position series are downsampled with a bucketed largest-triangle
//! pass before they are turned into paths. Gradient displays first classify
//! every position into one series per color.

use serde::{Deserialize, Serialize};
use tracklane_protocol::{Color, ColorGradient, TrackDataElement};

/// How an area track is colored: one color, or one series per gradient bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayColor {
    Solid(Color),
    Gradient(ColorGradient),
}

/// A reduced point series together with the color it is drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredSeries {
    pub points: Vec<TrackDataElement>,
    pub color: Color,
}

/// Reduce `points` to at most `max_points` (never fewer than two), keeping
/// the first and last point.
///
/// The interior is cut into `max_points - 2` contiguous buckets. From each
/// bucket the point forming the largest triangle with the previously kept
/// point and the mean of the next bucket is retained.
pub fn largest_triangle(points: &[TrackDataElement], max_points: usize) -> Vec<TrackDataElement> {
    let budget = max_points.max(2);
    let n = points.len();
    if n <= budget {
        return points.to_vec();
    }

    let first = &points[0];
    let last = &points[n - 1];
    let interior = &points[1..n - 1];
    let buckets = budget - 2;

    let mut out = Vec::with_capacity(budget);
    out.push(first.clone());
    if buckets == 0 {
        out.push(last.clone());
        return out;
    }

    let size = interior.len() as f64 / buckets as f64;
    let bounds = |b: usize| -> (usize, usize) {
        let start = (b as f64 * size).floor() as usize;
        let end = if b + 1 == buckets {
            interior.len()
        } else {
            (((b + 1) as f64 * size).floor() as usize).min(interior.len())
        };
        (start, end.max(start + 1))
    };

    let mut previous = xy(first);
    for b in 0..buckets {
        let (start, end) = bounds(b);
        let next = if b + 1 < buckets {
            let (ns, ne) = bounds(b + 1);
            mean(&interior[ns..ne])
        } else {
            xy(last)
        };

        let mut best = start;
        let mut best_area = f64::NEG_INFINITY;
        for (i, p) in interior[start..end].iter().enumerate() {
            let area = triangle_area(previous, xy(p), next);
            if area > best_area {
                best_area = area;
                best = start + i;
            }
        }
        out.push(interior[best].clone());
        previous = xy(&interior[best]);
    }
    out.push(last.clone());
    out
}

fn xy(p: &TrackDataElement) -> (f64, f64) {
    (p.begin, p.value_or_zero())
}

fn mean(points: &[TrackDataElement]) -> (f64, f64) {
    let n = points.len().max(1) as f64;
    let (sx, sy) = points
        .iter()
        .map(xy)
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    (sx / n, sy / n)
}

fn triangle_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    ((a.0 - c.0) * (b.1 - a.1) - (a.0 - b.0) * (c.1 - a.1)).abs() * 0.5
}

/// Points whose position falls inside `[from, to]`.
pub fn visible_series(points: &[TrackDataElement], domain: (f64, f64)) -> Vec<TrackDataElement> {
    points
        .iter()
        .filter(|p| p.begin >= domain.0 && p.begin <= domain.1)
        .cloned()
        .collect()
}

/// Bin index of `value`: the number of thresholds it exceeds, capped at
/// `bins - 1`. With a single threshold this is `value > t ⇒ 1, else 0`.
pub fn classify(value: f64, thresholds: &[f64], bins: usize) -> usize {
    let above = thresholds.iter().filter(|t| value > **t).count();
    above.min(bins.saturating_sub(1))
}

/// Integer positions strictly inside the domain. Positions start at 1, so
/// the margin left of the sequence gets no filler.
fn domain_positions(domain: (f64, f64)) -> impl Iterator<Item = f64> {
    let first = (domain.0.floor() + 1.0).max(1.0);
    let last = domain.1;
    (0_u32..)
        .map(move |i| first + f64::from(i))
        .take_while(move |p| *p < last)
}

/// Split a series into one dense series per gradient color.
///
/// Every bin gets a zero-valued point at every integer position from 1
/// strictly inside `domain`; each input point then replaces the zero at its
/// position in the bin it classifies into (missing values count as zero).
/// Bins are downsampled independently and returned in reverse configured
/// order, so the first configured color is drawn last.
pub fn split_by_gradient(
    points: &[TrackDataElement],
    gradient: &ColorGradient,
    domain: (f64, f64),
    max_points: usize,
) -> Vec<ColoredSeries> {
    let bins = gradient.colors.len();
    if bins == 0 {
        return Vec::new();
    }

    let title = points.first().and_then(|p| p.title.clone());
    let positions: Vec<f64> = domain_positions(domain).collect();
    let Some(&first) = positions.first() else {
        return Vec::new();
    };

    let filler = |begin: f64| TrackDataElement {
        begin,
        end: None,
        value: Some(0.0),
        title: title.clone(),
    };
    let mut series: Vec<Vec<TrackDataElement>> = (0..bins)
        .map(|_| positions.iter().map(|&p| filler(p)).collect())
        .collect();

    for p in points {
        if p.begin <= domain.0 || p.begin >= domain.1 {
            continue;
        }
        let offset = p.begin.round() - first;
        if offset < 0.0 {
            continue;
        }
        let index = offset as usize;
        if index >= positions.len() {
            continue;
        }
        let value = p.value_or_zero();
        let bin = classify(value, &gradient.thresholds, bins);
        series[bin][index] = TrackDataElement {
            value: Some(value),
            ..p.clone()
        };
    }

    let mut out: Vec<ColoredSeries> = series
        .iter()
        .zip(&gradient.colors)
        .map(|(points, color)| ColoredSeries {
            points: largest_triangle(points, max_points),
            color: *color,
        })
        .collect();
    out.reverse();
    out
}

/// Reduce a track's data for the visible `domain` according to its display
/// color.
pub fn reduce(
    points: &[TrackDataElement],
    color: &DisplayColor,
    domain: (f64, f64),
    max_points: usize,
) -> Vec<ColoredSeries> {
    match color {
        DisplayColor::Solid(color) => vec![ColoredSeries {
            points: largest_triangle(&visible_series(points, domain), max_points),
            color: *color,
        }],
        DisplayColor::Gradient(gradient) => split_by_gradient(points, gradient, domain, max_points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<TrackDataElement> {
        (0..n)
            .map(|i| TrackDataElement::point(i as f64, (i as f64 * 0.05).sin() * 10.0))
            .collect()
    }

    fn two_bins() -> ColorGradient {
        ColorGradient {
            colors: vec![Color::rgb8(0, 0, 255), Color::rgb8(255, 0, 0)],
            thresholds: vec![5.0],
        }
    }

    #[test]
    fn downsample_respects_budget_and_endpoints() {
        let points = wave(10_000);
        let reduced = largest_triangle(&points, 500);
        assert!(reduced.len() <= 500);
        assert_eq!(reduced.first(), points.first());
        assert_eq!(reduced.last(), points.last());
    }

    #[test]
    fn downsample_keeps_order() {
        let reduced = largest_triangle(&wave(3_000), 100);
        assert!(reduced.windows(2).all(|w| w[0].begin < w[1].begin));
    }

    #[test]
    fn downsample_never_grows_or_drops_below_two() {
        let small = wave(40);
        assert_eq!(largest_triangle(&small, 500), small);
        let tiny = largest_triangle(&wave(100), 0);
        assert_eq!(tiny.len(), 2);
        assert_eq!(tiny[0].begin, 0.0);
        assert_eq!(tiny[1].begin, 99.0);
    }

    #[test]
    fn downsample_keeps_spikes() {
        let mut points: Vec<_> = (0..1_000)
            .map(|i| TrackDataElement::point(i as f64, 0.0))
            .collect();
        points[437].value = Some(100.0);
        let reduced = largest_triangle(&points, 50);
        assert!(reduced.iter().any(|p| p.begin == 437.0));
    }

    #[test]
    fn classify_two_bins() {
        assert_eq!(classify(10.0, &[5.0], 2), 1);
        assert_eq!(classify(3.0, &[5.0], 2), 0);
        assert_eq!(classify(5.0, &[5.0], 2), 0);
    }

    #[test]
    fn classify_many_thresholds_caps_at_last_bin() {
        assert_eq!(classify(7.0, &[1.0, 5.0, 9.0], 4), 2);
        assert_eq!(classify(70.0, &[1.0, 5.0, 9.0], 3), 2);
    }

    #[test]
    fn gradient_bins_span_domain() {
        let points = vec![
            TrackDataElement::point(3.0, 10.0),
            TrackDataElement::point(5.0, 3.0),
            TrackDataElement {
                begin: 7.0,
                end: None,
                value: None,
                title: None,
            },
        ];
        let series = split_by_gradient(&points, &two_bins(), (0.0, 11.0), 1_000);
        assert_eq!(series.len(), 2);
        // Positions 1..=10 in every bin.
        assert!(series.iter().all(|s| s.points.len() == 10));

        // Reverse configured order: the red (above-threshold) bin comes first.
        let high = &series[0];
        let low = &series[1];
        assert_eq!(high.color, Color::rgb8(255, 0, 0));
        assert_eq!(high.points[2].value, Some(10.0));
        assert_eq!(low.points[2].value, Some(0.0));
        assert_eq!(low.points[4].value, Some(3.0));
        assert_eq!(high.points[4].value, Some(0.0));
        assert_eq!(low.points[6].value, Some(0.0));

        let non_zero: usize = series
            .iter()
            .map(|s| s.points.iter().filter(|p| p.value_or_zero() != 0.0).count())
            .sum();
        assert_eq!(non_zero, 2);
    }

    #[test]
    fn gradient_fill_starts_at_first_position() {
        let points = vec![TrackDataElement::point(0.0, 9.0), TrackDataElement::point(2.0, 9.0)];
        let series = split_by_gradient(&points, &two_bins(), (-1.5, 6.0), 1_000);
        let begins: Vec<f64> = series[0].points.iter().map(|p| p.begin).collect();
        assert_eq!(begins, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        // The point at 0 lies in the margin and is not drawn.
        assert_eq!(series[0].points[1].value, Some(9.0));
        assert_eq!(series[0].points[0].value, Some(0.0));
    }

    #[test]
    fn gradient_downsamples_each_bin() {
        let points: Vec<_> = (1..5_000)
            .map(|i| TrackDataElement::point(i as f64, (i % 10) as f64))
            .collect();
        let series = split_by_gradient(&points, &two_bins(), (0.0, 5_000.0), 300);
        assert!(series.iter().all(|s| s.points.len() <= 300));
        assert!(series.iter().all(|s| s.points[0].begin == 1.0));
    }

    #[test]
    fn empty_gradient_yields_nothing() {
        let gradient = ColorGradient {
            colors: vec![],
            thresholds: vec![],
        };
        assert!(split_by_gradient(&wave(10), &gradient, (0.0, 10.0), 10).is_empty());
    }

    #[test]
    fn solid_reduce_filters_to_domain() {
        let color = DisplayColor::Solid(Color::rgb8(0, 0, 0));
        let series = reduce(&wave(100), &color, (10.0, 20.0), 1_000);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 11);
    }

    #[test]
    fn display_color_deserializes_either_form() {
        let solid: Option<DisplayColor> = serde_json::from_str("\"#ff0000\"").ok();
        assert_eq!(solid, Some(DisplayColor::Solid(Color::rgb8(255, 0, 0))));
        let gradient: Option<DisplayColor> =
            serde_json::from_str(r##"{"colors":["#0000ff","#ff0000"],"thresholds":[5]}"##).ok();
        assert_eq!(gradient, Some(DisplayColor::Gradient(two_bins())));
    }
}
