//! Vertical stacking of tracks and selection-highlight geometry.

use tracklane_protocol::{Rect, Region, RenderCommand, ThemeToken};

use crate::scale::LinearScale;

/// Highlights never get narrower than this, so single positions and
/// boundary markers stay visible and clickable at any zoom.
pub const MIN_HIGHLIGHT_WIDTH: f64 = 2.0;

const HIGHLIGHT_OPACITY: f32 = 0.75;

/// Running vertical offset of the tracks registered on one viewer.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    position: f64,
    heights: Vec<f64>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot of `height` pixels below the previous one and return
    /// its y offset. Overlaid tracks share one slot through `CompositeTrack`.
    pub fn stack_track(&mut self, height: f64) -> f64 {
        let y = self.position;
        self.position += height;
        self.heights.push(height);
        y
    }

    /// Forget every slot; used when all tracks are rebuilt.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.heights.clear();
    }

    pub fn board_height(&self) -> f64 {
        self.heights.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// A highlighted run of logical positions, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub begin: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(begin: f64, end: f64) -> Self {
        Self { begin, end }
    }
}

/// Split a region into the segments that get a rectangle each.
///
/// An empty region becomes two zero-length markers; gaps cut the region into
/// `gaps.len() + 1` pieces.
pub fn highlight_segments(region: &Region) -> Vec<Segment> {
    if region.is_empty {
        return vec![
            Segment::new(region.begin, region.begin),
            Segment::new(region.end, region.end),
        ];
    }
    if region.gaps.is_empty() {
        return vec![Segment::new(region.begin, region.end)];
    }
    let mut segments = Vec::with_capacity(region.gaps.len() + 1);
    let mut cursor = region.begin;
    for gap in &region.gaps {
        segments.push(Segment::new(cursor, gap.begin));
        cursor = gap.end;
    }
    segments.push(Segment::new(cursor, region.end));
    segments
}

/// Pixel rectangle covering `segment` from half a position before its begin
/// to half a position after its end.
pub fn segment_rect(segment: Segment, scale: &LinearScale, height: f64) -> Rect {
    let x = scale.apply(segment.begin - 0.5);
    let w = (scale.apply(segment.end + 0.5) - x).max(MIN_HIGHLIGHT_WIDTH);
    Rect::new(x, 0.0, w, height)
}

/// What a `HighlightLayer::render` call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightDiff {
    pub entered: usize,
    pub exited: usize,
}

/// The highlight rectangles of one track, keyed by segment.
#[derive(Debug, Clone, Default)]
pub struct HighlightLayer {
    rects: Vec<(Segment, Rect)>,
}

impl HighlightLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the drawn rectangles with those of `region`.
    ///
    /// Segments already on screen are kept, new ones enter and stale ones
    /// are dropped, so calling this twice with the same region is a no-op.
    pub fn render(&mut self, region: &Region, scale: &LinearScale, height: f64) -> HighlightDiff {
        let mut old: Vec<Option<Segment>> = self.rects.iter().map(|(s, _)| Some(*s)).collect();
        let mut diff = HighlightDiff::default();
        let mut next = Vec::new();
        for segment in highlight_segments(region) {
            match old.iter_mut().find(|s| **s == Some(segment)) {
                Some(slot) => *slot = None,
                None => diff.entered += 1,
            }
            next.push((segment, segment_rect(segment, scale, height)));
        }
        diff.exited = old.iter().filter(|s| s.is_some()).count();
        self.rects = next;
        diff
    }

    pub fn clear(&mut self) -> HighlightDiff {
        let exited = self.rects.len();
        self.rects.clear();
        HighlightDiff { entered: 0, exited }
    }

    /// Re-place the existing rectangles after a pan/zoom. Segment bounds are
    /// left untouched.
    pub fn move_highlight(&mut self, scale: &LinearScale) {
        for (segment, rect) in &mut self.rects {
            let moved = segment_rect(*segment, scale, rect.h);
            rect.x = moved.x;
            rect.w = moved.w;
        }
    }

    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter().map(|(_, r)| r)
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.rects
            .iter()
            .map(|(_, rect)| RenderCommand::DrawRect {
                rect: *rect,
                color: ThemeToken::SelectionHighlight,
                border_color: None,
                label: None,
                opacity: HIGHLIGHT_OPACITY,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracklane_protocol::{Gap, LocationView};

    fn scale() -> LinearScale {
        LinearScale::for_view(LocationView::new(1.0, 500.0), 920.0, 10.0)
    }

    #[test]
    fn stacks_tracks_in_order() {
        let mut layout = Layout::new();
        assert_eq!(layout.stack_track(40.0), 0.0);
        assert_eq!(layout.stack_track(20.0), 40.0);
        assert_eq!(layout.stack_track(10.0), 60.0);
        assert_eq!(layout.board_height(), 70.0);
        assert_eq!(layout.len(), 3);
        layout.reset();
        assert!(layout.is_empty());
        assert_eq!(layout.stack_track(40.0), 0.0);
    }

    #[test]
    fn gaps_split_the_region() {
        let region = Region::new(10.0, 50.0).with_gaps(vec![Gap {
            begin: 20.0,
            end: 30.0,
        }]);
        let segments = highlight_segments(&region);
        assert_eq!(
            segments,
            vec![Segment::new(10.0, 20.0), Segment::new(30.0, 50.0)]
        );
    }

    #[test]
    fn several_gaps_give_one_more_segment() {
        let gaps = vec![
            Gap {
                begin: 20.0,
                end: 25.0,
            },
            Gap {
                begin: 30.0,
                end: 35.0,
            },
            Gap {
                begin: 40.0,
                end: 41.0,
            },
        ];
        let region = Region::new(10.0, 50.0).with_gaps(gaps);
        let segments = highlight_segments(&region);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3], Segment::new(41.0, 50.0));
    }

    #[test]
    fn empty_region_draws_two_markers() {
        let region = Region {
            is_empty: true,
            ..Region::new(12.0, 13.0)
        };
        assert_eq!(
            highlight_segments(&region),
            vec![Segment::new(12.0, 12.0), Segment::new(13.0, 13.0)]
        );
    }

    #[test]
    fn width_never_below_minimum() {
        let wide = LinearScale::for_view(LocationView::new(0.0, 100_000.0), 920.0, 10.0);
        let rect = segment_rect(Segment::new(50.0, 50.0), &wide, 20.0);
        assert_eq!(rect.w, MIN_HIGHLIGHT_WIDTH);

        let rect = segment_rect(Segment::new(10.0, 50.0), &scale(), 20.0);
        let expected = scale().apply(50.5) - scale().apply(9.5);
        assert!((rect.w - expected).abs() < 1e-9);
        assert!(rect.w > MIN_HIGHLIGHT_WIDTH);
    }

    #[test]
    fn render_is_idempotent() {
        let mut layer = HighlightLayer::new();
        let region = Region::new(10.0, 50.0).with_gaps(vec![Gap {
            begin: 20.0,
            end: 30.0,
        }]);
        let first = layer.render(&region, &scale(), 40.0);
        assert_eq!(first, HighlightDiff { entered: 2, exited: 0 });
        let before: Vec<Rect> = layer.rects().copied().collect();

        let second = layer.render(&region, &scale(), 40.0);
        assert_eq!(second, HighlightDiff::default());
        let after: Vec<Rect> = layer.rects().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn stale_segments_are_removed() {
        let mut layer = HighlightLayer::new();
        let gapped = Region::new(10.0, 50.0).with_gaps(vec![Gap {
            begin: 20.0,
            end: 30.0,
        }]);
        layer.render(&gapped, &scale(), 40.0);
        let diff = layer.render(&Region::new(10.0, 20.0), &scale(), 40.0);
        assert_eq!(diff, HighlightDiff { entered: 0, exited: 1 });
        assert_eq!(layer.commands().len(), 1);
        assert_eq!(layer.clear().exited, 1);
        assert!(layer.is_empty());
    }

    #[test]
    fn move_only_touches_x_and_width() {
        let mut layer = HighlightLayer::new();
        layer.render(&Region::new(100.0, 110.0), &scale(), 40.0);
        let zoomed = scale().with_domain((90.0, 130.0));
        layer.move_highlight(&zoomed);
        let rect = layer.rects().next().copied();
        let expected = segment_rect(Segment::new(100.0, 110.0), &zoomed, 40.0);
        assert_eq!(rect, Some(expected));
    }
}
