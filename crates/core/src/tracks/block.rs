use tracklane_protocol::{LocationView, Rect, Region, RenderCommand, ThemeToken, TrackDataElement};

use crate::layout::{HighlightLayer, Segment, segment_rect};
use crate::scale::LinearScale;

use super::{TrackRenderer, apply_highlight, lane_commands};

const BLOCK_PADDING: f64 = 4.0;
const MIN_LABEL_WIDTH: f64 = 30.0;

/// Features spanning `[begin, end]` drawn as labelled rectangles.
///
/// Elements are expected not to overlap; `split_non_overlapping` produces
/// such rows from arbitrary feature lists.
#[derive(Debug)]
pub struct BlockTrack {
    id: String,
    height: f64,
    data: Vec<TrackDataElement>,
    visible: Vec<usize>,
    rects: Vec<Rect>,
    width: f64,
    y_offset: f64,
    highlight: HighlightLayer,
}

impl BlockTrack {
    pub fn new(id: impl Into<String>, height: f64) -> Self {
        Self {
            id: id.into(),
            height,
            data: Vec::new(),
            visible: Vec::new(),
            rects: Vec::new(),
            width: 0.0,
            y_offset: 0.0,
            highlight: HighlightLayer::new(),
        }
    }

    pub fn load(&mut self, mut data: Vec<TrackDataElement>) {
        data.sort_by(|a, b| a.begin.total_cmp(&b.begin));
        self.data = data;
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

impl TrackRenderer for BlockTrack {
    fn init(&mut self, width: f64, y_offset: f64, scale: &LinearScale) {
        self.width = width;
        self.y_offset = y_offset;
        self.move_to(scale);
    }

    fn update(&mut self, view: LocationView, scale: &LinearScale) {
        self.visible = self
            .data
            .iter()
            .enumerate()
            .filter(|(_, el)| el.last() >= view.from && el.begin <= view.to)
            .map(|(i, _)| i)
            .collect();
        self.move_to(scale);
    }

    fn move_to(&mut self, scale: &LinearScale) {
        let h = (self.height - 2.0 * BLOCK_PADDING).max(1.0);
        self.rects = self
            .visible
            .iter()
            .map(|&i| {
                let el = &self.data[i];
                let rect = segment_rect(Segment::new(el.begin, el.last()), scale, h);
                Rect::new(rect.x, BLOCK_PADDING, rect.w, h)
            })
            .collect();
        self.highlight.move_highlight(scale);
    }

    fn highlight_region(&mut self, region: Option<&Region>, scale: &LinearScale) {
        apply_highlight(&mut self.highlight, region, scale, self.height);
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn commands(&self) -> Vec<RenderCommand> {
        let content = self
            .visible
            .iter()
            .zip(&self.rects)
            .filter(|(_, rect)| rect.right() >= 0.0 && rect.x <= self.width)
            .map(|(&i, rect)| RenderCommand::DrawRect {
                rect: *rect,
                color: ThemeToken::BlockFill,
                border_color: Some(ThemeToken::BlockBorder),
                label: self.data[i]
                    .title
                    .clone()
                    .filter(|_| rect.w >= MIN_LABEL_WIDTH),
                opacity: 1.0,
            })
            .collect();
        lane_commands(
            &self.id,
            self.y_offset,
            self.width,
            self.height,
            &self.highlight,
            content,
        )
    }
}

/// Distribute features into rows such that no two features in a row
/// overlap. Features keep their relative order inside each row; each row is
/// filled greedily before a new one is opened.
pub fn split_non_overlapping(mut data: Vec<TrackDataElement>) -> Vec<Vec<TrackDataElement>> {
    data.sort_by(|a, b| a.begin.total_cmp(&b.begin));
    let mut rows: Vec<Vec<TrackDataElement>> = Vec::new();
    for el in data {
        let slot = rows
            .iter_mut()
            .find(|row| row.last().is_none_or(|prev| prev.last() < el.begin));
        match slot {
            Some(row) => row.push(el),
            None => rows.push(vec![el]),
        }
    }
    rows
}
