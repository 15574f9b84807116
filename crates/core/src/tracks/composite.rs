use tracklane_protocol::{LocationView, Region, RenderCommand};

use crate::layout::HighlightLayer;
use crate::scale::LinearScale;

use super::{TrackRenderer, apply_highlight, lane_commands};

/// Several renderers overlaid in a single lane.
///
/// Children are attached at offset zero inside the lane and never see the
/// selection; the composite draws one highlight beneath all of them.
#[derive(Debug)]
pub struct CompositeTrack {
    id: String,
    children: Vec<Box<dyn TrackRenderer>>,
    width: f64,
    y_offset: f64,
    highlight: HighlightLayer,
}

impl CompositeTrack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            width: 0.0,
            y_offset: 0.0,
            highlight: HighlightLayer::new(),
        }
    }

    pub fn with_child(mut self, child: Box<dyn TrackRenderer>) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Box<dyn TrackRenderer>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl TrackRenderer for CompositeTrack {
    fn init(&mut self, width: f64, y_offset: f64, scale: &LinearScale) {
        self.width = width;
        self.y_offset = y_offset;
        for child in &mut self.children {
            child.init(width, 0.0, scale);
        }
        self.highlight.move_highlight(scale);
    }

    fn update(&mut self, view: LocationView, scale: &LinearScale) {
        for child in &mut self.children {
            child.update(view, scale);
        }
        self.highlight.move_highlight(scale);
    }

    fn move_to(&mut self, scale: &LinearScale) {
        for child in &mut self.children {
            child.move_to(scale);
        }
        self.highlight.move_highlight(scale);
    }

    fn highlight_region(&mut self, region: Option<&Region>, scale: &LinearScale) {
        let height = self.height();
        apply_highlight(&mut self.highlight, region, scale, height);
    }

    fn height(&self) -> f64 {
        self.children
            .iter()
            .map(|c| c.height())
            .fold(0.0, f64::max)
    }

    fn commands(&self) -> Vec<RenderCommand> {
        let content = self.children.iter().flat_map(|c| c.commands()).collect();
        lane_commands(
            &self.id,
            self.y_offset,
            self.width,
            self.height(),
            &self.highlight,
            content,
        )
    }
}
