//! Track renderers and the ordered collection a viewer drives.

pub mod area;
pub mod axis;
pub mod block;
pub mod composite;

pub use area::AreaTrack;
pub use axis::AxisTrack;
pub use block::BlockTrack;
pub use composite::CompositeTrack;

use tracklane_protocol::{LocationView, Point, Region, RenderCommand, ThemeToken};

use crate::layout::{HighlightLayer, Layout};
use crate::scale::LinearScale;

/// The calls a viewer makes on each of its tracks.
///
/// The viewer owns the scale; tracks only ever see it borrowed for the
/// duration of a call and keep whatever pixel geometry they derive from it.
pub trait TrackRenderer: std::fmt::Debug {
    /// Attach to a lane `width` pixels wide starting at `y_offset`.
    fn init(&mut self, width: f64, y_offset: f64, scale: &LinearScale);

    /// The visible range changed: recompute derived data, then geometry.
    fn update(&mut self, view: LocationView, scale: &LinearScale);

    /// The scale changed during a gesture: recompute pixel geometry only.
    fn move_to(&mut self, scale: &LinearScale);

    /// Draw (or with `None`, remove) the selection highlight.
    fn highlight_region(&mut self, region: Option<&Region>, scale: &LinearScale);

    fn height(&self) -> f64;

    /// Current drawing, in viewer pixel space.
    fn commands(&self) -> Vec<RenderCommand>;
}

/// Shared `highlight_region` behavior for tracks owning a `HighlightLayer`.
pub(crate) fn apply_highlight(
    layer: &mut HighlightLayer,
    region: Option<&Region>,
    scale: &LinearScale,
    height: f64,
) {
    let diff = match region {
        Some(region) => layer.render(region, scale, height),
        None => layer.clear(),
    };
    log::trace!(
        "highlight: {} entered, {} exited",
        diff.entered,
        diff.exited
    );
}

/// Wrap a track's content in its lane: group, vertical offset, highlight
/// underneath the content, and a bottom border.
pub(crate) fn lane_commands(
    id: &str,
    y_offset: f64,
    width: f64,
    height: f64,
    highlight: &HighlightLayer,
    content: Vec<RenderCommand>,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(content.len() + 8);
    commands.push(RenderCommand::BeginGroup {
        id: id.to_string(),
        label: None,
    });
    commands.push(RenderCommand::PushTransform {
        translate: Point::new(0.0, y_offset),
    });
    commands.extend(highlight.commands());
    commands.extend(content);
    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, height),
        to: Point::new(width, height),
        color: ThemeToken::TrackBorder,
        width: 0.5,
    });
    commands.push(RenderCommand::PopTransform);
    commands.push(RenderCommand::EndGroup);
    commands
}

/// Ordered, append-only list of tracks; insertion order is stacking order.
#[derive(Debug, Default)]
pub struct TrackCollection {
    tracks: Vec<Box<dyn TrackRenderer>>,
    layout: Layout,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Box<dyn TrackRenderer>) {
        self.tracks.push(track);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TrackRenderer> {
        self.tracks.iter().map(Box::as_ref)
    }

    /// Restack every track from the top and attach it to its lane.
    pub fn init_all(&mut self, width: f64, scale: &LinearScale) {
        self.layout.reset();
        for track in &mut self.tracks {
            let y = self.layout.stack_track(track.height());
            track.init(width, y, scale);
        }
    }

    pub fn update_all(&mut self, view: LocationView, scale: &LinearScale) {
        for track in &mut self.tracks {
            track.update(view, scale);
        }
    }

    pub fn move_all(&mut self, scale: &LinearScale) {
        for track in &mut self.tracks {
            track.move_to(scale);
        }
    }

    pub fn highlight_all(&mut self, region: Option<&Region>, scale: &LinearScale) {
        for track in &mut self.tracks {
            track.highlight_region(region, scale);
        }
    }

    /// Sum of the stacked heights; zero before `init_all`.
    pub fn board_height(&self) -> f64 {
        self.layout.board_height()
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.tracks.iter().flat_map(|t| t.commands()).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingTrack};
    use super::*;

    #[test]
    fn init_stacks_in_insertion_order() {
        let scale = LinearScale::new((0.0, 100.0), (10.0, 910.0));
        let (first, first_calls) = RecordingTrack::new(40.0);
        let (second, second_calls) = RecordingTrack::new(20.0);
        let mut tracks = TrackCollection::new();
        tracks.push(Box::new(first));
        tracks.push(Box::new(second));

        tracks.init_all(920.0, &scale);
        assert_eq!(
            first_calls.borrow().as_slice(),
            &[Call::Init {
                width: 920.0,
                y: 0.0
            }]
        );
        assert_eq!(
            second_calls.borrow().as_slice(),
            &[Call::Init {
                width: 920.0,
                y: 40.0
            }]
        );
        assert_eq!(tracks.board_height(), 60.0);

        // Re-initialising restacks from the top instead of accumulating.
        tracks.init_all(920.0, &scale);
        assert_eq!(tracks.board_height(), 60.0);
    }

    #[test]
    fn lifecycle_calls_reach_every_track() {
        let scale = LinearScale::new((0.0, 100.0), (10.0, 910.0));
        let (track, calls) = RecordingTrack::new(40.0);
        let mut tracks = TrackCollection::new();
        tracks.push(Box::new(track));
        tracks.update_all(LocationView::new(0.0, 100.0), &scale);
        tracks.move_all(&scale);
        tracks.highlight_all(None, &scale);
        assert_eq!(calls.borrow().len(), 3);
        assert_eq!(calls.borrow()[1], Call::Move((0.0, 100.0)));
    }
}
