//! The viewport controller: one zoomable viewer and its tracks.
//!
//! A `Viewer` owns its scale and visible range. Local gestures rescale it,
//! move every track, and publish the transform on the bus; transforms and
//! selections arriving from sibling viewers are applied the same way without
//! being published again.

use crossbeam::channel::Receiver;
use tracklane_protocol::{
    BoardEvent, LocationView, Rect, Region, RegionLimits, RenderCommand, ScaleTransform, Selection,
    ThemeToken, ViewerId, ZoomTransform,
};

use crate::bus::{Bus, EventSink};
use crate::scale::{LinearScale, clamp_domain};
use crate::tracks::{TrackCollection, TrackRenderer};
use crate::zoom::{DEFAULT_SCALE_EXTENT, ZoomGesture};

pub const DEFAULT_WIDTH: f64 = 920.0;
pub const DEFAULT_PADDING: f64 = 10.0;

/// Where a transform or selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A gesture on this viewer. Published to the bus.
    Local,
    /// Relayed from a sibling viewer. Never published again.
    Echo,
}

pub struct Viewer {
    id: ViewerId,
    width: f64,
    padding: f64,
    view: LocationView,
    limits: RegionLimits,
    scale: LinearScale,
    gesture: ZoomGesture,
    selection: Selection,
    tracks: TrackCollection,
    board_height: f64,
    started: bool,
    sink: Box<dyn EventSink>,
    inbox: Receiver<BoardEvent>,
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("id", &self.id)
            .field("view", &self.view)
            .field("domain", &self.scale.domain())
            .field("selection", &self.selection)
            .field("tracks", &self.tracks.len())
            .finish_non_exhaustive()
    }
}

impl Viewer {
    /// Viewer linked to every other viewer on `bus`.
    pub fn new(id: impl Into<ViewerId>, bus: &Bus) -> Self {
        let inbox = bus.subscribe();
        Self::with_channels(id, Box::new(bus.clone()), inbox)
    }

    /// Viewer publishing into `sink` and pumping events from `inbox`.
    pub fn with_channels(
        id: impl Into<ViewerId>,
        sink: Box<dyn EventSink>,
        inbox: Receiver<BoardEvent>,
    ) -> Self {
        let id = id.into();
        let limits = RegionLimits::default();
        let view = LocationView::new(limits.min, limits.max);
        Self {
            selection: Selection::cleared(id.clone()),
            id,
            width: DEFAULT_WIDTH,
            padding: DEFAULT_PADDING,
            view,
            limits,
            scale: LinearScale::for_view(view, DEFAULT_WIDTH, DEFAULT_PADDING),
            gesture: ZoomGesture::new(DEFAULT_SCALE_EXTENT),
            tracks: TrackCollection::new(),
            board_height: 0.0,
            started: false,
            sink,
            inbox,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_limits(mut self, limits: RegionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_zoom_extent(mut self, extent: (f64, f64)) -> Self {
        self.gesture.set_extent(extent);
        self
    }

    pub fn add_track(&mut self, track: Box<dyn TrackRenderer>) {
        self.tracks.push(track);
    }

    pub fn id(&self) -> &ViewerId {
        &self.id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn location(&self) -> LocationView {
        self.view
    }

    pub fn limits(&self) -> &RegionLimits {
        &self.limits
    }

    pub fn scale(&self) -> &LinearScale {
        &self.scale
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tracks(&self) -> &TrackCollection {
        &self.tracks
    }

    pub fn board_height(&self) -> f64 {
        self.board_height
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Set the visible range. Takes effect on `start` or `update`.
    pub fn set_range(&mut self, from: f64, to: f64) {
        self.view = LocationView::new(from, to);
    }

    /// Build the scale and attach every track.
    pub fn start(&mut self) {
        self.limits.clamp_max_zoom();
        if self.view.span() < self.limits.min_zoom {
            let to = self.view.from + self.limits.min_zoom;
            self.view.to = to.min(self.limits.max);
            log::trace!("{}: view widened to {:?}", self.id, self.view);
        }
        self.scale = LinearScale::for_view(self.view, self.width, self.padding);
        self.gesture.reset();
        self.tracks.init_all(self.width, &self.scale);
        self.board_height = self.tracks.board_height();
        self.tracks.update_all(self.view, &self.scale);
        self.started = true;
        log::debug!(
            "{}: started on [{}, {}] with {} tracks",
            self.id,
            self.view.from,
            self.view.to,
            self.tracks.len()
        );
    }

    /// Push the current range to every track.
    pub fn update(&mut self) {
        self.tracks.update_all(self.view, &self.scale);
    }

    /// Rescale by `transform` and move every track.
    ///
    /// Returns `false` when nothing changed: identity transforms and
    /// transforms resolving to an unusable domain are ignored.
    pub fn apply_transform(&mut self, transform: ZoomTransform, origin: Origin) -> bool {
        if transform.is_identity() {
            log::trace!("{}: identity transform ignored", self.id);
            return false;
        }
        let rescaled = self.scale.rescale_x(&transform);
        let (d0, d1) = clamp_domain(rescaled.domain(), &self.limits);
        self.gesture.reset();
        if !(d0.is_finite() && d1.is_finite() && d0 < d1) {
            log::trace!("{}: transform {transform:?} gives empty domain", self.id);
            return false;
        }
        self.scale = self.scale.with_domain((d0, d1));
        self.tracks.move_all(&self.scale);

        if origin == Origin::Local {
            self.sink.publish(BoardEvent::Scale(ScaleTransform {
                transform,
                viewer_id: self.id.clone(),
            }));
        }
        true
    }

    /// Apply a sibling's transform. Own transforms are skipped.
    pub fn receive_transform(&mut self, event: &ScaleTransform) -> bool {
        if self.id.is_origin_of(&event.viewer_id) {
            return false;
        }
        log::debug!("{}: echo transform from {}", self.id, event.viewer_id);
        self.apply_transform(event.transform, Origin::Echo)
    }

    /// Select `[begin, end]`, or clear with `(None, None)`.
    ///
    /// Any other combination, including non-finite bounds, keeps the current
    /// selection and redraws it.
    pub fn highlight_region(&mut self, begin: Option<f64>, end: Option<f64>, origin: Origin) {
        let selection = Selection {
            begin,
            end,
            ..Selection::cleared(self.id.clone())
        };
        self.select(selection, origin);
    }

    /// Select a region with gaps.
    pub fn highlight(&mut self, region: &Region, origin: Origin) {
        self.select(Selection::from_region(region, self.id.clone()), origin);
    }

    /// Apply a sibling's selection. Own selections are skipped.
    pub fn receive_selection(&mut self, selection: &Selection) -> bool {
        if self.id.is_origin_of(&selection.viewer_id) {
            return false;
        }
        log::debug!("{}: echo selection from {}", self.id, selection.viewer_id);
        self.select(selection.clone(), Origin::Echo);
        true
    }

    fn select(&mut self, selection: Selection, origin: Origin) {
        let well_formed = match (selection.begin, selection.end) {
            (Some(begin), Some(end)) => begin.is_finite() && end.is_finite(),
            (None, None) => true,
            _ => false,
        };
        if well_formed {
            self.selection = selection;
        } else {
            log::warn!(
                "{}: malformed selection {:?}..{:?}, keeping previous",
                self.id,
                selection.begin,
                selection.end
            );
        }
        let region = self.selection.region();
        self.tracks.highlight_all(region.as_ref(), &self.scale);

        if well_formed && origin == Origin::Local {
            self.sink
                .publish(BoardEvent::Selection(self.selection.clone()));
        }
    }

    /// Adopt the scale's domain, truncated to whole positions, as the
    /// visible range and update every track.
    pub fn resync(&mut self) {
        let (d0, d1) = self.scale.domain();
        let from = d0.trunc();
        let to = d1.trunc().max(from + 1.0);
        self.view = LocationView::new(from, to);
        self.update();
    }

    /// Clear the selection unless a gesture is in flight.
    pub fn double_click(&mut self) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        self.highlight_region(None, None, Origin::Local);
        true
    }

    /// Zoom by `factor` around pixel `at_px`.
    pub fn zoom_at(&mut self, at_px: f64, factor: f64) -> bool {
        let transform = self.gesture.wheel(at_px, factor);
        self.apply_transform(transform, Origin::Local)
    }

    /// Pan by `dx` pixels; positive values move the content right.
    pub fn pan_by(&mut self, dx: f64) -> bool {
        let transform = self.gesture.drag(dx);
        self.apply_transform(transform, Origin::Local)
    }

    /// Deliver every queued bus event. Returns how many were applied; the
    /// viewer's own events are skipped.
    pub fn pump(&mut self) -> usize {
        let events: Vec<BoardEvent> = self.inbox.try_iter().collect();
        let mut applied = 0;
        for event in &events {
            let changed = match event {
                BoardEvent::Scale(transform) => self.receive_transform(transform),
                BoardEvent::Selection(selection) => self.receive_selection(selection),
            };
            if changed {
                applied += 1;
            }
        }
        applied
    }

    /// The viewer's tracks on their background pane, clipped to the pane.
    pub fn render(&self) -> Vec<RenderCommand> {
        let pane = Rect::new(0.0, 0.0, self.width, self.board_height);
        let mut commands = vec![
            RenderCommand::BeginGroup {
                id: self.id.to_string(),
                label: None,
            },
            RenderCommand::DrawRect {
                rect: pane,
                color: ThemeToken::TrackBackground,
                border_color: None,
                label: None,
                opacity: 1.0,
            },
            RenderCommand::SetClip { rect: pane },
        ];
        commands.extend(self.tracks.commands());
        commands.push(RenderCommand::ClearClip);
        commands.push(RenderCommand::EndGroup);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::testing::{Call, RecordingTrack};

    fn viewer(id: &str, bus: &Bus) -> Viewer {
        let mut viewer = Viewer::new(id, bus);
        viewer.set_range(1.0, 500.0);
        viewer
    }

    #[test]
    fn start_maps_range_onto_padded_width() {
        let bus = Bus::new();
        let mut viewer = viewer("a", &bus);
        viewer.start();
        assert!((viewer.scale().apply(1.0) - 10.0).abs() < 1e-9);
        assert!((viewer.scale().apply(500.0) - 910.0).abs() < 1e-9);
    }

    #[test]
    fn start_widens_narrow_view_to_min_zoom() {
        let bus = Bus::new();
        let (track, calls) = RecordingTrack::new(40.0);
        let mut viewer = Viewer::new("a", &bus);
        viewer.add_track(Box::new(track));
        viewer.set_range(1.0, 5.0);
        viewer.start();

        let expected = LocationView::new(1.0, 21.0);
        assert_eq!(viewer.location(), expected);
        assert_eq!(viewer.scale().domain(), (1.0, 21.0));
        assert_eq!(viewer.board_height(), 40.0);
        assert_eq!(
            calls.borrow().as_slice(),
            &[
                Call::Init {
                    width: 920.0,
                    y: 0.0
                },
                Call::Update(expected)
            ]
        );
    }

    #[test]
    fn start_widening_stops_at_max() {
        let bus = Bus::new();
        let mut viewer = Viewer::new("a", &bus).with_limits(RegionLimits {
            max: 30.0,
            min: 0.0,
            max_zoom: 1_000.0,
            min_zoom: 20.0,
        });
        viewer.set_range(25.0, 28.0);
        viewer.start();
        assert_eq!(viewer.location(), LocationView::new(25.0, 30.0));
        assert_eq!(viewer.limits().max_zoom, 30.0);
    }

    #[test]
    fn identity_transform_is_a_no_op() {
        let bus = Bus::new();
        let observer = bus.subscribe();
        let (track, calls) = RecordingTrack::new(40.0);
        let mut viewer = viewer("a", &bus);
        viewer.add_track(Box::new(track));
        viewer.start();
        let before = calls.borrow().len();

        assert!(!viewer.apply_transform(ZoomTransform::identity(), Origin::Local));
        assert_eq!(viewer.scale().domain(), (1.0, 500.0));
        assert_eq!(viewer.location(), LocationView::new(1.0, 500.0));
        assert_eq!(calls.borrow().len(), before);
        assert!(observer.try_recv().is_err());
    }

    #[test]
    fn linked_viewers_do_not_rebroadcast() {
        let bus = Bus::new();
        let observer = bus.subscribe();
        let (track, b_calls) = RecordingTrack::new(40.0);
        let mut a = viewer("a", &bus);
        let mut b = viewer("b", &bus);
        b.add_track(Box::new(track));
        a.start();
        b.start();
        b_calls.borrow_mut().clear();

        assert!(a.zoom_at(460.0, 2.0));
        assert_eq!(observer.try_iter().count(), 1);

        assert_eq!(b.pump(), 1);
        assert_eq!(a.pump(), 0);
        assert!(observer.try_recv().is_err());

        let moves = b_calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Move(_)))
            .count();
        assert_eq!(moves, 1);
        let (a0, a1) = a.scale().domain();
        let (b0, b1) = b.scale().domain();
        assert!((a0 - b0).abs() < 1e-9 && (a1 - b1).abs() < 1e-9);
        assert!(a1 - a0 < 499.0);
    }

    #[test]
    fn zoom_never_narrower_than_min_zoom() {
        let bus = Bus::new();
        let mut viewer = viewer("a", &bus);
        viewer.start();
        for _ in 0..10 {
            viewer.zoom_at(460.0, 20.0);
        }
        let (d0, d1) = viewer.scale().domain();
        assert!((d1 - d0 - 20.0).abs() < 1e-6);
        assert!(d0 >= viewer.limits().min);
    }

    #[test]
    fn pan_stays_inside_limits() {
        let bus = Bus::new();
        let mut viewer = viewer("a", &bus).with_limits(RegionLimits {
            max: 501.5,
            min: -1.5,
            max_zoom: 1_000_000.0,
            min_zoom: 20.0,
        });
        viewer.start();
        viewer.zoom_at(460.0, 4.0);
        viewer.pan_by(10_000.0);
        let (d0, _) = viewer.scale().domain();
        assert!((d0 - -1.5).abs() < 1e-9);
    }

    #[test]
    fn malformed_selection_keeps_previous() {
        let bus = Bus::new();
        let observer = bus.subscribe();
        let (track, calls) = RecordingTrack::new(40.0);
        let mut viewer = viewer("a", &bus);
        viewer.add_track(Box::new(track));
        viewer.start();

        viewer.highlight_region(Some(10.0), Some(20.0), Origin::Local);
        viewer.highlight_region(Some(5.0), None, Origin::Local);
        viewer.highlight_region(Some(f64::NAN), Some(3.0), Origin::Local);

        assert_eq!(viewer.selection().begin, Some(10.0));
        assert_eq!(viewer.selection().end, Some(20.0));
        assert_eq!(observer.try_iter().count(), 1);
        let highlights: Vec<Call> = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Highlight(_)))
            .cloned()
            .collect();
        assert_eq!(highlights.len(), 3);
        assert!(
            highlights
                .iter()
                .all(|c| *c == Call::Highlight(Some(Region::new(10.0, 20.0))))
        );
    }

    #[test]
    fn clearing_selection_reaches_tracks_and_bus() {
        let bus = Bus::new();
        let observer = bus.subscribe();
        let (track, calls) = RecordingTrack::new(40.0);
        let mut viewer = viewer("a", &bus);
        viewer.add_track(Box::new(track));
        viewer.start();
        viewer.highlight_region(Some(10.0), Some(20.0), Origin::Local);

        assert!(viewer.double_click());
        assert!(viewer.selection().is_cleared());
        assert_eq!(calls.borrow().last(), Some(&Call::Highlight(None)));
        let events: Vec<BoardEvent> = observer.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], BoardEvent::Selection(s) if s.is_cleared()));
    }

    #[test]
    fn selection_echo_applies_without_publishing() {
        let bus = Bus::new();
        let mut a = viewer("a", &bus);
        let mut b = viewer("b", &bus);
        a.start();
        b.start();
        let region = Region::new(10.0, 50.0).with_gaps(vec![tracklane_protocol::Gap {
            begin: 20.0,
            end: 30.0,
        }]);
        a.highlight(&region, Origin::Local);

        let observer = bus.subscribe();
        assert_eq!(b.pump(), 1);
        assert_eq!(b.selection().region(), Some(region));
        assert!(observer.try_recv().is_err());

        // A viewer ignores selections tagged with its own id.
        let own = Selection::cleared(b.id().clone());
        assert!(!b.receive_selection(&own));
        assert!(!b.selection().is_cleared());
    }

    #[test]
    fn pump_counts_only_sibling_events() {
        let bus = Bus::new();
        let mut a = viewer("a", &bus);
        let mut b = viewer("b", &bus);
        a.start();
        b.start();

        assert!(a.zoom_at(200.0, 2.0));
        a.highlight_region(Some(40.0), Some(60.0), Origin::Local);
        assert!(b.pan_by(30.0));
        b.highlight_region(Some(70.0), Some(75.0), Origin::Local);

        // Two from `a` applied, two of its own skipped.
        assert_eq!(b.pump(), 2);
        assert_eq!(b.selection().begin, Some(40.0));
        assert_eq!(a.pump(), 2);
        assert_eq!(a.selection().begin, Some(70.0));
        assert_eq!(b.pump(), 0);
    }

    #[test]
    fn resync_truncates_domain() {
        let bus = Bus::new();
        let (track, calls) = RecordingTrack::new(40.0);
        let mut viewer = viewer("a", &bus);
        viewer.add_track(Box::new(track));
        viewer.start();
        viewer.zoom_at(300.0, 3.0);
        let (d0, d1) = viewer.scale().domain();

        viewer.resync();
        let view = LocationView::new(d0.trunc(), d1.trunc());
        assert_eq!(viewer.location(), view);
        assert_eq!(calls.borrow().last(), Some(&Call::Update(view)));
    }

    #[test]
    fn render_wraps_tracks_in_viewer_group() {
        let bus = Bus::new();
        let mut viewer = viewer("a", &bus);
        viewer.add_track(Box::new(crate::tracks::AxisTrack::new("axis")));
        viewer.start();
        let cmds = viewer.render();
        assert!(matches!(&cmds[0], RenderCommand::BeginGroup { id, .. } if id == "a"));
        assert!(matches!(
            &cmds[1],
            RenderCommand::DrawRect { rect, .. } if rect.h == viewer.board_height()
        ));
        assert_eq!(cmds.last(), Some(&RenderCommand::EndGroup));
    }
}
