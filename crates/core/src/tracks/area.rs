use tracklane_protocol::{
    Interpolation, LocationView, Point, Region, RenderCommand, TextAlign, ThemeToken,
    TrackDataElement,
};

use crate::layout::HighlightLayer;
use crate::reduce::{ColoredSeries, DisplayColor, reduce};
use crate::scale::LinearScale;

use super::{TrackRenderer, apply_highlight, lane_commands};

pub const DEFAULT_MAX_POINTS: usize = 1000;

const LABEL_PADDING: f64 = 4.0;
const FONT_SIZE: f64 = 10.0;

/// Per-position values drawn as one or more filled areas.
///
/// Every `update` reduces the data for the new visible range into colored
/// series; `move_to` only re-projects those series into pixels.
#[derive(Debug)]
pub struct AreaTrack {
    id: String,
    title: Option<String>,
    height: f64,
    color: DisplayColor,
    interpolation: Interpolation,
    max_points: usize,
    value_domain: Option<(f64, f64)>,
    /// Value axis in use: `value_domain`, or `[0, max value]` of the data.
    value_range: (f64, f64),
    data: Vec<TrackDataElement>,
    series: Vec<ColoredSeries>,
    paths: Vec<Vec<Point>>,
    width: f64,
    y_offset: f64,
    highlight: HighlightLayer,
}

impl AreaTrack {
    pub fn new(id: impl Into<String>, height: f64, color: DisplayColor) -> Self {
        Self {
            id: id.into(),
            title: None,
            height,
            color,
            interpolation: Interpolation::default(),
            max_points: DEFAULT_MAX_POINTS,
            value_domain: None,
            value_range: (0.0, 1.0),
            data: Vec::new(),
            series: Vec::new(),
            paths: Vec::new(),
            width: 0.0,
            y_offset: 0.0,
            highlight: HighlightLayer::new(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Fix the value axis instead of deriving it from the data.
    pub fn with_value_domain(mut self, domain: Option<(f64, f64)>) -> Self {
        self.value_domain = domain;
        self.value_range = self.compute_value_range();
        self
    }

    /// Replace the track data. Takes effect on the next `update`.
    pub fn load(&mut self, mut data: Vec<TrackDataElement>) {
        data.sort_by(|a, b| a.begin.total_cmp(&b.begin));
        self.data = data;
        self.value_range = self.compute_value_range();
    }

    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    pub fn series(&self) -> &[ColoredSeries] {
        &self.series
    }

    fn compute_value_range(&self) -> (f64, f64) {
        if let Some(domain) = self.value_domain {
            return domain;
        }
        let max = self
            .data
            .iter()
            .filter_map(|p| p.value)
            .fold(0.0_f64, f64::max);
        (0.0, if max > 0.0 { max } else { 1.0 })
    }

    /// Value → pixel y inside the lane (0 at the top).
    fn value_y(&self, value: f64) -> f64 {
        let (lo, hi) = self.value_range;
        if hi <= lo {
            return self.height;
        }
        let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
        self.height - t * self.height
    }
}

impl TrackRenderer for AreaTrack {
    fn init(&mut self, width: f64, y_offset: f64, scale: &LinearScale) {
        self.width = width;
        self.y_offset = y_offset;
        self.move_to(scale);
    }

    fn update(&mut self, view: LocationView, scale: &LinearScale) {
        self.series = reduce(
            &self.data,
            &self.color,
            (view.from, view.to),
            self.max_points,
        );
        log::trace!(
            "{}: {} points reduced into {} series",
            self.id,
            self.data.len(),
            self.series.len()
        );
        self.move_to(scale);
    }

    fn move_to(&mut self, scale: &LinearScale) {
        self.paths = self
            .series
            .iter()
            .map(|s| {
                s.points
                    .iter()
                    .map(|p| Point::new(scale.apply(p.begin), self.value_y(p.value_or_zero())))
                    .collect()
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
        let baseline = self.value_y(0.0);
        let mut content: Vec<RenderCommand> = self
            .paths
            .iter()
            .zip(&self.series)
            .enumerate()
            .filter(|(_, (path, _))| !path.is_empty())
            .map(|(i, (path, series))| RenderCommand::FillArea {
                id: format!("{}-area-{i}", self.id),
                points: path.clone(),
                baseline,
                color: series.color,
                interpolation: self.interpolation,
            })
            .collect();

        if let Some(title) = &self.title {
            content.push(RenderCommand::DrawText {
                position: Point::new(LABEL_PADDING, FONT_SIZE + LABEL_PADDING),
                text: title.clone(),
                color: ThemeToken::TextMuted,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
            });
        }

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

#[cfg(test)]
mod tests {
    use super::*;
    use tracklane_protocol::{Color, ColorGradient};

    fn scale() -> LinearScale {
        LinearScale::for_view(LocationView::new(0.0, 100.0), 920.0, 10.0)
    }

    fn fill_areas(cmds: &[RenderCommand]) -> Vec<&Vec<Point>> {
        cmds.iter()
            .filter_map(|c| match c {
                RenderCommand::FillArea { points, .. } => Some(points),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn solid_area_projects_points() {
        let mut track = AreaTrack::new("hydropathy", 40.0, DisplayColor::Solid(Color::rgb8(0, 0, 0)));
        track.load(vec![
            TrackDataElement::point(50.0, 2.0),
            TrackDataElement::point(10.0, 4.0),
        ]);
        track.init(920.0, 0.0, &scale());
        track.update(LocationView::new(0.0, 100.0), &scale());

        let cmds = track.commands();
        let areas = fill_areas(&cmds);
        assert_eq!(areas.len(), 1);
        // Sorted on load; the larger value reaches the top of the lane.
        assert!((areas[0][0].x - scale().apply(10.0)).abs() < 1e-9);
        assert!((areas[0][0].y - 0.0).abs() < 1e-9);
        assert!((areas[0][1].y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn gradient_area_draws_one_path_per_color() {
        let gradient = ColorGradient {
            colors: vec![Color::rgb8(0, 0, 255), Color::rgb8(255, 0, 0)],
            thresholds: vec![5.0],
        };
        let mut track = AreaTrack::new("disorder", 40.0, DisplayColor::Gradient(gradient));
        track.load((1..50).map(|i| TrackDataElement::point(i as f64, (i % 10) as f64)).collect());
        track.init(920.0, 0.0, &scale());
        track.update(LocationView::new(0.0, 100.0), &scale());
        assert_eq!(track.series().len(), 2);
        assert_eq!(fill_areas(&track.commands()).len(), 2);
    }

    #[test]
    fn move_reprojects_without_reducing() {
        let mut track =
            AreaTrack::new("t", 40.0, DisplayColor::Solid(Color::rgb8(0, 0, 0))).with_max_points(10);
        track.load((0..100).map(|i| TrackDataElement::point(i as f64, 1.0)).collect());
        track.init(920.0, 0.0, &scale());
        track.update(LocationView::new(0.0, 100.0), &scale());
        let before = track.series().to_vec();

        let zoomed = scale().with_domain((40.0, 60.0));
        track.move_to(&zoomed);
        assert_eq!(track.series(), before.as_slice());
        let cmds = track.commands();
        let areas = fill_areas(&cmds);
        assert!((areas[0][0].x - zoomed.apply(0.0)).abs() < 1e-9);
    }

    #[test]
    fn value_axis_is_fixed_at_load() {
        let mut track = AreaTrack::new("t", 40.0, DisplayColor::Solid(Color::rgb8(0, 0, 0)));
        track.load((0..50_000).map(|i| TrackDataElement::point(i as f64, (i % 8) as f64)).collect());
        assert_eq!(track.value_range(), (0.0, 7.0));

        let fixed = AreaTrack::new("t", 40.0, DisplayColor::Solid(Color::rgb8(0, 0, 0)))
            .with_value_domain(Some((-1.0, 1.0)));
        assert_eq!(fixed.value_range(), (-1.0, 1.0));
        let mut fixed = fixed;
        fixed.load(vec![TrackDataElement::point(1.0, 30.0)]);
        assert_eq!(fixed.value_range(), (-1.0, 1.0));
    }

    #[test]
    fn flat_value_axis_draws_on_the_baseline() {
        let mut track = AreaTrack::new("t", 40.0, DisplayColor::Solid(Color::rgb8(0, 0, 0)))
            .with_value_domain(Some((2.0, 2.0)));
        track.load(vec![TrackDataElement::point(10.0, 2.0), TrackDataElement::point(20.0, 5.0)]);
        track.init(920.0, 0.0, &scale());
        track.update(LocationView::new(0.0, 100.0), &scale());
        let cmds = track.commands();
        let areas = fill_areas(&cmds);
        assert!(areas[0].iter().all(|p| p.y == 40.0));
    }

    #[test]
    fn highlight_is_drawn_beneath_the_area() {
        let mut track = AreaTrack::new("t", 40.0, DisplayColor::Solid(Color::rgb8(0, 0, 0)));
        track.load(vec![TrackDataElement::point(10.0, 1.0)]);
        track.init(920.0, 40.0, &scale());
        track.update(LocationView::new(0.0, 100.0), &scale());
        track.highlight_region(Some(&Region::new(5.0, 15.0)), &scale());

        let cmds = track.commands();
        let highlight = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::DrawRect { color: ThemeToken::SelectionHighlight, .. }));
        let area = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::FillArea { .. }));
        assert!(highlight < area);
        assert!(matches!(
            cmds[1],
            RenderCommand::PushTransform { translate } if translate.y == 40.0
        ));

        track.highlight_region(None, &scale());
        assert!(!track.commands().iter().any(|c| matches!(
            c,
            RenderCommand::DrawRect { color: ThemeToken::SelectionHighlight, .. }
        )));
    }
}
