use tracklane_protocol::{LocationView, Point, Region, RenderCommand, TextAlign, ThemeToken};

use crate::layout::HighlightLayer;
use crate::scale::LinearScale;

use super::{TrackRenderer, apply_highlight, lane_commands};

pub const AXIS_HEIGHT: f64 = 24.0;
const MAJOR_TICK_HEIGHT: f64 = 8.0;
const MINOR_TICK_HEIGHT: f64 = 4.0;
const FONT_SIZE: f64 = 10.0;
const LABEL_Y: f64 = 12.0;
const MIN_MAJOR_SPACING_PX: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tick {
    position: f64,
    x: f64,
    major: bool,
}

/// Position ruler with numbered major ticks and unlabelled minor ticks.
#[derive(Debug)]
pub struct AxisTrack {
    id: String,
    height: f64,
    ticks: Vec<Tick>,
    major_interval: f64,
    width: f64,
    y_offset: f64,
    highlight: HighlightLayer,
}

impl AxisTrack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            height: AXIS_HEIGHT,
            ticks: Vec::new(),
            major_interval: 1.0,
            width: 0.0,
            y_offset: 0.0,
            highlight: HighlightLayer::new(),
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn major_interval(&self) -> f64 {
        self.major_interval
    }

    fn layout_ticks(&mut self, scale: &LinearScale) {
        let (from, to) = scale.domain();
        let (r0, r1) = scale.range();
        let span = to - from;
        if span <= 0.0 || !span.is_finite() {
            self.ticks.clear();
            return;
        }
        let (major, subdivisions) = nice_interval(span, r1 - r0);
        let minor = major / f64::from(subdivisions);
        self.major_interval = major;

        // Positions are whole residues; nothing is drawn before the first one.
        let start = (from.max(1.0) / minor).ceil() * minor;
        self.ticks = (0_u32..)
            .map(|i| start + f64::from(i) * minor)
            .take_while(|p| *p <= to)
            .map(|position| Tick {
                position,
                x: scale.apply(position),
                major: is_aligned(position, major),
            })
            .collect();
    }
}

impl TrackRenderer for AxisTrack {
    fn init(&mut self, width: f64, y_offset: f64, scale: &LinearScale) {
        self.width = width;
        self.y_offset = y_offset;
        self.move_to(scale);
    }

    fn update(&mut self, _view: LocationView, scale: &LinearScale) {
        self.move_to(scale);
    }

    fn move_to(&mut self, scale: &LinearScale) {
        self.layout_ticks(scale);
        self.highlight.move_highlight(scale);
    }

    fn highlight_region(&mut self, region: Option<&Region>, scale: &LinearScale) {
        apply_highlight(&mut self.highlight, region, scale, self.height);
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn commands(&self) -> Vec<RenderCommand> {
        let mut content = Vec::with_capacity(self.ticks.len() * 2 + 1);
        content.push(RenderCommand::DrawLine {
            from: Point::new(0.0, self.height),
            to: Point::new(self.width, self.height),
            color: ThemeToken::AxisLine,
            width: 1.0,
        });
        for tick in self.ticks.iter().filter(|t| t.x >= 0.0 && t.x <= self.width) {
            let tick_height = if tick.major {
                MAJOR_TICK_HEIGHT
            } else {
                MINOR_TICK_HEIGHT
            };
            content.push(RenderCommand::DrawLine {
                from: Point::new(tick.x, self.height - tick_height),
                to: Point::new(tick.x, self.height),
                color: ThemeToken::AxisLine,
                width: if tick.major { 1.0 } else { 0.5 },
            });
            if tick.major {
                content.push(RenderCommand::DrawText {
                    position: Point::new(tick.x, LABEL_Y),
                    text: format_position(tick.position),
                    color: ThemeToken::AxisText,
                    font_size: FONT_SIZE,
                    align: TextAlign::Center,
                });
            }
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

fn is_aligned(position: f64, interval: f64) -> bool {
    let offset = position / interval;
    (offset - offset.round()).abs() < 0.001
}

/// Choose a 1/2/5 × 10ⁿ major interval (never below one position) giving
/// roughly one major tick per `MIN_MAJOR_SPACING_PX`. Returns
/// `(major_interval, minor ticks per major)`.
fn nice_interval(span: f64, width_px: f64) -> (f64, u32) {
    let target_count = (width_px / MIN_MAJOR_SPACING_PX).max(2.0);
    let raw = (span / target_count).max(1.0);
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let (step, subdivisions) = [(1.0, 2), (2.0, 2), (5.0, 5), (10.0, 2)]
        .into_iter()
        .find(|(step, _)| step * magnitude >= raw)
        .unwrap_or((10.0, 2));
    let interval = step * magnitude;
    if interval / f64::from(subdivisions) < 1.0 {
        (interval, 1)
    } else {
        (interval, subdivisions)
    }
}

fn format_position(position: f64) -> String {
    format!("{}", position.round() as i64)
}
