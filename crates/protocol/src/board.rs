use serde::{Deserialize, Serialize};

use crate::ids::ViewerId;
use crate::types::Color;

/// The visible logical range of a viewer (e.g. residue `from` to `to`).
///
/// Only the owning viewer writes this; tracks receive copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationView {
    pub from: f64,
    pub to: f64,
}

impl LocationView {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.from && position <= self.to
    }
}

/// Hard bounds on the logical domain and on how far the view may zoom.
///
/// `min_zoom` is the narrowest visible span, `max_zoom` the widest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionLimits {
    pub max: f64,
    pub min: f64,
    pub max_zoom: f64,
    pub min_zoom: f64,
}

impl RegionLimits {
    /// Width of the whole logical domain.
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// Shrink `max_zoom` so the view can never be wider than the domain.
    pub fn clamp_max_zoom(&mut self) {
        if self.extent() < self.max_zoom {
            self.max_zoom = self.extent();
        }
    }
}

impl Default for RegionLimits {
    fn default() -> Self {
        Self {
            max: 10_000.0,
            min: -1.5,
            max_zoom: 1_000_000.0,
            min_zoom: 20.0,
        }
    }
}

/// A pan/zoom transform in pixel space: translate by `(x, y)`, scale by `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.k == 1.0
    }

    /// Map a transformed pixel x back to the untransformed pixel space.
    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.k + self.x
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A zoom transform tagged with the viewer that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleTransform {
    pub transform: ZoomTransform,
    pub viewer_id: ViewerId,
}

/// A sub-range excluded from highlight rendering (disordered or unmapped
/// residues inside a selected feature).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub begin: f64,
    pub end: f64,
}

/// A concrete highlight request handed to track renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub begin: f64,
    pub end: f64,
    #[serde(default)]
    pub gaps: Vec<Gap>,
    /// The region marks the boundary between two positions rather than a
    /// run of positions; it is drawn as two markers.
    #[serde(default)]
    pub is_empty: bool,
}

impl Region {
    pub fn new(begin: f64, end: f64) -> Self {
        Self {
            begin,
            end,
            gaps: Vec::new(),
            is_empty: false,
        }
    }

    pub fn with_gaps(mut self, gaps: Vec<Gap>) -> Self {
        self.gaps = gaps;
        self
    }
}

/// The current selection of a viewer, tagged with the viewer that made it.
///
/// `begin == None && end == None` means "nothing selected".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub begin: Option<f64>,
    pub end: Option<f64>,
    pub viewer_id: ViewerId,
    #[serde(default)]
    pub gaps: Vec<Gap>,
    #[serde(default)]
    pub is_empty: bool,
}

impl Selection {
    pub fn cleared(viewer_id: ViewerId) -> Self {
        Self {
            begin: None,
            end: None,
            viewer_id,
            gaps: Vec::new(),
            is_empty: false,
        }
    }

    pub fn from_region(region: &Region, viewer_id: ViewerId) -> Self {
        Self {
            begin: Some(region.begin),
            end: Some(region.end),
            viewer_id,
            gaps: region.gaps.clone(),
            is_empty: region.is_empty,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.begin.is_none() && self.end.is_none()
    }

    /// The region to draw, if both bounds are present.
    pub fn region(&self) -> Option<Region> {
        match (self.begin, self.end) {
            (Some(begin), Some(end)) => Some(Region {
                begin,
                end,
                gaps: self.gaps.clone(),
                is_empty: self.is_empty,
            }),
            _ => None,
        }
    }
}

/// One data point at a logical position.
///
/// `value == None` means "no data here". `end` is only meaningful for block
/// features spanning several positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDataElement {
    pub begin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TrackDataElement {
    pub fn point(begin: f64, value: f64) -> Self {
        Self {
            begin,
            end: None,
            value: Some(value),
            title: None,
        }
    }

    pub fn block(begin: f64, end: f64) -> Self {
        Self {
            begin,
            end: Some(end),
            value: None,
            title: None,
        }
    }

    /// Last position covered; single-position elements end where they begin.
    pub fn last(&self) -> f64 {
        self.end.unwrap_or(self.begin)
    }

    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// Maps point values onto `colors.len()` series by comparing against the
/// ascending `thresholds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorGradient {
    pub colors: Vec<Color>,
    pub thresholds: Vec<f64>,
}

/// Payload carried on the bus between viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "event_data", rename_all = "snake_case")]
pub enum BoardEvent {
    Scale(ScaleTransform),
    Selection(Selection),
}

impl BoardEvent {
    pub fn origin(&self) -> &ViewerId {
        match self {
            Self::Scale(s) => &s.viewer_id,
            Self::Selection(s) => &s.viewer_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_detection() {
        assert!(ZoomTransform::identity().is_identity());
        assert!(!ZoomTransform::new(0.0, 0.0, 2.0).is_identity());
        assert!(!ZoomTransform::new(-3.0, 0.0, 1.0).is_identity());
    }

    #[test]
    fn max_zoom_clamped_to_extent() {
        let mut limits = RegionLimits::default();
        limits.clamp_max_zoom();
        assert!((limits.max_zoom - 10_001.5).abs() < f64::EPSILON);
    }

    #[test]
    fn cleared_selection_has_no_region() {
        let sel = Selection::cleared(ViewerId::from("a"));
        assert!(sel.is_cleared());
        assert!(sel.region().is_none());
    }

    #[test]
    fn selection_wire_defaults() {
        let json = r#"{"begin":10.0,"end":50.0,"viewer_id":"a"}"#;
        let sel: Option<Selection> = serde_json::from_str(json).ok();
        let region = sel.and_then(|s| s.region());
        assert_eq!(region, Some(Region::new(10.0, 50.0)));
    }

    #[test]
    fn board_event_is_tagged() {
        let event = BoardEvent::Scale(ScaleTransform {
            transform: ZoomTransform::new(5.0, 0.0, 2.0),
            viewer_id: ViewerId::from("a"),
        });
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"scale\""));
        assert!(json.contains("\"event_data\""));
        assert_eq!(event.origin(), &ViewerId::from("a"));
    }

    #[test]
    fn data_element_without_value() {
        let el: Option<TrackDataElement> = serde_json::from_str(r#"{"begin":7}"#).ok();
        let el = el.unwrap_or_else(|| TrackDataElement::point(0.0, 1.0));
        assert_eq!(el.value, None);
        assert_eq!(el.value_or_zero(), 0.0);
        assert_eq!(el.last(), 7.0);
    }
}
