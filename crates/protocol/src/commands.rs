use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// A single, stateless render instruction.
///
/// Tracks emit a `Vec<RenderCommand>` positioned in device pixels. Renderers
/// consume this list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a text label.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        opacity: f32,
    },

    /// Fill the area between a polyline and a horizontal baseline.
    FillArea {
        id: String,
        points: Vec<Point>,
        baseline: f64,
        color: Color,
        interpolation: Interpolation,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Push a translation applied to all subsequent commands until the
    /// matching `PopTransform`.
    PushTransform { translate: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group (a viewer, a track).
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// How consecutive points of a `FillArea` are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Horizontal run to the next x, then a vertical jump.
    #[default]
    Step,
    /// Straight segments between points.
    Linear,
    /// Cubic segments passing through every point (zero tension).
    Cardinal,
    /// Uniform cubic B-spline; smooths through the points without touching
    /// the interior ones.
    Basis,
}
