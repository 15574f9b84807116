pub mod board;
pub mod commands;
pub mod ids;
pub mod theme;
pub mod types;

pub use board::{
    BoardEvent, ColorGradient, Gap, LocationView, Region, RegionLimits, ScaleTransform, Selection,
    TrackDataElement, ZoomTransform,
};
pub use commands::{Interpolation, RenderCommand, TextAlign};
pub use ids::ViewerId;
pub use theme::ThemeToken;
pub use types::{Color, ColorParseError, Point, Rect};
