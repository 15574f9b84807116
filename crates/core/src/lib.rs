//! Linked, zoomable feature-track viewers.
//!
//! A [`Board`] stacks [`FeatureRow`]s, each owning one [`Viewer`]. Viewers
//! share a [`Bus`]: a zoom, pan or selection on one viewer is published and
//! applied by its siblings once they pump their inbox. Tracks turn the
//! viewer's scale into [`tracklane_protocol::RenderCommand`]s, which
//! [`svg::render_svg`] or any other backend draws.

pub mod board;
pub mod bus;
pub mod config;
pub mod curve;
pub mod layout;
pub mod reduce;
pub mod row;
pub mod scale;
pub mod svg;
pub mod tracks;
pub mod viewer;
pub mod zoom;

pub use board::{Board, LoadError};
pub use bus::{Bus, EventSink};
pub use config::{
    BoardConfig, CompositeEntry, ConfigError, DataSource, DisplayConfig, MemorySource, RowConfig,
    TrackData,
};
pub use reduce::DisplayColor;
pub use row::FeatureRow;
pub use scale::LinearScale;
pub use tracks::{TrackCollection, TrackRenderer};
pub use viewer::{Origin, Viewer};
