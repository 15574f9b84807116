//! JSON configuration of rows and boards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracklane_protocol::{ColorGradient, Interpolation, RegionLimits, TrackDataElement};

use crate::reduce::DisplayColor;
use crate::viewer::{DEFAULT_PADDING, DEFAULT_WIDTH};

/// Extra room left on both sides of the sequence in the initial view.
pub const VIEW_MARGIN: f64 = 1.5;
pub const DEFAULT_TRACK_HEIGHT: f64 = 40.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("row has no mount point (element_id)")]
    MissingMount,
    #[error("row {0:?} has no length")]
    MissingLength(String),
    #[error("invalid sequence length {0}")]
    InvalidLength(f64),
    #[error("{data} data cannot be shown by a {display} display")]
    UnsupportedData {
        data: &'static str,
        display: &'static str,
    },
    #[error("data reference {0:?} could not be resolved")]
    UnresolvedReference(String),
    #[error("value domain [{0}, {1}] is empty")]
    InvalidValueDomain(f64, f64),
    #[error("invalid color gradient: {0}")]
    InvalidGradient(String),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a row draws its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayConfig {
    Axis,
    Area { color: DisplayColor },
    Block,
    Composite { displays: Vec<CompositeEntry> },
}

impl DisplayConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Axis => "axis",
            Self::Area { .. } => "area",
            Self::Block => "block",
            Self::Composite { .. } => "composite",
        }
    }

    fn gradients(&self) -> Vec<&ColorGradient> {
        match self {
            Self::Area {
                color: DisplayColor::Gradient(gradient),
            } => vec![gradient],
            Self::Composite { displays } => displays
                .iter()
                .flat_map(|entry| entry.display.gradients())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One layer of a composite display; keyed data is matched by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeEntry {
    pub id: String,
    pub display: DisplayConfig,
}

/// The data attached to a row. The variant decides how it is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TrackData {
    Series(Vec<TrackDataElement>),
    /// Composite layer id → series.
    Keyed(BTreeMap<String, Vec<TrackDataElement>>),
    /// Key resolved through a `DataSource`.
    Reference(String),
}

impl TrackData {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Series(_) => "series",
            Self::Keyed(_) => "keyed",
            Self::Reference(_) => "reference",
        }
    }
}

/// Resolves `TrackData::Reference` keys to series.
pub trait DataSource {
    fn fetch(&self, key: &str) -> Option<Vec<TrackDataElement>>;
}

/// Series held in memory, keyed by reference name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemorySource {
    entries: HashMap<String, Vec<TrackDataElement>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, data: Vec<TrackDataElement>) {
        self.entries.insert(key.into(), data);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, key: &str) -> Option<Vec<TrackDataElement>> {
        self.entries.get(key).cloned()
    }
}

fn default_track_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_inner_padding() -> f64 {
    DEFAULT_PADDING
}

fn default_track_height() -> f64 {
    DEFAULT_TRACK_HEIGHT
}

fn default_max_points() -> usize {
    crate::tracks::area::DEFAULT_MAX_POINTS
}

/// One row of the board: a viewer and the tracks built from its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowConfig {
    #[serde(default)]
    pub element_id: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default = "default_track_width")]
    pub track_width: f64,
    #[serde(default = "default_inner_padding")]
    pub inner_padding: f64,
    #[serde(default = "default_track_height")]
    pub track_height: f64,
    #[serde(default)]
    pub row_title: Option<String>,
    pub display: DisplayConfig,
    #[serde(default)]
    pub track_data: Option<TrackData>,
    /// Defaults to the sequence plus `VIEW_MARGIN` on both sides.
    #[serde(default)]
    pub limits: Option<RegionLimits>,
    #[serde(default)]
    pub zoom_extent: Option<(f64, f64)>,
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Fixed value axis for area displays.
    #[serde(default)]
    pub value_domain: Option<(f64, f64)>,
}

impl RowConfig {
    pub fn new(element_id: impl Into<String>, length: f64, display: DisplayConfig) -> Self {
        Self {
            element_id: Some(element_id.into()),
            length: Some(length),
            track_width: DEFAULT_WIDTH,
            inner_padding: DEFAULT_PADDING,
            track_height: DEFAULT_TRACK_HEIGHT,
            row_title: None,
            display,
            track_data: None,
            limits: None,
            zoom_extent: None,
            max_points: default_max_points(),
            interpolation: Interpolation::default(),
            value_domain: None,
        }
    }

    pub fn with_data(mut self, data: TrackData) -> Self {
        self.track_data = Some(data);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.row_title = Some(title.into());
        self
    }

    /// Check everything that can be checked without loading data; returns
    /// the mount point and sequence length.
    pub fn validate(&self) -> Result<(&str, f64), ConfigError> {
        let element_id = self
            .element_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingMount)?;
        let length = self
            .length
            .ok_or_else(|| ConfigError::MissingLength(element_id.to_string()))?;
        if !length.is_finite() || length <= 0.0 {
            return Err(ConfigError::InvalidLength(length));
        }
        if let Some((lo, hi)) = self.value_domain
            && !(lo.is_finite() && hi.is_finite() && lo < hi)
        {
            return Err(ConfigError::InvalidValueDomain(lo, hi));
        }
        for gradient in self.display.gradients() {
            validate_gradient(gradient)?;
        }
        Ok((element_id, length))
    }

    /// The configured limits, or the sequence plus margin.
    pub fn region_limits(&self, length: f64) -> RegionLimits {
        self.limits.unwrap_or(RegionLimits {
            min: -VIEW_MARGIN,
            max: length + VIEW_MARGIN,
            ..RegionLimits::default()
        })
    }
}

fn validate_gradient(gradient: &ColorGradient) -> Result<(), ConfigError> {
    if gradient.colors.is_empty() {
        return Err(ConfigError::InvalidGradient("no colors".into()));
    }
    if gradient.thresholds.len() + 1 != gradient.colors.len() {
        return Err(ConfigError::InvalidGradient(format!(
            "{} colors need {} thresholds, got {}",
            gradient.colors.len(),
            gradient.colors.len() - 1,
            gradient.thresholds.len()
        )));
    }
    if gradient.thresholds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigError::InvalidGradient(
            "thresholds must be strictly ascending".into(),
        ));
    }
    Ok(())
}

/// A whole board: rows sharing one bus, plus inline reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Length used by rows that do not set their own.
    #[serde(default)]
    pub length: Option<f64>,
    /// Overrides every row's `track_width`.
    #[serde(default)]
    pub track_width: Option<f64>,
    /// Put a position axis above the rows.
    #[serde(default)]
    pub include_axis: bool,
    #[serde(default)]
    pub rows: Vec<RowConfig>,
    #[serde(default)]
    pub sources: MemorySource,
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rows with board-level defaults applied, the axis row first.
    pub fn resolved_rows(&self) -> Vec<RowConfig> {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        if self.include_axis {
            let mut axis = RowConfig::new("axis", 0.0, DisplayConfig::Axis);
            axis.length = None;
            rows.push(axis);
        }
        rows.extend(self.rows.iter().cloned());
        for row in &mut rows {
            if row.length.is_none() {
                row.length = self.length;
            }
            if let Some(width) = self.track_width {
                row.track_width = width;
            }
        }
        rows
    }
}
