//! A configured row: one viewer plus the tracks its data produces.

use tracklane_protocol::RenderCommand;

use crate::bus::Bus;
use crate::config::{ConfigError, DataSource, DisplayConfig, RowConfig, TrackData, VIEW_MARGIN};
use crate::tracks::block::split_non_overlapping;
use crate::tracks::{AreaTrack, AxisTrack, BlockTrack, CompositeTrack, TrackRenderer};
use crate::viewer::Viewer;

#[derive(Debug)]
pub struct FeatureRow {
    id: String,
    config: RowConfig,
    viewer: Viewer,
}

impl FeatureRow {
    /// Mount a row on `bus`. Axis rows get their track immediately; other
    /// displays wait for `load`.
    pub fn new(config: RowConfig, bus: &Bus) -> Result<Self, ConfigError> {
        let (element_id, length) = config.validate()?;
        let id = element_id.to_string();

        let mut viewer = Viewer::new(id.as_str(), bus)
            .with_width(config.track_width)
            .with_padding(config.inner_padding)
            .with_limits(config.region_limits(length));
        if let Some(extent) = config.zoom_extent {
            viewer = viewer.with_zoom_extent(extent);
        }
        viewer.set_range(-VIEW_MARGIN, length + VIEW_MARGIN);
        if config.display == DisplayConfig::Axis {
            viewer.add_track(Box::new(
                AxisTrack::new(format!("{id}-axis")).with_height(config.track_height),
            ));
        }
        log::debug!("row {id}: mounted {} display", config.display.name());
        Ok(Self { id, config, viewer })
    }

    /// `new` followed by `load` of the configured `track_data`, if any.
    pub fn from_config(
        config: RowConfig,
        bus: &Bus,
        source: &dyn DataSource,
    ) -> Result<Self, ConfigError> {
        let data = config.track_data.clone();
        let mut row = Self::new(config, bus)?;
        if let Some(data) = data {
            row.load(data, source)?;
        }
        Ok(row)
    }

    /// Build tracks for `data` and attach them to the viewer.
    pub fn load(&mut self, data: TrackData, source: &dyn DataSource) -> Result<(), ConfigError> {
        let tracks = build_tracks(&self.id, &self.config, &self.config.display, data, source)?;
        log::debug!("row {}: loaded {} tracks", self.id, tracks.len());
        for track in tracks {
            self.viewer.add_track(track);
        }
        Ok(())
    }

    pub fn start(&mut self) {
        self.viewer.start();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.config.row_title.as_deref()
    }

    pub fn config(&self) -> &RowConfig {
        &self.config
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    /// Combined height of the row's tracks.
    pub fn track_height(&self) -> f64 {
        self.viewer.tracks().iter().map(|t| t.height()).sum()
    }

    pub fn render(&self) -> Vec<RenderCommand> {
        let mut commands = vec![RenderCommand::BeginGroup {
            id: format!("row-{}", self.id),
            label: self.config.row_title.clone(),
        }];
        commands.extend(self.viewer.render());
        commands.push(RenderCommand::EndGroup);
        commands
    }
}

fn unsupported(data: &TrackData, display: &DisplayConfig) -> ConfigError {
    ConfigError::UnsupportedData {
        data: data.name(),
        display: display.name(),
    }
}

fn build_tracks(
    id: &str,
    config: &RowConfig,
    display: &DisplayConfig,
    data: TrackData,
    source: &dyn DataSource,
) -> Result<Vec<Box<dyn TrackRenderer>>, ConfigError> {
    match (display, data) {
        (DisplayConfig::Composite { displays }, TrackData::Keyed(mut keyed)) => {
            let mut composite = CompositeTrack::new(format!("{id}-composite"));
            for entry in displays {
                let layer_id = format!("{id}-{}", entry.id);
                if entry.display == DisplayConfig::Axis {
                    composite.push(Box::new(
                        AxisTrack::new(layer_id).with_height(config.track_height),
                    ));
                    continue;
                }
                let series = keyed.remove(&entry.id).unwrap_or_default();
                let layers = build_tracks(
                    &layer_id,
                    config,
                    &entry.display,
                    TrackData::Series(series),
                    source,
                )?;
                for layer in layers {
                    composite.push(layer);
                }
            }
            if !keyed.is_empty() {
                log::warn!(
                    "row {id}: data for unknown layers {:?} ignored",
                    keyed.keys().collect::<Vec<_>>()
                );
            }
            Ok(vec![Box::new(composite)])
        }
        (DisplayConfig::Composite { .. } | DisplayConfig::Axis, data) => {
            Err(unsupported(&data, display))
        }
        (_, data @ TrackData::Keyed(_)) => Err(unsupported(&data, display)),
        (_, TrackData::Reference(key)) => {
            let series = source
                .fetch(&key)
                .ok_or(ConfigError::UnresolvedReference(key))?;
            build_tracks(id, config, display, TrackData::Series(series), source)
        }
        (DisplayConfig::Area { color }, TrackData::Series(series)) => {
            let mut track = AreaTrack::new(format!("{id}-area"), config.track_height, color.clone())
                .with_title(config.row_title.clone())
                .with_interpolation(config.interpolation)
                .with_max_points(config.max_points)
                .with_value_domain(config.value_domain);
            track.load(series);
            Ok(vec![Box::new(track)])
        }
        (DisplayConfig::Block, TrackData::Series(series)) => Ok(split_non_overlapping(series)
            .into_iter()
            .enumerate()
            .map(|(i, lane)| {
                let mut track = BlockTrack::new(format!("{id}-block-{i}"), config.track_height);
                track.load(lane);
                Box::new(track) as Box<dyn TrackRenderer>
            })
            .collect()),
    }
}
