//! A board: feature rows stacked on one shared bus.

use std::path::{Path, PathBuf};

use tracklane_protocol::{Point, RenderCommand};

use crate::bus::Bus;
use crate::config::{BoardConfig, ConfigError, DataSource, RowConfig};
use crate::row::FeatureRow;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Every row of a board is linked: a zoom or selection on one row reaches
/// the others once the board is pumped.
#[derive(Debug, Default)]
pub struct Board {
    bus: Bus,
    rows: Vec<FeatureRow>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every row of `config`, resolving references through `source`.
    pub fn from_config(config: &BoardConfig, source: &dyn DataSource) -> Result<Self, ConfigError> {
        let mut board = Self::new();
        for row in config.resolved_rows() {
            board.push_row(row, source)?;
        }
        Ok(board)
    }

    /// Parse a board config whose references resolve against its own
    /// `sources` table.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = BoardConfig::from_json(json)?;
        Self::from_config(&config, &config.sources)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&json)?)
    }

    pub fn push_row(
        &mut self,
        config: RowConfig,
        source: &dyn DataSource,
    ) -> Result<&mut FeatureRow, ConfigError> {
        let row = FeatureRow::from_config(config, &self.bus, source)?;
        self.rows.push(row);
        let index = self.rows.len() - 1;
        Ok(&mut self.rows[index])
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut FeatureRow> {
        self.rows.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn start(&mut self) {
        for row in &mut self.rows {
            row.start();
        }
    }

    /// Deliver bus events until no viewer applies anything new. Returns the
    /// number of events applied.
    pub fn pump(&mut self) -> usize {
        let mut total = 0;
        loop {
            let applied: usize = self
                .rows
                .iter_mut()
                .map(|row| row.viewer_mut().pump())
                .sum();
            if applied == 0 {
                return total;
            }
            total += applied;
        }
    }

    /// Adopt each viewer's current scale as its visible range.
    pub fn settle(&mut self) {
        for row in &mut self.rows {
            row.viewer_mut().resync();
        }
    }

    pub fn height(&self) -> f64 {
        self.rows.iter().map(|r| r.viewer().board_height()).sum()
    }

    pub fn width(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.viewer().width())
            .fold(0.0, f64::max)
    }

    /// Every row's drawing, stacked top to bottom.
    pub fn render(&self) -> Vec<RenderCommand> {
        let mut commands = Vec::new();
        let mut y = 0.0;
        for row in &self.rows {
            commands.push(RenderCommand::PushTransform {
                translate: Point::new(0.0, y),
            });
            commands.extend(row.render());
            commands.push(RenderCommand::PopTransform);
            y += row.viewer().board_height();
        }
        commands
    }
}
