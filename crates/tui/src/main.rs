mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracklane_core::Board;
use tracklane_core::svg::render_svg;

#[derive(Parser)]
#[command(name = "tracklane")]
#[command(about = "Linked, zoomable feature tracks in the terminal")]
struct Cli {
    /// Board configuration (JSON)
    board: PathBuf,

    /// Write the board as SVG to this file instead of opening the viewer
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Use the dark palette for SVG output
    #[arg(long)]
    dark: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let mut board = Board::load(&cli.board)
        .with_context(|| format!("loading board {}", cli.board.display()))?;
    board.start();
    log::info!("{} rows, {} px tall", board.len(), board.height());

    if let Some(path) = cli.svg {
        let svg = render_svg(&board.render(), board.width(), board.height(), cli.dark);
        std::fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
        return Ok(());
    }

    renderer::render_tui(&mut board)
}
