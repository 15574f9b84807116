use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use tracklane_core::curve::flatten;
use tracklane_core::{Board, Origin};
use tracklane_protocol::{Point, RenderCommand, ThemeToken};

/// Board pixels per terminal line.
const LINE_PX: f64 = 10.0;
const ZOOM_STEP: f64 = 1.3;
const PAN_FRACTION: f64 = 0.1;
const CURVE_SAMPLES: usize = 8;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background | ThemeToken::TrackBackground => Color::Black,
        ThemeToken::TrackBorder | ThemeToken::BlockBorder => Color::DarkGray,
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextMuted => Color::Gray,
        ThemeToken::AxisLine => Color::Gray,
        ThemeToken::AxisText => Color::White,
        ThemeToken::BlockFill => Color::Rgb(69, 123, 157),
        ThemeToken::AreaFill => Color::Rgb(60, 120, 200),
        ThemeToken::SelectionHighlight => Color::Rgb(90, 80, 20),
    }
}

fn rgb(color: tracklane_protocol::Color) -> Color {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(q(color.r), q(color.g), q(color.b))
}

/// Draws render commands into terminal cells.
struct Painter<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    col_scale: f64,
    offsets: Vec<Point>,
}

impl Painter<'_> {
    fn origin(&self) -> Point {
        self.offsets.last().copied().unwrap_or(Point::new(0.0, 0.0))
    }

    fn cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let o = self.origin();
        let col = ((x + o.x) * self.col_scale).floor();
        let row = ((y + o.y) / LINE_PX).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as u16, row as u16);
        (col < self.area.width && row < self.area.height)
            .then_some((self.area.x + col, self.area.y + row))
    }

    fn put(&mut self, x: f64, y: f64, ch: char, fg: Color) {
        if let Some(pos) = self.cell(x, y) {
            self.buf[pos].set_char(ch).set_fg(fg);
        }
    }

    fn fill(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, bg: Color) {
        let cols = ((x1 - x0) * self.col_scale).ceil().max(1.0) as usize;
        let rows = ((y1 - y0) / LINE_PX).ceil().max(1.0) as usize;
        for r in 0..rows {
            for c in 0..cols {
                let x = x0 + c as f64 / self.col_scale;
                let y = y0 + r as f64 * LINE_PX;
                if let Some(pos) = self.cell(x, y) {
                    self.buf[pos].set_bg(bg);
                }
            }
        }
    }

    fn paint(&mut self, cmd: &RenderCommand) {
        match cmd {
            RenderCommand::DrawRect {
                rect, color, label, ..
            } => {
                self.fill(rect.x, rect.y, rect.right(), rect.y + rect.h, theme_to_color(*color));
                if let Some(label) = label {
                    let max = (rect.w * self.col_scale) as usize;
                    for (i, ch) in label.chars().take(max.saturating_sub(1)).enumerate() {
                        let x = rect.x + (i as f64 + 1.0) / self.col_scale;
                        self.put(x, rect.y + rect.h / 2.0, ch, Color::White);
                    }
                }
            }
            RenderCommand::FillArea {
                points,
                baseline,
                color,
                interpolation,
                ..
            } => {
                let fg = rgb(*color);
                for p in flatten(points, *interpolation, CURVE_SAMPLES) {
                    let mut y = p.y;
                    while y < *baseline {
                        self.put(p.x, y, '█', fg);
                        y += LINE_PX;
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                for (i, ch) in text.chars().enumerate() {
                    let x = position.x + i as f64 / self.col_scale;
                    self.put(x, position.y - LINE_PX / 2.0, ch, theme_to_color(*color));
                }
            }
            RenderCommand::DrawLine { from, to, color, .. } => {
                let fg = theme_to_color(*color);
                if (from.x - to.x).abs() < f64::EPSILON {
                    self.put(from.x, from.y.min(to.y), '│', fg);
                }
            }
            RenderCommand::PushTransform { translate } => {
                let o = self.origin();
                self.offsets
                    .push(Point::new(o.x + translate.x, o.y + translate.y));
            }
            RenderCommand::PopTransform => {
                self.offsets.pop();
            }
            RenderCommand::SetClip { .. }
            | RenderCommand::ClearClip
            | RenderCommand::BeginGroup { .. }
            | RenderCommand::EndGroup => {}
        }
    }
}

/// Region around the middle tenth of the focused row's visible range.
fn center_selection(board: &Board, focus: usize) -> Option<(f64, f64)> {
    let (from, to) = board.rows().get(focus)?.viewer().scale().domain();
    let center = (from + to) / 2.0;
    let half = ((to - from) / 20.0).max(0.5);
    Some(((center - half).round(), (center + half).round()))
}

pub fn render_tui(board: &mut Board) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut focus: usize = 0;

    loop {
        let cmds = board.render();
        let board_width = board.width().max(1.0);
        let title = board
            .rows()
            .get(focus)
            .map(|row| {
                let view = row.viewer().location();
                format!(
                    " tracklane — {} [{:.0}, {:.0}] | ←→ pan | +/- zoom | Tab row | s select | d clear | q quit ",
                    row.title().unwrap_or(row.id()),
                    view.from,
                    view.to
                )
            })
            .unwrap_or_else(|| " tracklane — empty board | q quit ".to_string());

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(title.as_str())
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content_area = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, content_area);

            let mut painter = Painter {
                buf: frame.buffer_mut(),
                area: content_area,
                col_scale: f64::from(content_area.width) / board_width,
                offsets: Vec::new(),
            };
            for cmd in &cmds {
                painter.paint(cmd);
            }
        })?;

        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }
        let center = board_width / 2.0;
        let changed = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Tab => {
                    focus = (focus + 1) % board.len().max(1);
                    false
                }
                KeyCode::Left => pan(board, focus, board_width * PAN_FRACTION),
                KeyCode::Right => pan(board, focus, -board_width * PAN_FRACTION),
                KeyCode::Char('+') | KeyCode::Char('=') => zoom(board, focus, center, ZOOM_STEP),
                KeyCode::Char('-') => zoom(board, focus, center, 1.0 / ZOOM_STEP),
                KeyCode::Char('s') => match (center_selection(board, focus), board.row_mut(focus)) {
                    (Some((begin, end)), Some(row)) => {
                        row.viewer_mut()
                            .highlight_region(Some(begin), Some(end), Origin::Local);
                        true
                    }
                    _ => false,
                },
                KeyCode::Char('d') => board
                    .row_mut(focus)
                    .is_some_and(|row| row.viewer_mut().double_click()),
                _ => false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => zoom(board, focus, center, ZOOM_STEP),
                MouseEventKind::ScrollDown => zoom(board, focus, center, 1.0 / ZOOM_STEP),
                MouseEventKind::ScrollLeft => pan(board, focus, board_width * PAN_FRACTION),
                MouseEventKind::ScrollRight => pan(board, focus, -board_width * PAN_FRACTION),
                _ => false,
            },
            _ => false,
        };

        if changed {
            let applied = board.pump();
            board.settle();
            log::debug!("gesture on row {focus}: {applied} echoes applied");
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn pan(board: &mut Board, focus: usize, dx: f64) -> bool {
    board
        .row_mut(focus)
        .is_some_and(|row| row.viewer_mut().pan_by(dx))
}

fn zoom(board: &mut Board, focus: usize, at_px: f64, factor: f64) -> bool {
    board
        .row_mut(focus)
        .is_some_and(|row| row.viewer_mut().zoom_at(at_px, factor))
}
