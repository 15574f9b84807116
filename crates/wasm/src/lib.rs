use std::cell::RefCell;

use serde::Serialize;
use tracklane_core::{Board, FeatureRow, Origin};
use tracklane_protocol::RenderCommand;
use wasm_bindgen::prelude::*;

thread_local! {
    static BOARDS: RefCell<Vec<Board>> = const { RefCell::new(Vec::new()) };
}

#[derive(Serialize)]
struct Frame<'a> {
    width: f64,
    height: f64,
    commands: &'a [RenderCommand],
}

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn with_board<T>(
    handle: usize,
    f: impl FnOnce(&mut Board) -> Result<T, JsError>,
) -> Result<T, JsError> {
    BOARDS.with_borrow_mut(|boards| {
        let board = boards
            .get_mut(handle)
            .ok_or_else(|| JsError::new("invalid board handle"))?;
        f(board)
    })
}

/// Apply `f` to one row, then deliver whatever it published to the rest.
fn with_row(
    handle: usize,
    row: usize,
    f: impl FnOnce(&mut FeatureRow) -> bool,
) -> Result<bool, JsError> {
    with_board(handle, |board| {
        let row = board
            .row_mut(row)
            .ok_or_else(|| JsError::new("invalid row index"))?;
        let changed = f(row);
        board.pump();
        Ok(changed)
    })
}

/// Parse a board config (JSON) and start it. Returns a handle for later use.
#[wasm_bindgen]
pub fn load_board(json: &str) -> Result<usize, JsError> {
    let mut board = Board::from_json(json).map_err(js_err)?;
    board.start();
    Ok(BOARDS.with_borrow_mut(|boards| {
        boards.push(board);
        boards.len() - 1
    }))
}

/// Zoom one row by `factor` around the pixel `at_px`; siblings follow.
#[wasm_bindgen]
pub fn zoom(handle: usize, row: usize, at_px: f64, factor: f64) -> Result<bool, JsError> {
    with_row(handle, row, |r| r.viewer_mut().zoom_at(at_px, factor))
}

#[wasm_bindgen]
pub fn pan(handle: usize, row: usize, dx: f64) -> Result<bool, JsError> {
    with_row(handle, row, |r| r.viewer_mut().pan_by(dx))
}

/// Select `[begin, end]` on one row; every row highlights it.
#[wasm_bindgen]
pub fn select(handle: usize, row: usize, begin: f64, end: f64) -> Result<(), JsError> {
    with_row(handle, row, |r| {
        r.viewer_mut()
            .highlight_region(Some(begin), Some(end), Origin::Local);
        true
    })
    .map(|_| ())
}

#[wasm_bindgen]
pub fn clear_selection(handle: usize, row: usize) -> Result<bool, JsError> {
    with_row(handle, row, |r| r.viewer_mut().double_click())
}

/// Snap every row to whole positions, as at the end of a gesture.
#[wasm_bindgen]
pub fn settle(handle: usize) -> Result<(), JsError> {
    with_board(handle, |board| {
        board.settle();
        Ok(())
    })
}

/// Render the whole board, returning `{width, height, commands}` as JSON.
#[wasm_bindgen]
pub fn render_board(handle: usize) -> Result<String, JsError> {
    with_board(handle, |board| {
        let commands = board.render();
        let frame = Frame {
            width: board.width(),
            height: board.height(),
            commands: &commands,
        };
        serde_json::to_string(&frame).map_err(js_err)
    })
}

#[wasm_bindgen]
pub fn board_height(handle: usize) -> Result<f64, JsError> {
    with_board(handle, |board| Ok(board.height()))
}
