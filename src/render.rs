//! SVG board rendering
//!
//! Pure string builders: the browser entry point swaps the markup into the
//! page, tests inspect it directly.

use std::fmt::Write;

use crate::consts::*;
use crate::sim::{GameState, Position};

/// Board side length in pixels
pub const BOARD_PX: i32 = GRID_SIZE * CELL_SIZE;

const GRID_STROKE: &str = "#ddd";
const PLAYER_FILL: &str = "blue";
const OPPONENT_FILL: &str = "red";
const ITEM_FILL: &str = "gold";

/// Pixel center of a cell
pub fn cell_center(pos: Position) -> (i32, i32) {
    (
        pos.x * CELL_SIZE + CELL_SIZE / 2,
        pos.y * CELL_SIZE + CELL_SIZE / 2,
    )
}

/// Full SVG document for the current state
pub fn board_svg(state: &GameState) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}">"#,
        BOARD_PX
    );

    // Grid lines
    for i in 0..GRID_SIZE {
        let p = i * CELL_SIZE;
        let _ = write!(
            svg,
            r#"<line x1="0" y1="{p}" x2="{BOARD_PX}" y2="{p}" stroke="{GRID_STROKE}" stroke-width="1"/>"#
        );
        let _ = write!(
            svg,
            r#"<line x1="{p}" y1="0" x2="{p}" y2="{BOARD_PX}" stroke="{GRID_STROKE}" stroke-width="1"/>"#
        );
    }

    push_token(&mut svg, state.player, PLAYER_FILL);
    for opponent in &state.opponents {
        push_token(&mut svg, *opponent, OPPONENT_FILL);
    }

    // Items: half-cell squares, centered
    let side = CELL_SIZE / 2;
    for item in &state.items {
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{side}" height="{side}" fill="{ITEM_FILL}"/>"#,
            item.x * CELL_SIZE + CELL_SIZE / 4,
            item.y * CELL_SIZE + CELL_SIZE / 4,
        );
    }

    svg.push_str("</svg>");
    svg
}

fn push_token(svg: &mut String, pos: Position, fill: &str) {
    let (cx, cy) = cell_center(pos);
    let _ = write!(
        svg,
        r#"<circle cx="{cx}" cy="{cy}" r="{}" fill="{fill}"/>"#,
        CELL_SIZE / 3
    );
}

pub fn score_text(state: &GameState) -> String {
    format!("Score: {}", state.score)
}

pub fn difficulty_text(state: &GameState) -> String {
    format!("Difficulty: {}", state.difficulty_level)
}

pub fn final_score_text(state: &GameState) -> String {
    format!("Final Score: {}", state.score)
}
