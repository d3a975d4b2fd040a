//! Random playouts.
//!
//! A playout plays uniformly random legal moves, never filling its own true
//! eyes, until both players pass. Used for the `random` CLI command, the
//! GTP `genmove` fallback and property tests that need many varied games.

use fastrand::Rng;
use tracing::debug;

use crate::board::Board;
use crate::constants::PLAYOUT_LEN_FACTOR;
use crate::error::Result;
use crate::grid::{Color, Grid, Point};
use crate::position::{Move, Position};

/// Color of an empty point whose orthogonal neighbors all share one color.
///
/// Returns `None` for stones, mixed surroundings and points with no stone
/// neighbor at all.
pub fn is_eyeish(grid: &Grid, pt: Point) -> Option<Color> {
    if grid.at(pt).is_some() {
        return None;
    }
    let mut eye_color = None;
    for n in grid.neighbors(pt) {
        let c = grid.at(n)?;
        match eye_color {
            None => eye_color = Some(c),
            Some(e) if e != c => return None,
            Some(_) => {}
        }
    }
    eye_color
}

/// Color of a true eye at `pt`.
///
/// An eyeish point is a false eye when the opponent holds too many of its
/// diagonals: two in the centre, one on the edge or in the corner.
pub fn is_eye(grid: &Grid, pt: Point) -> Option<Color> {
    let eye_color = is_eyeish(grid, pt)?;
    let false_color = eye_color.opponent();
    let (x, y) = grid.xy(pt);
    let size = grid.size() as isize;

    let mut false_count = 0;
    let mut at_edge = 0;
    for (dx, dy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
        let (dx, dy) = (x as isize + dx, y as isize + dy);
        if dx < 0 || dy < 0 || dx >= size || dy >= size {
            at_edge = 1;
            continue;
        }
        if grid.at(dy as usize * grid.size() + dx as usize) == Some(false_color) {
            false_count += 1;
        }
    }
    if false_count + at_edge >= 2 {
        return None;
    }
    Some(eye_color)
}

/// Pick a random legal move for the color to move, skipping its own true
/// eyes. `None` means the player should pass.
pub fn random_move(pos: &Position, rng: &mut Rng) -> Option<Point> {
    let mut candidates: Vec<Point> = pos
        .grid
        .points()
        .filter(|&pt| pos.at(pt).is_none() && is_eye(&pos.grid, pt) != Some(pos.current))
        .collect();
    rng.shuffle(&mut candidates);
    candidates.into_iter().find(|&pt| pos.check_legal(pt).is_ok())
}

/// Play a whole random game on an empty board.
///
/// The game stops after two consecutive passes or once it reaches
/// `size * size * PLAYOUT_LEN_FACTOR` moves. The same seed always produces
/// the same record.
pub fn random_game(size: usize, seed: u64) -> Result<Board> {
    let mut board = Board::new(size, None)?;
    let mut rng = Rng::with_seed(seed);
    let max_moves = size * size * PLAYOUT_LEN_FACTOR;

    let mut moves = 0;
    while moves < max_moves && !board.both_passed() {
        let mv = match random_move(board.position(), &mut rng) {
            Some(pt) => Move::Play(pt),
            None => Move::Pass,
        };
        board.play(mv)?;
        moves += 1;
    }
    debug!(size, seed, moves, "finished random game");
    Ok(board)
}
