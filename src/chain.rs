//! Chain detection and liberty counting.
//!
//! All functions are stateless flood fills over a borrowed [`Grid`]. Results
//! are ordered sets so callers can compare and serialize them directly.

use std::collections::BTreeSet;

use crate::grid::{Color, Grid, Point};

/// Maximal 4-connected set of same-color stones containing `start`.
///
/// Empty if `start` holds no stone.
pub fn chain_at(grid: &Grid, start: Point) -> BTreeSet<Point> {
    match grid.at(start) {
        Some(color) => flood(grid, start, |c| c == Some(color), |c| c == Some(color)),
        None => BTreeSet::new(),
    }
}

/// Stones reachable from `start` through stones of its color and empty points.
///
/// Only the stones are returned; the empty points crossed on the way are not.
/// This is the unit of dead-stone marking: a dead group together with the
/// scattered stones sharing its eye space. From an empty point the result is
/// the connected empty region.
pub fn loose_chain_at(grid: &Grid, start: Point) -> BTreeSet<Point> {
    match grid.at(start) {
        Some(color) => flood(
            grid,
            start,
            |c| c.is_none() || c == Some(color),
            |c| c == Some(color),
        ),
        None => flood(grid, start, |c| c.is_none(), |c| c.is_none()),
    }
}

/// Empty points adjacent to any stone of `chain`.
pub fn liberties(grid: &Grid, chain: &BTreeSet<Point>) -> BTreeSet<Point> {
    chain
        .iter()
        .flat_map(|&pt| grid.neighbors(pt))
        .filter(|&n| grid.at(n).is_none())
        .collect()
}

/// Whether any point of `region` touches a black or a white stone.
///
/// Returns `(touches_black, touches_white)`.
pub fn bordering_colors(grid: &Grid, region: &BTreeSet<Point>) -> (bool, bool) {
    let mut black = false;
    let mut white = false;
    for n in region.iter().flat_map(|&pt| grid.neighbors(pt)) {
        match grid.at(n) {
            Some(Color::Black) => black = true,
            Some(Color::White) => white = true,
            None => {}
        }
    }
    (black, white)
}

/// Depth-first fill from `start` over points whose color satisfies
/// `passable`, collecting those that satisfy `keep`.
fn flood(
    grid: &Grid,
    start: Point,
    passable: impl Fn(Option<Color>) -> bool,
    keep: impl Fn(Option<Color>) -> bool,
) -> BTreeSet<Point> {
    let mut out = BTreeSet::new();
    if !grid.contains(start) {
        return out;
    }
    let mut visited = vec![false; grid.area()];
    let mut stack = vec![start];

    while let Some(pt) = stack.pop() {
        if visited[pt] {
            continue;
        }
        visited[pt] = true;

        let c = grid.at(pt);
        if keep(c) {
            out.insert(pt);
        }
        for n in grid.neighbors(pt) {
            if !visited[n] && passable(grid.at(n)) {
                stack.push(n);
            }
        }
    }
    out
}
