//! Go position and move execution.
//!
//! This module provides the rules half of the engine:
//! - Stone placement with capture resolution before the suicide test
//! - Ko rule enforcement (single-stone recapture)
//! - Fixed handicap placement
//! - Dead-stone marks used by scoring
//!
//! A [`Position`] knows nothing about history; the game tree in
//! [`crate::board`] replays positions node by node.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{chain_at, liberties, loose_chain_at};
use crate::constants::{MAX_HANDICAP, MIN_HANDICAP_SIZE};
use crate::error::{GameError, MoveError, Result};
use crate::grid::{Color, Grid, Point};

/// A move as issued by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Play(Point),
    Pass,
    Resign,
}

/// What a successful stone placement did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub point: Point,
    pub color: Color,
    /// Opponent stones removed by this move
    pub captured: Vec<Point>,
    /// Ko point created by this move, if any
    pub ko: Option<Point>,
}

/// A Go position (board state).
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    /// Stone placement
    pub grid: Grid,
    /// Color to move
    pub current: Color,
    /// Point the player to move may not play on (recapture of a ko)
    pub ko: Option<Point>,
    /// Number of handicap stones given to Black; scored as a bonus for White
    pub handicap: u32,
    /// Stones marked dead for counting; never removed from `grid`
    pub dead: BTreeSet<Point>,
}

impl Position {
    /// Empty position with Black to move.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(size)?))
    }

    /// Position over an existing stone placement with Black to move.
    pub fn from_grid(grid: Grid) -> Self {
        Position {
            grid,
            current: Color::Black,
            ko: None,
            handicap: 0,
            dead: BTreeSet::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn at(&self, pt: Point) -> Option<Color> {
        self.grid.at(pt)
    }

    /// Play a stone for the color to move.
    ///
    /// Captures are resolved before the suicide test, so a move that would
    /// have no liberties is still legal when it captures. On error the
    /// position is left unchanged.
    ///
    /// # Errors
    /// - `InvalidCoordinate` if `pt` is off the board
    /// - `IllegalMove(Occupied)` if the point is not empty
    /// - `IllegalMove(Ko)` if the move retakes the ko
    /// - `IllegalMove(Suicide)` if the move leaves its chain without liberties
    pub fn play(&mut self, pt: Point) -> Result<Placement> {
        self.grid.check(pt)?;
        if self.grid.at(pt).is_some() {
            debug!(point = pt, "rejected move on occupied point");
            return Err(MoveError::Occupied.into());
        }
        if self.ko == Some(pt) {
            debug!(point = pt, "rejected ko recapture");
            return Err(MoveError::Ko.into());
        }

        let color = self.current;
        let opponent = color.opponent();
        self.grid.set(pt, Some(color))?;

        let mut captured = Vec::new();
        for n in self.grid.neighbors(pt) {
            if self.grid.at(n) != Some(opponent) {
                continue;
            }
            let chain = chain_at(&self.grid, n);
            if liberties(&self.grid, &chain).is_empty() {
                for &stone in &chain {
                    self.grid.set(stone, None)?;
                }
                captured.extend(chain);
            }
        }

        let own = chain_at(&self.grid, pt);
        let own_liberties = liberties(&self.grid, &own);
        if captured.is_empty() && own_liberties.is_empty() {
            // Nothing was captured, so undoing the placement restores the board
            self.grid.set(pt, None)?;
            debug!(point = pt, "rejected suicide");
            return Err(MoveError::Suicide.into());
        }

        self.ko = if captured.len() == 1 && own.len() == 1 && own_liberties.len() == 1 {
            Some(captured[0])
        } else {
            None
        };
        if !captured.is_empty() {
            debug!(point = pt, %color, captured = captured.len(), ko = ?self.ko, "captured stones");
        }

        self.current = opponent;
        self.dead.clear();
        Ok(Placement {
            point: pt,
            color,
            captured,
            ko: self.ko,
        })
    }

    /// Pass: the turn changes and any ko is lifted.
    pub fn pass(&mut self) {
        self.current = self.current.opponent();
        self.ko = None;
    }

    /// Check whether the color to move may play at `pt` without changing anything.
    pub fn check_legal(&self, pt: Point) -> Result<()> {
        let mut trial = self.clone();
        trial.play(pt).map(|_| ())
    }

    /// Whether playing at `pt` would be suicide for the color to move.
    pub fn is_suicide(&self, pt: Point) -> bool {
        matches!(
            self.check_legal(pt),
            Err(GameError::IllegalMove(MoveError::Suicide))
        )
    }

    /// Put `count` black stones on the fixed star points.
    ///
    /// Fewer than two stones is no handicap at all. The color to move is left
    /// alone; handing the first move to White is the caller's decision.
    pub fn place_handicap(&mut self, count: u32) -> Result<Vec<Point>> {
        let points = handicap_points(self.size(), count)?;
        for &pt in &points {
            self.grid.set(pt, Some(Color::Black))?;
        }
        self.handicap = if points.is_empty() { 0 } else { count };
        Ok(points)
    }

    /// Mark every stone of the loose chain at `pt` as dead.
    pub fn mark_dead(&mut self, pt: Point) -> Result<()> {
        self.grid.check(pt)?;
        if self.grid.at(pt).is_some() {
            self.dead.extend(loose_chain_at(&self.grid, pt));
        }
        Ok(())
    }

    /// Flip the dead mark of the loose chain at `pt`.
    ///
    /// Returns whether the chain is marked dead afterwards. Empty points
    /// carry no mark and are left alone.
    pub fn toggle_marked_dead(&mut self, pt: Point) -> Result<bool> {
        self.grid.check(pt)?;
        if self.grid.at(pt).is_none() {
            return Ok(false);
        }
        let chain = loose_chain_at(&self.grid, pt);
        let marked = !self.dead.contains(&pt);
        let stones = chain.len();
        if marked {
            self.dead.extend(chain);
        } else {
            self.dead.retain(|p| !chain.contains(p));
        }
        debug!(point = pt, stones, marked, "toggled dead mark");
        Ok(marked)
    }

    pub fn is_marked_dead(&self, pt: Point) -> bool {
        self.dead.contains(&pt)
    }

    pub fn to_state(&self) -> PositionState {
        PositionState {
            size: self.size(),
            stones: self.grid.to_rows(),
            current: self.current,
            ko: self.ko,
            handicap: self.handicap,
            dead: self.dead.clone(),
        }
    }

    /// Rehydrate a position. A stone grid that disagrees with the declared
    /// size, or marks off the board, are fatal.
    pub fn from_state(state: &PositionState) -> Result<Self> {
        let grid = Grid::from_rows(state.size, &state.stones)?;
        if let Some(ko) = state.ko {
            if !grid.contains(ko) {
                return Err(GameError::CorruptState(format!("ko point {ko} is off the board")));
            }
        }
        if let Some(&pt) = state.dead.iter().find(|&&p| !grid.contains(p)) {
            return Err(GameError::CorruptState(format!("dead mark {pt} is off the board")));
        }
        Ok(Position {
            grid,
            current: state.current,
            ko: state.ko,
            handicap: state.handicap,
            dead: state.dead.clone(),
        })
    }
}

/// Interchange form of a [`Position`], used to persist and rehydrate games.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    pub size: usize,
    /// One row per line of the board, top row first
    pub stones: Vec<Vec<Option<Color>>>,
    pub current: Color,
    #[serde(default)]
    pub ko: Option<Point>,
    #[serde(default)]
    pub handicap: u32,
    #[serde(default)]
    pub dead: BTreeSet<Point>,
}

/// Fixed star points for `count` handicap stones.
///
/// Stones are added in the traditional order: opposite corners first, then
/// the remaining corners, the centre for odd counts, then the side points.
pub fn handicap_points(size: usize, count: u32) -> Result<Vec<Point>> {
    if count < 2 {
        return Ok(Vec::new());
    }
    let invalid = GameError::InvalidHandicap { count, size };
    if count > MAX_HANDICAP || size < MIN_HANDICAP_SIZE || (count > 4 && size % 2 == 0) {
        return Err(invalid);
    }

    let edge = if size >= 13 { 3 } else { 2 };
    let (lo, mid, hi) = (edge, size / 2, size - 1 - edge);
    let at = |x: usize, y: usize| y * size + x;

    let corners = [at(hi, lo), at(lo, hi), at(hi, hi), at(lo, lo)];
    let (left, right) = (at(lo, mid), at(hi, mid));
    let (top, bottom) = (at(mid, lo), at(mid, hi));
    let center = at(mid, mid);

    let mut points = corners[..count.min(4) as usize].to_vec();
    match count {
        5 => points.push(center),
        6 => points.extend([left, right]),
        7 => points.extend([left, right, center]),
        8 => points.extend([left, right, top, bottom]),
        9 => points.extend([left, right, top, bottom, center]),
        _ => {}
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(s: &str, current: Color) -> Position {
        let mut pos = Position::from_grid(s.parse().unwrap());
        pos.current = current;
        pos
    }

    #[test]
    fn test_empty_position() {
        let pos = Position::new(9).unwrap();
        assert!(pos.grid.points().all(|pt| pos.at(pt).is_none()));
        assert_eq!(pos.current, Color::Black);
        assert_eq!(pos.ko, None);
    }

    #[test]
    fn test_play_alternates() {
        let mut pos = Position::new(9).unwrap();
        let placement = pos.play(40).unwrap();
        assert_eq!(placement.color, Color::Black);
        assert!(placement.captured.is_empty());
        assert_eq!(pos.current, Color::White);
        assert_eq!(pos.at(40), Some(Color::Black));
    }

    #[test]
    fn test_play_occupied() {
        let mut pos = Position::new(9).unwrap();
        pos.play(40).unwrap();
        assert_eq!(pos.play(40), Err(GameError::IllegalMove(MoveError::Occupied)));
        assert_eq!(pos.current, Color::White);
    }

    #[test]
    fn test_play_off_board() {
        let mut pos = Position::new(9).unwrap();
        assert!(matches!(
            pos.play(81),
            Err(GameError::InvalidCoordinate { point: 81, size: 9 })
        ));
    }

    #[test]
    fn test_play_suicide_rolls_back() {
        let mut pos = position(".x.\nx..\n...", Color::White);
        let before = pos.clone();
        assert_eq!(pos.play(0), Err(GameError::IllegalMove(MoveError::Suicide)));
        assert_eq!(pos, before);
    }

    #[test]
    fn test_capture_corner() {
        let mut pos = position("ox.\n...\n...", Color::Black);
        let placement = pos.play(3).unwrap();
        assert_eq!(placement.captured, vec![0]);
        assert_eq!(pos.at(0), None);
    }

    #[test]
    fn test_pass_clears_ko() {
        let mut pos = Position::new(9).unwrap();
        pos.ko = Some(10);
        pos.pass();
        assert_eq!(pos.ko, None);
        assert_eq!(pos.current, Color::White);
    }

    #[test]
    fn test_check_legal_does_not_mutate() {
        let pos = position(".x.\nx..\n...", Color::White);
        assert!(pos.is_suicide(0));
        assert!(!pos.is_suicide(4));
        assert!(pos.check_legal(4).is_ok());
        assert_eq!(pos.at(4), None);
        assert_eq!(pos.current, Color::White);
    }

    #[test]
    fn test_handicap_points_19() {
        let points = handicap_points(19, 9).unwrap();
        let mut xy: Vec<(usize, usize)> = points.iter().map(|p| (p % 19, p / 19)).collect();
        xy.sort();
        assert_eq!(
            xy,
            vec![(3, 3), (3, 9), (3, 15), (9, 3), (9, 9), (9, 15), (15, 3), (15, 9), (15, 15)]
        );
    }

    #[test]
    fn test_handicap_rejected() {
        assert!(handicap_points(9, 10).is_err());
        assert!(handicap_points(5, 2).is_err());
        assert!(handicap_points(10, 5).is_err());
        assert_eq!(handicap_points(10, 4).unwrap().len(), 4);
        assert!(handicap_points(5, 1).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_marked_dead_flips_loose_chain() {
        let mut pos = position("x.x\n...\n..o", Color::Black);
        assert!(pos.toggle_marked_dead(0).unwrap());
        assert!(pos.is_marked_dead(0));
        assert!(pos.is_marked_dead(2));
        assert!(!pos.is_marked_dead(8));

        assert!(!pos.toggle_marked_dead(2).unwrap());
        assert!(!pos.is_marked_dead(0));
        assert!(!pos.is_marked_dead(2));
        assert!(pos.dead.is_empty());

        assert!(!pos.toggle_marked_dead(4).unwrap());
        assert!(pos.dead.is_empty());
    }

    #[test]
    fn test_state_roundtrip() {
        let mut pos = position("xo.\n.x.\n..o", Color::White);
        pos.ko = Some(2);
        pos.handicap = 2;
        pos.mark_dead(8).unwrap();
        let state = pos.to_state();
        assert_eq!(Position::from_state(&state).unwrap(), pos);
    }

    #[test]
    fn test_state_size_mismatch() {
        let mut state = Position::new(9).unwrap().to_state();
        state.size = 13;
        assert!(matches!(
            Position::from_state(&state),
            Err(GameError::CorruptState(_))
        ));
    }
}
