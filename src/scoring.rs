//! Area counting (stones plus surrounded territory).
//!
//! Dead-marked stones are lifted off a scratch copy of the grid before
//! counting, so the authoritative board is never touched. Empty regions
//! bordered by a single color belong to that color; regions touching both
//! colors (or none) are dame.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{bordering_colors, loose_chain_at};
use crate::constants::DRAW_RESULT;
use crate::grid::Color;
use crate::position::Position;

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Points { winner: Color, margin: f64 },
    Draw,
    Resignation { winner: Color },
    Timeout { winner: Color },
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Points { winner, .. }
            | Outcome::Resignation { winner }
            | Outcome::Timeout { winner } => Some(*winner),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Points { winner, margin } => write!(f, "{}+{margin}", winner.letter()),
            Outcome::Draw => write!(f, "{DRAW_RESULT}"),
            Outcome::Resignation { winner } => write!(f, "{}+R", winner.letter()),
            Outcome::Timeout { winner } => write!(f, "{}+T", winner.letter()),
        }
    }
}

/// Result of one counting pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Live black stones plus black territory
    pub black: f64,
    /// Live white stones plus white territory, komi and handicap bonus
    pub white: f64,
    /// `None` on a draw
    pub winner: Option<Color>,
    pub margin: f64,
    /// Canonical result string, e.g. `"W+4.5"`
    pub result: String,
    /// Owner of every intersection; `None` for dame
    pub points: Vec<Option<Color>>,
}

impl Score {
    pub fn outcome(&self) -> Outcome {
        match self.winner {
            Some(winner) => Outcome::Points {
                winner,
                margin: self.margin,
            },
            None => Outcome::Draw,
        }
    }
}

/// Count the position with area scoring.
///
/// White receives `komi` plus one point per handicap stone. Handicap stones
/// on the board are counted as ordinary black stones.
pub fn count_score(pos: &Position, komi: f64) -> Score {
    let mut view = pos.grid.clone();
    for &pt in &pos.dead {
        view.clear(pt);
    }

    let mut points = vec![None; view.area()];
    let mut visited = vec![false; view.area()];
    for pt in view.points() {
        if let Some(color) = view.at(pt) {
            points[pt] = Some(color);
            continue;
        }
        if visited[pt] {
            continue;
        }
        let region = loose_chain_at(&view, pt);
        let owner = match bordering_colors(&view, &region) {
            (true, false) => Some(Color::Black),
            (false, true) => Some(Color::White),
            _ => None,
        };
        for &r in &region {
            visited[r] = true;
            points[r] = owner;
        }
    }

    let owned = |color| points.iter().filter(|p| **p == Some(color)).count() as f64;
    let black = owned(Color::Black);
    let white = owned(Color::White) + komi + f64::from(pos.handicap);

    let winner = if black > white {
        Some(Color::Black)
    } else if white > black {
        Some(Color::White)
    } else {
        None
    };
    let margin = (black - white).abs();

    let mut score = Score {
        black,
        white,
        winner,
        margin,
        result: String::new(),
        points,
    };
    score.result = score.outcome().to_string();
    debug!(black, white, result = %score.result, "counted score");
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_is_all_dame() {
        let pos = Position::new(9).unwrap();
        let score = count_score(&pos, 7.5);
        assert_eq!(score.black, 0.0);
        assert_eq!(score.white, 7.5);
        assert_eq!(score.result, "W+7.5");
        assert!(score.points.iter().all(Option::is_none));
    }

    #[test]
    fn test_draw() {
        let pos = Position::from_grid("x.o\nx.o\nx.o".parse().unwrap());
        let score = count_score(&pos, 0.0);
        assert_eq!(score.black, 3.0);
        assert_eq!(score.white, 3.0);
        assert_eq!(score.winner, None);
        assert_eq!(score.result, "Draw");
    }

    #[test]
    fn test_full_board_scores() {
        let pos = Position::from_grid("xxo\nxxo\nxxo".parse().unwrap());
        let score = count_score(&pos, 0.5);
        assert_eq!(score.black, 6.0);
        assert_eq!(score.white, 3.5);
        assert_eq!(score.result, "B+2.5");
    }

    #[test]
    fn test_integer_margin_formatting() {
        let outcome = Outcome::Points {
            winner: Color::Black,
            margin: 4.0,
        };
        assert_eq!(outcome.to_string(), "B+4");
        assert_eq!(Outcome::Resignation { winner: Color::White }.to_string(), "W+R");
        assert_eq!(Outcome::Timeout { winner: Color::Black }.to_string(), "B+T");
    }

    #[test]
    fn test_dead_marks_do_not_touch_board() {
        let mut pos = Position::from_grid("xx.\n.ox\n..x".parse().unwrap());
        pos.mark_dead(4).unwrap();
        let before = pos.grid.clone();
        let score = count_score(&pos, 0.0);
        assert_eq!(pos.grid, before);
        assert_eq!(score.black, 9.0);
    }
}
