//! Game stages, results and turn/clock enforcement around a [`Board`].
//!
//! A game moves through `Playing → Counting → Finished`. Two consecutive
//! passes start counting; during counting players toggle dead stones, each
//! toggle re-scores immediately, and the game finishes once both players
//! confirm the same result. Resignation and timeouts finish it early.
//!
//! Free-form demo boards skip this layer and drive a [`Board`] directly.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::constants::{DEFAULT_KOMI, DEFAULT_SIZE};
use crate::error::{GameError, Result};
use crate::grid::{Color, Point};
use crate::position::Move;
use crate::scoring::{Outcome, Score};
use crate::timing::{Clock, Unlimited};
use crate::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Playing,
    Counting,
    Finished,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Playing => write!(f, "playing"),
            Stage::Counting => write!(f, "counting"),
            Stage::Finished => write!(f, "finished"),
        }
    }
}

/// Game setup parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board size (NxN)
    pub size: usize,
    /// Compensation points for White
    pub komi: f64,
    /// Fixed handicap stones for Black; fewer than two means none
    pub handicap: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            komi: DEFAULT_KOMI,
            handicap: 0,
        }
    }
}

impl GameConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_komi(mut self, komi: f64) -> Self {
        self.komi = komi;
        self
    }

    pub fn with_handicap(mut self, handicap: u32) -> Self {
        self.handicap = handicap;
        self
    }
}

/// Plain view of a game handed to subscribers after each change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub stage: Stage,
    pub result: Option<String>,
    pub node: Option<Node>,
}

/// A game between two players, one per color.
pub struct Game<C = Unlimited> {
    board: Board,
    config: GameConfig,
    stage: Stage,
    result: Option<Outcome>,
    black_confirmed: Option<String>,
    white_confirmed: Option<String>,
    clock: C,
}

impl Game<Unlimited> {
    /// Game without a time limit.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_clock(config, Unlimited)
    }
}

impl<C: Clock> Game<C> {
    /// Set up the board, placing handicap stones and giving White the first
    /// move when there are any.
    pub fn with_clock(config: GameConfig, clock: C) -> Result<Self> {
        let mut board = Board::new(config.size, None)?;
        if !board.place_handicap(config.handicap)?.is_empty() {
            board.set_first_player(Color::White)?;
        }
        Ok(Self {
            board,
            config,
            stage: Stage::Playing,
            result: None,
            black_confirmed: None,
            white_confirmed: None,
            clock,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn result(&self) -> Option<Outcome> {
        self.result
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Handle a move by `color` at time `now`.
    ///
    /// Returns the stage after the move. A mover whose time ran out loses
    /// on time instead of moving; that is not an error.
    pub fn play(&mut self, color: Color, mv: Move, now: Instant) -> Result<Stage> {
        if self.stage == Stage::Finished {
            return Err(self.stage_error("play"));
        }
        if mv == Move::Resign {
            self.resign(color)?;
            return Ok(self.stage);
        }
        if self.stage != Stage::Playing {
            return Err(self.stage_error("play"));
        }
        if color != self.board.current() {
            return Err(GameError::InvalidPlayer(color));
        }
        if self.clock.expired(color, now) {
            self.finish(Outcome::Timeout {
                winner: color.opponent(),
            });
            return Ok(self.stage);
        }

        self.board.play(mv)?;
        self.clock.record_move(color, now);

        if self.board.both_passed() {
            debug!("both players passed, counting");
            self.stage = Stage::Counting;
            self.update_score();
        }
        Ok(self.stage)
    }

    /// `color` gives up. Allowed while playing or counting.
    pub fn resign(&mut self, color: Color) -> Result<()> {
        if self.stage == Stage::Finished {
            return Err(self.stage_error("resign"));
        }
        self.finish(Outcome::Resignation {
            winner: color.opponent(),
        });
        Ok(())
    }

    /// Finish a playing game whose mover has run out of time.
    pub fn check_time(&mut self, now: Instant) -> Stage {
        let mover = self.board.current();
        if self.stage == Stage::Playing && self.clock.expired(mover, now) {
            self.finish(Outcome::Timeout {
                winner: mover.opponent(),
            });
        }
        self.stage
    }

    /// Flip the dead mark at `pt` during counting and re-score at once.
    pub fn toggle_marked_dead(&mut self, pt: Point) -> Result<Score> {
        if self.stage != Stage::Counting {
            return Err(self.stage_error("mark dead stones"));
        }
        self.board.toggle_marked_dead(pt)?;
        Ok(self.update_score())
    }

    /// Accept `result` on behalf of `color`. The game finishes when both
    /// players have accepted the same result.
    pub fn confirm_score(&mut self, color: Color, result: &str) -> Result<Stage> {
        if self.stage != Stage::Counting {
            return Err(self.stage_error("confirm the score"));
        }
        let expected = self.result.map(|r| r.to_string()).unwrap_or_default();
        if result != expected {
            return Err(GameError::ResultMismatch {
                expected,
                got: result.to_string(),
            });
        }

        let confirmed = Some(expected);
        match color {
            Color::Black => self.black_confirmed = confirmed,
            Color::White => self.white_confirmed = confirmed,
        }
        if self.black_confirmed.is_some() && self.black_confirmed == self.white_confirmed {
            self.stage = Stage::Finished;
            info!(result = %result, "score confirmed");
        }
        Ok(self.stage)
    }

    /// Count the current position with this game's komi.
    pub fn score(&self) -> Score {
        self.board.score(self.config.komi)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            stage: self.stage,
            result: self.result.map(|r| r.to_string()),
            node: self.board.current_node().cloned(),
        }
    }

    fn update_score(&mut self) -> Score {
        let score = self.score();
        self.result = Some(score.outcome());
        self.board.set_score_points(score.points.clone());
        score
    }

    fn finish(&mut self, outcome: Outcome) {
        self.stage = Stage::Finished;
        self.result = Some(outcome);
        info!(result = %outcome, "game finished");
    }

    fn stage_error(&self, action: &'static str) -> GameError {
        GameError::InvalidStage {
            stage: self.stage,
            action,
        }
    }
}
