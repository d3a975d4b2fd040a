//! Error types for rule violations and malformed input.

use thiserror::Error;

use crate::game::Stage;
use crate::grid::{Color, Point};
use crate::tree::NodeId;

/// Why a move was rejected by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not empty
    #[error("illegal move: point not empty")]
    Occupied,
    /// Move retakes the ko point
    #[error("illegal move: retakes ko")]
    Ko,
    /// Move would leave its own chain without liberties and captures nothing
    #[error("illegal move: suicide")]
    Suicide,
    /// Resignation ends a game; it is never placed on the board
    #[error("illegal move: resignation is not a board move")]
    Resign,
}

/// Errors surfaced by the engine and the game stage layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error(transparent)]
    IllegalMove(#[from] MoveError),

    #[error("invalid coordinate {point} on a {size}x{size} board")]
    InvalidCoordinate { point: Point, size: usize },

    #[error("invalid coordinate ({x}, {y}) on a {size}x{size} board")]
    InvalidPoint { x: usize, y: usize, size: usize },

    #[error("unknown node id {0}")]
    InvalidNode(NodeId),

    #[error("unsupported board size {0}")]
    InvalidSize(usize),

    #[error("cannot place {count} handicap stones on a {size}x{size} board")]
    InvalidHandicap { count: u32, size: usize },

    #[error("the game record already has moves")]
    AlreadyStarted,

    #[error("corrupt board state: {0}")]
    CorruptState(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("it is not {0}'s turn")]
    InvalidPlayer(Color),

    #[error("cannot {action} while the game is {stage}")]
    InvalidStage { stage: Stage, action: &'static str },

    #[error("got incorrect result: expected {expected}, got {got}")]
    ResultMismatch { expected: String, got: String },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, GameError>;
