//! Weiqi-Core: rules engine for the game of Go.
//!
//! This crate holds the authoritative board state of a Go game: legal move
//! execution with captures, suicide and ko, a branching game record with
//! free-form edits and annotations, dead-stone marking and area scoring.
//! Timing and the surrounding game stages live at the edge in [`game`] and
//! [`timing`].
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, glyphs and defaults
//! - [`error`] - Move and game errors
//! - [`grid`] - Colors, points and the flat stone grid
//! - [`chain`] - Chains, loose chains, liberties and regions
//! - [`position`] - Move execution, handicap and dead marks
//! - [`tree`] - Game tree of moves, passes and edits
//! - [`board`] - Position plus game tree, navigation and persistence
//! - [`scoring`] - Area counting and results
//! - [`timing`] - Clock interface with byo-yomi
//! - [`game`] - Game stages, turn order and score confirmation
//! - [`playout`] - Random legal moves and whole random games
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use weiqi_core::board::Board;
//! use weiqi_core::grid::Color;
//! use weiqi_core::position::Move;
//!
//! let mut board = Board::new(9, None).unwrap();
//! let d4 = board.position().grid.parse_vertex("D4").unwrap().unwrap();
//! board.play(Move::Play(d4)).unwrap();
//! assert_eq!(board.at(d4), Some(Color::Black));
//!
//! board.pass_turn().unwrap();
//! board.pass_turn().unwrap();
//! assert!(board.both_passed());
//! println!("{}", board.score(7.5).result);
//! ```

pub mod board;
pub mod chain;
pub mod constants;
pub mod error;
pub mod game;
pub mod grid;
pub mod gtp;
pub mod playout;
pub mod position;
pub mod scoring;
pub mod timing;
pub mod tree;
