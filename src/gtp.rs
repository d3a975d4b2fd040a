//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the subset of GTP version 2 needed to drive the
//! rules engine from a graphical client such as Sabaki or GoGui.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - Start over on a new board size
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Set komi
//! - `fixed_handicap <n>` - Place handicap stones; White moves next
//! - `play <color> <vertex>` - Play a move
//! - `genmove <color>` - Play a random legal move for the given color
//! - `showboard` - Print the board
//! - `final_score` - Count the board as it stands
//!
//! ## Example
//!
//! ```no_run
//! use weiqi_core::gtp::GtpEngine;
//! let mut engine = GtpEngine::new(19, 7.5).unwrap();
//! engine.run().unwrap();
//! ```

use std::io::{self, BufRead, Write};

use fastrand::Rng;
use tracing::{debug, warn};

use crate::board::Board;
use crate::error::Result;
use crate::grid::Color;
use crate::playout::random_move;
use crate::position::Move;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "fixed_handicap",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    /// Current game record
    board: Board,
    komi: f64,
    rng: Rng,
}

impl GtpEngine {
    pub fn new(size: usize, komi: f64) -> Result<Self> {
        Ok(Self {
            board: Board::new(size, None)?,
            komi,
            rng: Rng::new(),
        })
    }

    /// Fix the seed used by `genmove`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::with_seed(seed);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop over arbitrary streams until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!(command = %command, error = %message, "gtp command failed");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        debug!(command, ?args, "gtp command");
        match command {
            "name" => (true, "weiqi".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(size) = arg.parse::<usize>() else {
                    return (false, "invalid size".to_string());
                };
                match Board::new(size, None) {
                    Ok(board) => {
                        self.board = board;
                        (true, String::new())
                    }
                    Err(_) => (false, "unacceptable size".to_string()),
                }
            }

            "clear_board" => {
                self.reset();
                (true, String::new())
            }

            "komi" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<f64>() {
                    Ok(komi) => {
                        self.komi = komi;
                        (true, String::new())
                    }
                    Err(_) => (false, "invalid komi".to_string()),
                }
            }

            "fixed_handicap" => {
                let Some(Ok(count)) = args.first().map(|a| a.parse::<u32>()) else {
                    return (false, "invalid number of stones".to_string());
                };
                if count < 2 {
                    return (false, "invalid number of stones".to_string());
                }
                let placed = self
                    .board
                    .place_handicap(count)
                    .and_then(|points| {
                        self.board.set_first_player(Color::White)?;
                        Ok(points)
                    });
                match placed {
                    Ok(points) => {
                        let grid = &self.board.position().grid;
                        let vertices: Vec<String> =
                            points.iter().map(|&p| grid.vertex(p)).collect();
                        (true, vertices.join(" "))
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "play" => {
                let (Some(color), Some(vertex)) = (args.first(), args.get(1)) else {
                    return (false, "missing arguments".to_string());
                };
                let Some(color) = parse_color(color) else {
                    return (false, "invalid color".to_string());
                };
                if color != self.board.current() {
                    return (false, format!("illegal move: it is not {color}'s turn"));
                }
                let mv = match self.board.position().grid.parse_vertex(vertex) {
                    Ok(Some(pt)) => Move::Play(pt),
                    Ok(None) => Move::Pass,
                    Err(e) => return (false, e.to_string()),
                };
                match self.board.play(mv) {
                    Ok(_) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|c| parse_color(c)) else {
                    return (false, "invalid color".to_string());
                };
                if color != self.board.current() {
                    return (false, format!("it is not {color}'s turn"));
                }
                let mv = match random_move(self.board.position(), &mut self.rng) {
                    Some(pt) => Move::Play(pt),
                    None => Move::Pass,
                };
                if let Err(e) = self.board.play(mv) {
                    return (false, e.to_string());
                }
                match mv {
                    Move::Play(pt) => (true, self.board.position().grid.vertex(pt)),
                    _ => (true, "pass".to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.board).trim_end().to_string()),

            "final_score" => {
                let score = self.board.score(self.komi);
                match score.winner {
                    Some(_) => (true, score.result),
                    None => (true, "0".to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn reset(&mut self) {
        let size = self.board.size();
        if let Ok(board) = Board::new(size, None) {
            self.board = board;
        }
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}
