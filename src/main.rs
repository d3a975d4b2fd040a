//! Weiqi: command-line front end for the Go rules engine.
//!
//! ## Usage
//!
//! - `weiqi` - Show a demo
//! - `weiqi gtp` - Start a GTP server for GUI integration
//! - `weiqi score <file>` - Count a board stored as `x`/`o`/`.` text
//! - `weiqi random --seed N` - Play and count a random game
//! - `weiqi demo` - Walk through a short scripted game
//!
//! Set `RUST_LOG=weiqi_core=debug` to see the engine's reasoning on stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use weiqi_core::board::Board;
use weiqi_core::game::{Game, GameConfig};
use weiqi_core::grid::Color;
use weiqi_core::gtp::GtpEngine;
use weiqi_core::playout::random_game;
use weiqi_core::position::Move;

/// Weiqi: a rules engine for the game of Go
#[derive(Parser)]
#[command(name = "weiqi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with a game configuration (size, komi, handicap)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Board size, overriding the configuration
    #[arg(long, global = true)]
    size: Option<usize>,

    /// Komi, overriding the configuration
    #[arg(long, global = true)]
    komi: Option<f64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Count a board written as rows of `x`, `o` and `.`
    Score {
        file: PathBuf,
        /// Vertices of stones to mark dead before counting, e.g. `D4`
        #[arg(long, value_delimiter = ',')]
        dead: Vec<String>,
        /// Handicap stones already on the board
        #[arg(long, default_value_t = 0)]
        handicap: u32,
    },
    /// Play a random game and count it
    Random {
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Run a short scripted demo of the engine
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::new(config.size, config.komi)?;
            engine.run()?;
        }
        Some(Commands::Score {
            file,
            dead,
            handicap,
        }) => run_score(&file, &dead, handicap, config.komi)?,
        Some(Commands::Random { seed }) => run_random(config.size, config.komi, seed)?,
        Some(Commands::Demo) | None => run_demo()?,
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(size) = cli.size {
        config = config.with_size(size);
    }
    if let Some(komi) = cli.komi {
        config = config.with_komi(komi);
    }
    Ok(config)
}

fn run_score(file: &Path, dead: &[String], handicap: u32, komi: f64) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let mut board = text.parse::<Board>().context("parsing board")?;

    for vertex in dead {
        let Some(pt) = board.position().grid.parse_vertex(vertex)? else {
            bail!("cannot mark a pass as dead");
        };
        board.mark_dead(pt)?;
    }
    let mut pos = board.position().clone();
    pos.handicap = handicap;
    let score = weiqi_core::scoring::count_score(&pos, komi);

    print!("{board}");
    println!("Black: {}", score.black);
    println!("White: {}", score.white);
    println!("Result: {}", score.result);
    Ok(())
}

fn run_random(size: usize, komi: f64, seed: u64) -> Result<()> {
    let board = random_game(size, seed)?;
    let score = board.score(komi);
    print!("{board}");
    println!("Moves: {}", board.tree().len());
    println!("Result: {}", score.result);
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Weiqi: Go rules engine\n");

    println!("=== Capture ===");
    let mut board: Board = ".....\n..o..\n.oxo.\n.....\n.....".parse()?;
    board.set_first_player(Color::White)?;
    let pt = board.position().grid.point(2, 3)?;
    board.play(Move::Play(pt))?;
    print!("{board}");
    println!("White at {} captures one stone\n", board.position().grid.vertex(pt));

    println!("=== Counting ===");
    let config = GameConfig::default().with_size(5).with_komi(0.5);
    let mut game = Game::new(config)?;
    let now = Instant::now();
    for (color, x, y) in [
        (Color::Black, 1, 0),
        (Color::White, 3, 0),
        (Color::Black, 1, 1),
        (Color::White, 3, 1),
        (Color::Black, 1, 2),
        (Color::White, 3, 2),
        (Color::Black, 1, 3),
        (Color::White, 3, 3),
        (Color::Black, 1, 4),
        (Color::White, 3, 4),
    ] {
        let pt = game.board().position().grid.point(x, y)?;
        game.play(color, Move::Play(pt), now)?;
    }
    game.play(Color::Black, Move::Pass, now)?;
    let stage = game.play(Color::White, Move::Pass, now)?;
    print!("{}", game.board());
    println!("Stage: {stage}");
    println!("Score: {}", game.score().result);

    let result = game.score().result;
    game.confirm_score(Color::Black, &result)?;
    let stage = game.confirm_score(Color::White, &result)?;
    println!("Stage after both confirm: {stage}");
    let snapshot = game.snapshot();
    println!("Snapshot: stage={} result={:?}", snapshot.stage, snapshot.result);
    Ok(())
}
