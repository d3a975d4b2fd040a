//! Constants for board geometry, text glyphs and game defaults.
//!
//! Board size is a runtime value (each game picks its own), so unlike a
//! fixed-size engine nothing here is derived from a single `N`.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest board the engine accepts.
pub const MIN_SIZE: usize = 2;

/// Largest board the engine accepts (text vertices run out at Z).
pub const MAX_SIZE: usize = 25;

/// Board size used when none is configured.
pub const DEFAULT_SIZE: usize = 19;

/// Smallest board with fixed handicap star points.
pub const MIN_HANDICAP_SIZE: usize = 7;

/// Maximum number of fixed handicap stones.
pub const MAX_HANDICAP: u32 = 9;

/// Column letters for text vertices. `I` is skipped by Go convention.
pub const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Game Defaults
// =============================================================================

/// Komi (compensation points for White) used when none is configured.
pub const DEFAULT_KOMI: f64 = 7.5;

/// Random games stop after `size * size * PLAYOUT_LEN_FACTOR` moves.
pub const PLAYOUT_LEN_FACTOR: usize = 3;

// =============================================================================
// Text Glyphs
// =============================================================================

/// Black stone.
pub const GLYPH_BLACK: char = 'x';

/// White stone.
pub const GLYPH_WHITE: char = 'o';

/// Empty point.
pub const GLYPH_EMPTY: char = '.';

/// Result string for a game where both sides have the same score.
pub const DRAW_RESULT: &str = "Draw";
