//! Flat coordinate space over an N×N board.
//!
//! Points are row-major indices `y * size + x` with `(0, 0)` in the top-left
//! corner. The grid only stores stones; rules live in [`crate::position`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{COLUMN_LETTERS, GLYPH_BLACK, GLYPH_EMPTY, GLYPH_WHITE, MAX_SIZE, MIN_SIZE};
use crate::error::{GameError, Result};

/// Stone color. An empty intersection is `None` wherever an `Option<Color>` is stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Single letter used in result strings (`B+R`, `W+4.5`).
    pub fn letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Color::Black => GLYPH_BLACK,
            Color::White => GLYPH_WHITE,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// An intersection, as an index into the flat grid.
pub type Point = usize;

/// Orthogonal neighbors of a point, clipped at the board edge.
pub type Neighbors = std::iter::Flatten<std::array::IntoIter<Option<Point>, 4>>;

/// Stone placement over a square board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Color>>,
}

impl Grid {
    /// Create an empty grid, rejecting sizes outside `MIN_SIZE..=MAX_SIZE`.
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of intersections.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// All points in row-major order.
    pub fn points(&self) -> std::ops::Range<Point> {
        0..self.cells.len()
    }

    pub fn contains(&self, pt: Point) -> bool {
        pt < self.cells.len()
    }

    /// Defensive range check for points coming from callers.
    pub fn check(&self, pt: Point) -> Result<Point> {
        if self.contains(pt) {
            Ok(pt)
        } else {
            Err(GameError::InvalidCoordinate {
                point: pt,
                size: self.size,
            })
        }
    }

    /// Point for 0-based column `x` and row `y`.
    pub fn point(&self, x: usize, y: usize) -> Result<Point> {
        if x >= self.size || y >= self.size {
            return Err(GameError::InvalidPoint {
                x,
                y,
                size: self.size,
            });
        }
        Ok(y * self.size + x)
    }

    /// 0-based `(x, y)` of a point.
    pub fn xy(&self, pt: Point) -> (usize, usize) {
        (pt % self.size, pt / self.size)
    }

    /// Stone at `pt`; out-of-range points read as empty.
    pub fn at(&self, pt: Point) -> Option<Color> {
        self.cells.get(pt).copied().flatten()
    }

    pub fn set(&mut self, pt: Point, color: Option<Color>) -> Result<()> {
        self.check(pt)?;
        self.cells[pt] = color;
        Ok(())
    }

    /// Remove and return the stone at `pt`, if any.
    pub fn clear(&mut self, pt: Point) -> Option<Color> {
        self.cells.get_mut(pt).and_then(Option::take)
    }

    /// Up to four orthogonal neighbors (North, East, South, West).
    pub fn neighbors(&self, pt: Point) -> Neighbors {
        let (x, y) = self.xy(pt);
        let s = self.size;
        [
            (y > 0).then(|| pt - s),
            (x + 1 < s).then(|| pt + 1),
            (y + 1 < s).then(|| pt + s),
            (x > 0).then(|| pt - 1),
        ]
        .into_iter()
        .flatten()
    }

    /// Number of stones of `color` on the grid.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| **c == Some(color)).count()
    }

    /// Two-dimensional interchange form, one inner vector per row.
    pub fn to_rows(&self) -> Vec<Vec<Option<Color>>> {
        self.cells.chunks(self.size).map(<[_]>::to_vec).collect()
    }

    /// Rebuild a grid from rows, failing if the shape disagrees with `size`.
    pub fn from_rows(size: usize, rows: &[Vec<Option<Color>>]) -> Result<Self> {
        let mut grid = Grid::new(size)?;
        if rows.len() != size {
            return Err(GameError::CorruptState(format!(
                "expected {size} rows, got {}",
                rows.len()
            )));
        }
        for (y, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(GameError::CorruptState(format!(
                    "row {y} has {} points, expected {size}",
                    row.len()
                )));
            }
            grid.cells[y * size..(y + 1) * size].copy_from_slice(row);
        }
        Ok(grid)
    }

    /// One glyph per intersection on a single line.
    pub fn to_compact_string(&self) -> String {
        self.cells.iter().map(|c| glyph(*c)).collect()
    }

    /// Text vertex such as `"D4"` (column letter, row 1 at the bottom).
    pub fn vertex(&self, pt: Point) -> String {
        let (x, y) = self.xy(pt);
        format!("{}{}", COLUMN_LETTERS[x] as char, self.size - y)
    }

    /// Parse a text vertex. `"pass"` yields `None`.
    pub fn parse_vertex(&self, s: &str) -> Result<Option<Point>> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(None);
        }
        let bad = || GameError::Parse(format!("invalid vertex '{s}'"));

        let mut chars = s.chars();
        let col_char = chars.next().ok_or_else(bad)?.to_ascii_uppercase();
        let x = COLUMN_LETTERS
            .iter()
            .position(|&c| c as char == col_char)
            .ok_or_else(bad)?;
        let row: usize = chars.as_str().parse().map_err(|_| bad())?;
        if row == 0 || row > self.size || x >= self.size {
            return Err(bad());
        }
        self.point(x, self.size - row).map(Some)
    }
}

fn glyph(c: Option<Color>) -> char {
    c.map_or(GLYPH_EMPTY, Color::glyph)
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            let line: String = row.iter().map(|c| glyph(*c)).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GameError;

    /// Parse the compact form. Whitespace is ignored and the size is the
    /// square root of the number of glyphs.
    fn from_str(s: &str) -> Result<Self> {
        let glyphs: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        let size = (glyphs.len() as f64).sqrt().round() as usize;
        if size * size != glyphs.len() {
            return Err(GameError::Parse(format!(
                "{} glyphs do not form a square board",
                glyphs.len()
            )));
        }

        let mut grid = Grid::new(size)?;
        for (pt, ch) in glyphs.into_iter().enumerate() {
            grid.cells[pt] = match ch.to_ascii_lowercase() {
                GLYPH_EMPTY => None,
                GLYPH_BLACK => Some(Color::Black),
                GLYPH_WHITE => Some(Color::White),
                _ => {
                    return Err(GameError::Parse(format!(
                        "invalid character '{ch}' at position {pt}"
                    )));
                }
            };
        }
        Ok(grid)
    }
}
