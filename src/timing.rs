//! Clock interface consumed by the game layer.
//!
//! The engine never reads the system time itself: every query takes the
//! caller's `now`, which keeps clocks deterministic under test.

use std::time::{Duration, Instant};

use crate::grid::Color;

/// Time control for one game.
pub trait Clock {
    /// Whether `mover` has used up their allotment as of `now`.
    fn expired(&self, mover: Color, now: Instant) -> bool;

    /// Charge the time since the last move to `mover`, who just moved at `now`.
    fn record_move(&mut self, mover: Color, now: Instant);
}

/// No time limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unlimited;

impl Clock for Unlimited {
    fn expired(&self, _mover: Color, _now: Instant) -> bool {
        false
    }

    fn record_move(&mut self, _mover: Color, _now: Instant) {}
}

/// Time left for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allotment {
    pub main: Duration,
    pub periods: u32,
}

/// Main time followed by byo-yomi periods.
///
/// A move made within a period keeps it; each full period that elapses
/// without a move is lost. The clock runs from [`Timing::start`] or, if that
/// was never called, from the first recorded move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    byo_yomi: Duration,
    black: Allotment,
    white: Allotment,
    turn_started: Option<Instant>,
}

impl Timing {
    pub fn new(main: Duration, byo_yomi: Duration, periods: u32) -> Self {
        let allotment = Allotment { main, periods };
        Self {
            byo_yomi,
            black: allotment,
            white: allotment,
            turn_started: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.turn_started = Some(now);
    }

    pub fn has_started(&self) -> bool {
        self.turn_started.is_some()
    }

    pub fn remaining(&self, color: Color) -> Allotment {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    fn allotment_mut(&mut self, color: Color) -> &mut Allotment {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.turn_started
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t))
    }
}

impl Clock for Timing {
    fn expired(&self, mover: Color, now: Instant) -> bool {
        let left = self.remaining(mover);
        let overtime = self.byo_yomi.saturating_mul(left.periods);
        self.elapsed(now) > left.main.saturating_add(overtime)
    }

    fn record_move(&mut self, mover: Color, now: Instant) {
        let elapsed = self.elapsed(now);
        let byo_yomi = self.byo_yomi;
        let left = self.allotment_mut(mover);

        if elapsed <= left.main {
            left.main -= elapsed;
        } else {
            let overtime = elapsed - left.main;
            left.main = Duration::ZERO;
            let lost = if byo_yomi.is_zero() {
                left.periods
            } else {
                u32::try_from(overtime.as_nanos() / byo_yomi.as_nanos()).unwrap_or(u32::MAX)
            };
            left.periods = left.periods.saturating_sub(lost);
        }
        self.turn_started = Some(now);
    }
}
