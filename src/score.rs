//! Points for picked and missed markers.

use serde::Serialize;

const FIRST_INCREMENT: u32 = 1;
const INCREMENT_STEP: u32 = 4;
const MAX_INCREMENT: u32 = 200;
const MISS_PENALTY: u32 = 200;
const MISS_INCREMENT_DROP: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    total: u32,
    points: u32,
    increment: u32,
    picked: u32,
    missed: u32,
}

impl Scoreboard {
    /// A fresh scoreboard for a song with `marker_count` markers.
    pub fn for_markers(marker_count: usize) -> Self {
        let mut total = 0u32;
        let mut increment = FIRST_INCREMENT;
        for _ in 0..marker_count {
            total = total.saturating_add(increment);
            increment = (increment + INCREMENT_STEP).min(MAX_INCREMENT);
        }
        Self {
            total,
            points: 0,
            increment: FIRST_INCREMENT,
            picked: 0,
            missed: 0,
        }
    }

    /// Adds the current increment, then raises it. Returns the points gained.
    pub fn pick(&mut self) -> u32 {
        let gained = self.increment;
        self.picked += 1;
        self.points = self.points.saturating_add(gained);
        self.increment = (self.increment + INCREMENT_STEP).min(MAX_INCREMENT);
        gained
    }

    /// Applies the miss penalty; the increment drops and is kept odd.
    /// Returns the points lost.
    pub fn miss(&mut self) -> u32 {
        let lost = self.points.min(MISS_PENALTY);
        self.missed += 1;
        self.points -= lost;
        self.increment = self.increment.saturating_sub(MISS_INCREMENT_DROP).max(FIRST_INCREMENT);
        if self.increment % 2 == 0 {
            self.increment += 1;
        }
        lost
    }

    pub fn reset(&mut self) {
        *self = Self {
            total: self.total,
            ..Self::for_markers(0)
        };
    }

    /// Share of the achievable points, in percent. Zero for a song without
    /// markers.
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.points as f32 * 100.0 / self.total as f32
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    pub fn picked(&self) -> u32 {
        self.picked
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_follows_capped_ladder() {
        assert_eq!(Scoreboard::for_markers(0).total(), 0);
        assert_eq!(Scoreboard::for_markers(1).total(), 1);
        // 1 + 5 + 9
        assert_eq!(Scoreboard::for_markers(3).total(), 15);
        // 50 rungs 1..=197, then capped at 200
        let ladder: u32 = (0..50).map(|k| 1 + 4 * k).sum();
        assert_eq!(Scoreboard::for_markers(52).total(), ladder + 400);
    }

    #[test]
    fn perfect_run_reaches_hundred_percent() {
        let mut board = Scoreboard::for_markers(80);
        for _ in 0..80 {
            board.pick();
        }
        assert_eq!(board.points(), board.total());
        assert!((board.percentage() - 100.0).abs() < 1e-4);
        assert_eq!(board.increment(), 200);
    }

    #[test]
    fn miss_penalizes_and_keeps_increment_odd() {
        let mut board = Scoreboard::for_markers(100);
        for _ in 0..20 {
            board.pick();
        }
        // increment 81, points 1 + 5 + ... + 77
        assert_eq!(board.increment(), 81);
        assert_eq!(board.points(), 780);

        assert_eq!(board.miss(), 200);
        assert_eq!(board.points(), 580);
        assert_eq!(board.increment(), 31);

        let mut fresh = Scoreboard::for_markers(10);
        fresh.pick();
        fresh.pick();
        assert_eq!(fresh.miss(), 6);
        assert_eq!(fresh.points(), 0);
        assert_eq!(fresh.increment(), 1);
        assert_eq!((fresh.picked(), fresh.missed()), (2, 1));
    }

    #[test]
    fn even_increment_after_miss_is_bumped() {
        let mut board = Scoreboard::for_markers(100);
        for _ in 0..60 {
            board.pick();
        }
        assert_eq!(board.increment(), 200);
        board.miss();
        assert_eq!(board.increment(), 151);
    }

    #[test]
    fn reset_keeps_total() {
        let mut board = Scoreboard::for_markers(5);
        board.pick();
        board.miss();
        board.reset();
        assert_eq!(board, Scoreboard::for_markers(5));
        assert_eq!(Scoreboard::for_markers(0).percentage(), 0.0);
    }
}
