//! Remaining-time estimate for a drawing in progress.
//!
//! The plotter reports how much stroke length it has drawn; the
//! estimate extrapolates the average drawing rate so far over the length
//! still to draw.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Estimates are withheld until the rate has been measured this long.
pub const WARMUP: Duration = Duration::from_secs(5);

/// Estimated time to finish a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Eta {
    /// Not enough progress yet to measure a rate.
    Calculating,
    /// Estimated time left.
    Remaining(Duration),
    /// Everything has been drawn.
    Done,
}

impl Eta {
    /// Estimate from elapsed time and lengths drawn so far and in total.
    ///
    /// `Done` once `drawn >= total`. Otherwise an estimate only after
    /// [`WARMUP`] has passed with some length drawn: the remaining
    /// length divided by the average rate `drawn / elapsed`.
    #[must_use]
    pub fn estimate(elapsed: Duration, drawn: f64, total: f64) -> Self {
        if drawn >= total {
            return Self::Done;
        }
        if elapsed <= WARMUP || drawn <= 0.0 {
            return Self::Calculating;
        }

        let rate = drawn / elapsed.as_secs_f64();
        let remaining = (total - drawn) / rate;
        Duration::try_from_secs_f64(remaining).map_or(Self::Calculating, Self::Remaining)
    }
}

impl fmt::Display for Eta {
    /// `ETA: Calculating...`, `ETA: 2.5 min` or `ETA: Done`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calculating => f.write_str("ETA: Calculating..."),
            Self::Remaining(left) => write!(f, "ETA: {:.1} min", left.as_secs_f64() / 60.0),
            Self::Done => f.write_str("ETA: Done"),
        }
    }
}
