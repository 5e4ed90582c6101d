//! Deltas between consecutive snapshots of one asset, plus a trailing window summary of the
//! current snapshot.

use chrono::TimeDelta;
use pulse_data::snapshot::{AssetRecord, Candle};
use serde::{Serialize, Serializer};
use std::fmt;

/// Difference between two values, displayed with an explicit sign and two decimals
/// (eg/ `+5.00`, `-5.00`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SignedDelta(pub f64);

impl SignedDelta {
    pub fn between(current: f64, previous: f64) -> Self {
        Self(current - previous)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for SignedDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2}", self.0)
    }
}

impl Serialize for SignedDelta {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Deltas of one asset. Every field is absent rather than zero when the inputs needed to compute
/// it were missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AssetDelta {
    /// Last close of the current snapshot minus last close of the previous one.
    pub close: Option<SignedDelta>,
    /// Last open interest of the current snapshot minus that of the previous one.
    pub open_interest: Option<SignedDelta>,
    /// Percentage change of close across the trailing window of the current snapshot.
    pub window_change_pct: Option<f64>,
    /// Volume summed across the trailing window of the current snapshot.
    pub window_volume: Option<f64>,
}

/// Computes [`AssetDelta`]s.
#[derive(Debug, Clone, Copy)]
pub struct DeltaCalculator {
    window: TimeDelta,
}

impl Default for DeltaCalculator {
    fn default() -> Self {
        Self {
            window: TimeDelta::hours(24),
        }
    }
}

impl DeltaCalculator {
    pub fn new(window: TimeDelta) -> Self {
        Self { window }
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Deltas of `current` against `previous`. `previous` is `None` for the first snapshot of a
    /// sequence, or when the symbol was not present in the previous snapshot.
    pub fn compute(&self, current: &AssetRecord, previous: Option<&AssetRecord>) -> AssetDelta {
        let close = previous.and_then(|previous| {
            Some(SignedDelta::between(
                current.last_close()?,
                previous.last_close()?,
            ))
        });

        let open_interest = previous.and_then(|previous| {
            Some(SignedDelta::between(
                current.last_open_interest()?,
                previous.last_open_interest()?,
            ))
        });

        let window = self.trailing_window(&current.ohlcv);

        AssetDelta {
            close,
            open_interest,
            window_change_pct: window_change_pct(window),
            window_volume: window_volume(window),
        }
    }

    /// Trailing slice of `ohlcv` within `[last_t - window, last_t]`, where `last_t` is the
    /// timestamp of the final record. Empty when that record has no timestamp.
    pub fn trailing_window<'a>(&self, ohlcv: &'a [Candle]) -> &'a [Candle] {
        let Some(last_t) = ohlcv.last().and_then(|candle| candle.t) else {
            return &[];
        };
        let start_t = last_t.saturating_sub(self.window.num_seconds());

        // Series are non-decreasing in t, so scan back until the first record outside the window
        let start = ohlcv
            .iter()
            .rposition(|candle| candle.t.is_some_and(|t| t < start_t))
            .map_or(0, |outside| outside + 1);

        &ohlcv[start..]
    }
}

/// `(last.c - first.c) / first.c * 100` across `window`. Absent when either close is missing or
/// the first close is zero.
fn window_change_pct(window: &[Candle]) -> Option<f64> {
    let first = window.first()?.c?;
    let last = window.last()?.c?;

    (first != 0.0).then(|| (last - first) / first * 100.0)
}

/// Sum of the volumes present in `window`, absent when none are.
fn window_volume(window: &[Candle]) -> Option<f64> {
    window
        .iter()
        .filter_map(|candle| candle.v)
        .fold(None, |sum, volume| Some(sum.unwrap_or(0.0) + volume))
}
