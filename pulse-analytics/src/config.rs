//! Analysis configuration.
//!
//! Every config has a [`Default`] matching the long-standing dashboard behaviour, builder style
//! `with_*` setters, and a `from_env` constructor. Unparseable environment overrides are logged
//! and ignored.

use pulse_data::store::cache::DEFAULT_LISTING_TTL;
use serde::Serialize;
use smol_str::SmolStr;
use std::{collections::HashMap, path::PathBuf, str::FromStr, time::Duration};
use tracing::warn;

/// Default `k` of [`ThresholdMode::MeanPlusKStd`].
pub const DEFAULT_STD_MULTIPLE: f64 = 3.0;

/// Default percentile of [`ThresholdMode::Percentile`].
pub const DEFAULT_PERCENTILE: f64 = 95.0;

/// Default absolute funding rate above which an extreme is flagged.
pub const DEFAULT_FUNDING_THRESHOLD: f64 = 0.01;

/// Default number of digests aggregated by [`DigestMode::Window`].
pub const DEFAULT_DIGEST_WINDOW: usize = 4;

/// How the liquidation spike threshold is derived from a liquidation totals series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ThresholdMode {
    /// Population `mean + k * std`.
    MeanPlusKStd { k: f64 },
    /// Linearly interpolated quantile, `percentile` in `[0, 100]`.
    Percentile { percentile: f64 },
}

impl Default for ThresholdMode {
    fn default() -> Self {
        Self::MeanPlusKStd {
            k: DEFAULT_STD_MULTIPLE,
        }
    }
}

/// Liquidation spike & funding extreme alert configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertConfig {
    pub threshold_mode: ThresholdMode,
    /// Absolute funding rate above which an extreme is flagged.
    pub funding_threshold: f64,
    /// Per-symbol multiplier applied to the liquidation threshold. Symbols not present use 1.0.
    pub multipliers: HashMap<SmolStr, f64>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_mode: ThresholdMode::default(),
            funding_threshold: DEFAULT_FUNDING_THRESHOLD,
            multipliers: HashMap::new(),
        }
    }
}

impl AlertConfig {
    /// Read overrides from `PULSE_LIQ_MODE` (`std` | `percentile`), `PULSE_LIQ_K`,
    /// `PULSE_LIQ_PERCENTILE`, `PULSE_LIQ_MULTIPLIERS` (eg/ `BTC=1.5,ETH=1.2`) and
    /// `PULSE_FR_THRESHOLD`.
    pub fn from_env() -> Self {
        let threshold_mode = match env_var("PULSE_LIQ_MODE").as_deref() {
            Some("percentile") => ThresholdMode::Percentile {
                percentile: env_parse("PULSE_LIQ_PERCENTILE").unwrap_or(DEFAULT_PERCENTILE),
            },
            Some("std") | None => ThresholdMode::MeanPlusKStd {
                k: env_parse("PULSE_LIQ_K").unwrap_or(DEFAULT_STD_MULTIPLE),
            },
            Some(other) => {
                warn!(value = other, "unknown PULSE_LIQ_MODE, using mean + k * std");
                ThresholdMode::default()
            }
        };

        Self {
            threshold_mode,
            funding_threshold: env_parse("PULSE_FR_THRESHOLD").unwrap_or(DEFAULT_FUNDING_THRESHOLD),
            multipliers: env_var("PULSE_LIQ_MULTIPLIERS")
                .map(|raw| parse_multipliers(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.threshold_mode = mode;
        self
    }

    pub fn with_funding_threshold(mut self, threshold: f64) -> Self {
        self.funding_threshold = threshold;
        self
    }

    pub fn with_multiplier(mut self, symbol: impl Into<SmolStr>, multiplier: f64) -> Self {
        self.multipliers.insert(symbol.into(), multiplier);
        self
    }

    /// Liquidation threshold multiplier for `symbol`.
    pub fn multiplier(&self, symbol: &str) -> f64 {
        self.multipliers.get(symbol).copied().unwrap_or(1.0)
    }
}

/// How digests are matched to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestMode {
    /// Whole text of the single digest closest in time.
    Nearest,
    /// Symbol sections of the last `window` digests at or before the snapshot, joined.
    #[default]
    Window,
}

/// Digest alignment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigestConfig {
    pub mode: DigestMode,
    pub window: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            mode: DigestMode::default(),
            window: DEFAULT_DIGEST_WINDOW,
        }
    }
}

impl DigestConfig {
    /// Read overrides from `PULSE_DIGEST_MODE` (`nearest` | `window`) and `PULSE_DIGEST_WINDOW`.
    pub fn from_env() -> Self {
        let mode = match env_var("PULSE_DIGEST_MODE").as_deref() {
            Some("nearest") => DigestMode::Nearest,
            Some("window") | None => DigestMode::Window,
            Some(other) => {
                warn!(value = other, "unknown PULSE_DIGEST_MODE, using window");
                DigestMode::Window
            }
        };

        Self {
            mode,
            window: env_parse("PULSE_DIGEST_WINDOW").unwrap_or(DEFAULT_DIGEST_WINDOW),
        }
    }

    pub fn with_mode(mut self, mode: DigestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

/// Output rendering of the `pulse-report` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Top level configuration of the `pulse-report` binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub data_dir: PathBuf,
    pub listing_ttl: Duration,
    pub output: OutputFormat,
    pub alert: AlertConfig,
    pub digest: DigestConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            listing_ttl: DEFAULT_LISTING_TTL,
            output: OutputFormat::default(),
            alert: AlertConfig::default(),
            digest: DigestConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Read overrides from `PULSE_DATA_DIR`, `PULSE_LISTING_TTL_SECS`, `PULSE_OUTPUT`
    /// (`text` | `json`), plus those of [`AlertConfig::from_env`] & [`DigestConfig::from_env`].
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let output = match env_var("PULSE_OUTPUT").as_deref() {
            Some("json") => OutputFormat::Json,
            Some("text") | None => OutputFormat::Text,
            Some(other) => {
                warn!(value = other, "unknown PULSE_OUTPUT, using text");
                OutputFormat::Text
            }
        };

        Self {
            data_dir: env_var("PULSE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            listing_ttl: env_parse("PULSE_LISTING_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.listing_ttl),
            output,
            alert: AlertConfig::from_env(),
            digest: DigestConfig::from_env(),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_var(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

/// Parse `SYMBOL=multiplier` pairs separated by commas. Malformed pairs are skipped.
fn parse_multipliers(raw: &str) -> HashMap<SmolStr, f64> {
    raw.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .filter_map(|pair| {
            let parsed = pair.split_once('=').and_then(|(symbol, multiplier)| {
                let symbol = symbol.trim();
                let multiplier = multiplier.trim().parse::<f64>().ok()?;
                (!symbol.is_empty() && multiplier.is_finite() && multiplier > 0.0)
                    .then(|| (SmolStr::new(symbol), multiplier))
            });

            if parsed.is_none() {
                warn!(pair, "skipping malformed liquidation multiplier");
            }
            parsed
        })
        .collect()
}
