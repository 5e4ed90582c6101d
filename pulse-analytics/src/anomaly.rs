//! Liquidation spike & funding rate extreme detection for one asset of one snapshot.

use crate::{
    config::{AlertConfig, ThresholdMode},
    stats::{mean_std, percentile},
};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use pulse_data::snapshot::{AssetRecord, LiquidationPoint, Timestamped, ValuePoint};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// `chrono` format used for timestamps inside alert messages.
const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Anomaly flagged for an asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Alert {
    /// One or more liquidation totals exceeded the spike threshold.
    LiquidationSpike {
        threshold: f64,
        times: Vec<DateTime<Utc>>,
    },
    /// The largest absolute funding rate exceeded the configured threshold. `value` keeps its
    /// sign.
    FundingExtreme { value: f64, threshold: f64 },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::LiquidationSpike { threshold, times } => write!(
                f,
                "Possible reversal after liquidation spike above {:.2}: [{}]",
                threshold,
                times
                    .iter()
                    .map(|time| time.format(ALERT_TIME_FORMAT))
                    .join(", ")
            ),
            Alert::FundingExtreme { value, .. } => {
                write!(f, "Funding rate extreme ({:.4})", value)
            }
        }
    }
}

/// Computes [`Alert`]s from the liquidation & funding rate series of an [`AssetRecord`].
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AlertConfig,
}

impl AnomalyDetector {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Alerts for `record`: a liquidation spike (if any) followed by a funding extreme (if any).
    pub fn detect(&self, record: &AssetRecord) -> Vec<Alert> {
        self.detect_series(&record.symbol, &record.liq, &record.fr)
    }

    /// Alerts for raw `liq` & `fr` series, using the liquidation multiplier of `symbol`.
    pub fn detect_series(
        &self,
        symbol: &str,
        liq: &[LiquidationPoint],
        fr: &[ValuePoint],
    ) -> Vec<Alert> {
        let spike = self.liquidation_spike(symbol, liq);
        let funding = self.funding_extreme(fr);
        spike.into_iter().chain(funding).collect()
    }

    /// Human readable form of [`Self::detect`].
    pub fn messages(&self, record: &AssetRecord) -> Vec<String> {
        self.detect(record).iter().map(Alert::to_string).collect()
    }

    /// Spike threshold for `symbol` over a liquidation totals series, scaled by the symbol's
    /// multiplier.
    ///
    /// Series of fewer than two totals have no meaningful dispersion, so there is no threshold.
    pub fn liquidation_threshold(&self, symbol: &str, totals: &[f64]) -> Option<f64> {
        if totals.len() < 2 {
            return None;
        }

        let base = match self.config.threshold_mode {
            ThresholdMode::MeanPlusKStd { k } => {
                let (mean, std) = mean_std(totals)?;
                mean + k * std
            }
            ThresholdMode::Percentile { percentile: p } => percentile(totals, p)?,
        };

        Some(base * self.config.multiplier(symbol))
    }

    fn liquidation_spike(&self, symbol: &str, liq: &[LiquidationPoint]) -> Option<Alert> {
        // Records without a timestamp or without both sides are unusable
        let series = liq
            .iter()
            .filter_map(|point| Some((point.time()?, point.total()?)))
            .collect::<Vec<_>>();

        let totals = series.iter().map(|(_, total)| *total).collect::<Vec<_>>();
        let threshold = self.liquidation_threshold(symbol, &totals)?;

        let times = series
            .into_iter()
            .filter(|(_, total)| *total > threshold)
            .map(|(time, _)| time)
            .collect::<Vec<_>>();

        debug!(symbol, threshold, spikes = times.len(), "evaluated liquidation spikes");

        (!times.is_empty()).then_some(Alert::LiquidationSpike { threshold, times })
    }

    fn funding_extreme(&self, fr: &[ValuePoint]) -> Option<Alert> {
        // First of equally large magnitudes wins
        let value = fr
            .iter()
            .filter_map(|point| point.c)
            .fold(None, |extreme: Option<f64>, value| match extreme {
                Some(current) if current.abs() >= value.abs() => Some(current),
                _ => Some(value),
            })?;

        (value.abs() > self.config.funding_threshold).then_some(Alert::FundingExtreme {
            value,
            threshold: self.config.funding_threshold,
        })
    }
}
